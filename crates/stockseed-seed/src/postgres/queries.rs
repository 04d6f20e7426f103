use sqlx::query_builder::Separated;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use stockseed_core::{ProductRef, StockLevel};

use crate::errors::{SeedError, SeedResult};
use crate::store::{BatchInsert, SqlValue};

/// Postgres caps bind parameters per statement at 65535.
const MAX_BIND_PARAMS: usize = 65_535;

pub async fn insert_rows(
    conn: &mut PgConnection,
    insert: &BatchInsert,
    batch_size: usize,
) -> SeedResult<u64> {
    if insert.rows.is_empty() {
        return Ok(0);
    }
    if batch_size == 0 {
        return Err(SeedError::Configuration(
            "batch_size must be greater than zero".to_string(),
        ));
    }
    if let Some(row) = insert.rows.iter().find(|row| row.len() != insert.columns.len()) {
        return Err(SeedError::Configuration(format!(
            "row for {} has {} values, expected {}",
            insert.table,
            row.len(),
            insert.columns.len()
        )));
    }

    let chunk_size = batch_size.min(MAX_BIND_PARAMS / insert.columns.len().max(1));
    let mut written = 0;

    for chunk in insert.rows.chunks(chunk_size) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            insert.table,
            insert.columns.join(", ")
        ));
        builder.push_values(chunk, |mut row, values| {
            for value in values {
                push_value(&mut row, value);
            }
        });
        if let Some(clause) = insert.on_conflict {
            builder.push(" ON CONFLICT ");
            builder.push(clause);
        }

        let result = builder.build().execute(&mut *conn).await?;
        written += result.rows_affected();
    }

    Ok(written)
}

pub async fn insert_returning_id(
    conn: &mut PgConnection,
    table: &'static str,
    columns: &'static [&'static str],
    values: Vec<SqlValue>,
) -> SeedResult<i64> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("INSERT INTO {table} ({}) VALUES (", columns.join(", ")));
    {
        let mut row = builder.separated(", ");
        for value in &values {
            push_value(&mut row, value);
        }
    }
    builder.push(") RETURNING id::int8");

    let id: i64 = builder
        .build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn select_ids(conn: &mut PgConnection, table: &'static str) -> SeedResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(&format!("SELECT id::int8 FROM {table} ORDER BY id"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

pub async fn select_products(conn: &mut PgConnection) -> SeedResult<Vec<ProductRef>> {
    let rows = sqlx::query_as::<_, (i64, f64, i64)>(
        r#"
        select id::int8, sale_price::float8, category_id::int8
        from products
        order by id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, sale_price, category_id)| ProductRef {
            id,
            sale_price,
            category_id,
        })
        .collect())
}

pub async fn select_stock(conn: &mut PgConnection) -> SeedResult<Vec<StockLevel>> {
    let rows = sqlx::query_as::<_, (i64, Option<i64>, i64)>(
        r#"
        select product_id::int8, store_id::int8, quantity::int8
        from stock
        where quantity > 0
        order by store_id, product_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(product_id, store_id, quantity)| StockLevel {
            product_id,
            store_id,
            quantity,
        })
        .collect())
}

/// Update the matching row in place; insert it when none exists.
pub async fn apply_stock_change(conn: &mut PgConnection, change: &StockLevel) -> SeedResult<()> {
    let updated = sqlx::query(
        r#"
        update stock
        set quantity = quantity + $1
        where product_id = $2 and store_id is not distinct from $3
        "#,
    )
    .bind(change.quantity)
    .bind(change.product_id)
    .bind(change.store_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 0 {
        sqlx::query("insert into stock (product_id, store_id, quantity) values ($1, $2, $3)")
            .bind(change.product_id)
            .bind(change.store_id)
            .bind(change.quantity)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn truncate(conn: &mut PgConnection, table: &str) -> SeedResult<()> {
    sqlx::query(&format!("TRUNCATE TABLE {table} RESTART IDENTITY CASCADE"))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn push_value(row: &mut Separated<'_, '_, Postgres, &'static str>, value: &SqlValue) {
    match value {
        SqlValue::Bool(value) => {
            row.push_bind(*value);
        }
        SqlValue::Int(value) => {
            row.push_bind(*value);
        }
        SqlValue::Float(value) => {
            row.push_bind(*value);
        }
        SqlValue::Text(value) => {
            row.push_bind(value.clone());
        }
        SqlValue::Date(value) => {
            row.push_bind(*value);
        }
        SqlValue::Timestamp(value) => {
            row.push_bind(*value);
        }
        SqlValue::OptionalTimestamp(value) => {
            row.push_bind(*value);
        }
    }
}
