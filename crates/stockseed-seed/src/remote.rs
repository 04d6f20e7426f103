use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use stockseed_core::{DistributionPayload, EntryPayload, SalePayload, StockLevel};

use crate::errors::{SeedError, SeedResult};

/// Default inventory API base URL.
pub const DEFAULT_API_URL: &str = "https://systock-api.onrender.com";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The inventory service endpoints the seeder talks to.
///
/// Posting through the service keeps stock and movement rows in sync, which
/// direct inserts do not.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// `GET /stock/all`
    async fn fetch_stock(&self) -> SeedResult<Vec<StockLevel>>;

    /// `POST /entries`
    async fn post_entry(&self, payload: &EntryPayload) -> SeedResult<()>;

    /// `POST /internal-distributions`
    async fn post_distribution(&self, payload: &DistributionPayload) -> SeedResult<()>;

    /// `POST /sales`
    async fn post_sale(&self, payload: &SalePayload) -> SeedResult<()>;
}

/// [`InventoryApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpInventoryApi {
    client: Client,
    base_url: String,
}

impl HttpInventoryApi {
    pub fn new(base_url: &str) -> SeedResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, payload: &T) -> SeedResult<()> {
        let response = self.client.post(self.url(path)).json(payload).send().await?;
        let response = ensure_success(response).await?;
        debug!(path, status = response.status().as_u16(), "payload accepted");
        Ok(())
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn fetch_stock(&self) -> SeedResult<Vec<StockLevel>> {
        let response = self.client.get(self.url("/stock/all")).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Vec<StockLevel>>().await?)
    }

    async fn post_entry(&self, payload: &EntryPayload) -> SeedResult<()> {
        self.post_json("/entries", payload).await
    }

    async fn post_distribution(&self, payload: &DistributionPayload) -> SeedResult<()> {
        self.post_json("/internal-distributions", payload).await
    }

    async fn post_sale(&self, payload: &SalePayload) -> SeedResult<()> {
        self.post_json("/sales", payload).await
    }
}

/// Only 200 and 201 count as accepted.
async fn ensure_success(response: Response) -> SeedResult<Response> {
    let status = response.status();
    if status == StatusCode::OK || status == StatusCode::CREATED {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SeedError::RemoteCall {
        status: status.as_u16(),
        body,
    })
}
