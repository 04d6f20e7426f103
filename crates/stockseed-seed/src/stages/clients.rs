use async_trait::async_trait;
use tracing::info;

use stockseed_core::StageName;
use stockseed_generate::ClientGenerator;

use crate::errors::SeedResult;
use crate::stage::{Stage, StageContext, StageOutput, StageVariant};
use crate::store::{BatchInsert, SeedTransaction};

const CLIENT_COLUMNS: &[&str] = &["name", "cpf_cnpj", "email", "phone", "address"];

/// Inserts synthetic clients; duplicate documents are skipped.
pub struct ClientsStage {
    context: StageContext,
}

impl ClientsStage {
    pub fn new(context: StageContext) -> Self {
        Self { context }
    }

    fn build_insert(&self) -> BatchInsert {
        let mut rng = self.context.rng(StageName::Clients);
        let clients = ClientGenerator::new().generate(self.context.profile.clients_count, &mut rng);

        let mut insert =
            BatchInsert::new("clients", CLIENT_COLUMNS).on_conflict("(cpf_cnpj) DO NOTHING");
        for client in clients {
            insert.push_row(vec![
                client.name.into(),
                client.cpf_cnpj.into(),
                client.email.into(),
                client.phone.into(),
                client.address.into(),
            ]);
        }
        insert
    }
}

#[async_trait]
impl Stage for ClientsStage {
    fn name(&self) -> StageName {
        StageName::Clients
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Direct
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let insert = self.build_insert();
        let written = tx
            .insert_rows(&insert, self.context.profile.batch_size)
            .await?;
        let total = tx.select_ids("clients").await?.len();

        info!(generated = insert.len(), written, total, "clients persisted");
        Ok(StageOutput::records(written as usize))
    }
}
