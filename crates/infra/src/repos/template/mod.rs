mod inmemory;
mod postgres;

pub use inmemory::InMemoryTemplateRepo;
pub use postgres::PostgresTemplateRepo;
use stay_notifier_domain::{MessageTemplate, ID};

#[async_trait::async_trait]
pub trait ITemplateRepo: Send + Sync {
    async fn insert(&self, template: &MessageTemplate) -> anyhow::Result<()>;
    async fn find(&self, template_id: &ID) -> Option<MessageTemplate>;
    async fn list_all(&self) -> anyhow::Result<Vec<MessageTemplate>>;
}
