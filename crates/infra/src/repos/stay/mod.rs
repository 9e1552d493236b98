mod inmemory;
mod postgres;

use chrono::NaiveDate;
pub use inmemory::InMemoryStayRepo;
pub use postgres::PostgresStayRepo;
use stay_notifier_domain::{Stay, ID};

#[async_trait::async_trait]
pub trait IStayRepo: Send + Sync {
    async fn insert(&self, stay: &Stay) -> anyhow::Result<()>;
    async fn find(&self, stay_id: &ID) -> Option<Stay>;
    async fn find_many(&self, stay_ids: &[ID]) -> anyhow::Result<Vec<Stay>>;
    /// All stays with `check_in <= as_of <= check_out`
    async fn list_active(&self, as_of: NaiveDate) -> anyhow::Result<Vec<Stay>>;
}
