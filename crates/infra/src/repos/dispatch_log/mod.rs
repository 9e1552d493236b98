mod inmemory;
mod postgres;

pub use inmemory::InMemoryDispatchLogRepo;
pub use postgres::PostgresDispatchLogRepo;
use stay_notifier_domain::{DispatchKey, DispatchRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppendResult {
    Inserted,
    /// A record with the same (stay, trigger type, day) already existed
    Duplicate,
}

/// Append only log of dispatch attempts with at most one record per `DispatchKey`
#[async_trait::async_trait]
pub trait IDispatchLogRepo: Send + Sync {
    async fn exists(&self, key: &DispatchKey) -> anyhow::Result<bool>;
    /// Conditional insert, a record with the same key is never overwritten
    async fn append(&self, record: &DispatchRecord) -> anyhow::Result<AppendResult>;
    /// Sets the outcome and attempt time of the record with the same key
    async fn settle(&self, record: &DispatchRecord) -> anyhow::Result<()>;
    /// Most recent attempts first
    async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<DispatchRecord>>;
}
