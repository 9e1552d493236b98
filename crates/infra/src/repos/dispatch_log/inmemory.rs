use super::{AppendResult, IDispatchLogRepo};
use crate::repos::shared::inmemory_repo::*;
use stay_notifier_domain::{DispatchKey, DispatchRecord};

pub struct InMemoryDispatchLogRepo {
    records: std::sync::Mutex<Vec<DispatchRecord>>,
}

impl InMemoryDispatchLogRepo {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDispatchLogRepo for InMemoryDispatchLogRepo {
    async fn exists(&self, key: &DispatchKey) -> anyhow::Result<bool> {
        Ok(!find_by(&self.records, |r| r.matches(key)).is_empty())
    }

    async fn append(&self, record: &DispatchRecord) -> anyhow::Result<AppendResult> {
        let key = record.key();
        if insert_unique(record, &self.records, |r| r.matches(&key)) {
            Ok(AppendResult::Inserted)
        } else {
            Ok(AppendResult::Duplicate)
        }
    }

    async fn settle(&self, record: &DispatchRecord) -> anyhow::Result<()> {
        let key = record.key();
        let updated = update_many(
            &self.records,
            |r| r.matches(&key),
            |r| {
                r.outcome = record.outcome;
                r.attempted_at = record.attempted_at;
            },
        );
        if updated == 0 {
            anyhow::bail!("No dispatch record to settle for: {:?}", key);
        }
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<DispatchRecord>> {
        let mut records = find_by(&self.records, |_| true);
        records.sort_by(|r1, r2| r2.attempted_at.cmp(&r1.attempted_at));
        records.truncate(limit);
        Ok(records)
    }
}
