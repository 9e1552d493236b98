use super::IStayRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::NaiveDate;
use stay_notifier_domain::{Stay, ID};

pub struct InMemoryStayRepo {
    stays: std::sync::Mutex<Vec<Stay>>,
}

impl InMemoryStayRepo {
    pub fn new() -> Self {
        Self {
            stays: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IStayRepo for InMemoryStayRepo {
    async fn insert(&self, stay: &Stay) -> anyhow::Result<()> {
        insert(stay, &self.stays);
        Ok(())
    }

    async fn find(&self, stay_id: &ID) -> Option<Stay> {
        find(stay_id, &self.stays)
    }

    async fn find_many(&self, stay_ids: &[ID]) -> anyhow::Result<Vec<Stay>> {
        Ok(find_by(&self.stays, |s| stay_ids.contains(&s.id)))
    }

    async fn list_active(&self, as_of: NaiveDate) -> anyhow::Result<Vec<Stay>> {
        Ok(find_by(&self.stays, |s| s.is_active_on(as_of)))
    }
}
