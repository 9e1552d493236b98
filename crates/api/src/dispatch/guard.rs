use chrono::NaiveDateTime;
use stay_notifier_domain::{DispatchKey, DispatchOutcome, DispatchPolicy, DispatchRecord};
use stay_notifier_infra::{AppendResult, IDispatchLogRepo};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Admitted,
    /// The slot already has a record for the day, whatever its outcome
    AlreadyAttempted,
}

/// Decides whether a (stay, trigger type, day) slot may be sent and keeps
/// the dispatch log consistent with the attempts that were made.
///
/// With suppression on, admission claims the slot with a `Pending` record
/// through a conditional insert, so concurrent ticks admit at most one
/// sender per slot. The claim is later settled with the real outcome.
pub struct DispatchGuard<'a> {
    logs: &'a dyn IDispatchLogRepo,
    policy: DispatchPolicy,
}

impl<'a> DispatchGuard<'a> {
    pub fn new(logs: &'a dyn IDispatchLogRepo, policy: DispatchPolicy) -> Self {
        Self { logs, policy }
    }

    pub async fn admit(
        &self,
        key: &DispatchKey,
        at: NaiveDateTime,
    ) -> anyhow::Result<Admission> {
        if !self.policy.suppress_duplicates {
            return Ok(Admission::Admitted);
        }
        if self.logs.exists(key).await? {
            return Ok(Admission::AlreadyAttempted);
        }
        let claim = record_for(key, at, DispatchOutcome::Pending);
        match self.logs.append(&claim).await? {
            AppendResult::Inserted => Ok(Admission::Admitted),
            AppendResult::Duplicate => Ok(Admission::AlreadyAttempted),
        }
    }

    /// Stores the outcome of an admitted attempt
    pub async fn record(
        &self,
        key: &DispatchKey,
        at: NaiveDateTime,
        outcome: DispatchOutcome,
    ) -> anyhow::Result<()> {
        let record = record_for(key, at, outcome);
        if self.policy.suppress_duplicates {
            return self.logs.settle(&record).await;
        }
        match self.logs.append(&record).await? {
            AppendResult::Inserted => Ok(()),
            AppendResult::Duplicate => {
                warn!(
                    "Slot: {:?} was already attempted today, overwriting its outcome with: {:?}",
                    key, outcome
                );
                self.logs.settle(&record).await
            }
        }
    }
}

fn record_for(key: &DispatchKey, at: NaiveDateTime, outcome: DispatchOutcome) -> DispatchRecord {
    DispatchRecord {
        stay_id: key.stay_id.clone(),
        trigger_type: key.trigger_type.clone(),
        day: key.day,
        attempted_at: at,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_notifier_domain::{TriggerType, ID};
    use stay_notifier_infra::NotifierContext;

    fn key() -> DispatchKey {
        DispatchKey {
            stay_id: ID::default(),
            trigger_type: TriggerType::new("checkin_0900"),
            day: "2025-05-10".parse().unwrap(),
        }
    }

    fn at(time: &str) -> NaiveDateTime {
        format!("2025-05-10T{}", time).parse().unwrap()
    }

    #[actix_web::test]
    async fn suppression_admits_a_slot_once() {
        let ctx = NotifierContext::create_inmemory();
        let guard = DispatchGuard::new(ctx.repos.dispatch_logs.as_ref(), DispatchPolicy::default());
        let key = key();

        assert_eq!(guard.admit(&key, at("09:00:00")).await.unwrap(), Admission::Admitted);
        assert_eq!(
            guard.admit(&key, at("09:00:01")).await.unwrap(),
            Admission::AlreadyAttempted
        );

        let pending = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].outcome, DispatchOutcome::Pending);

        guard
            .record(&key, at("09:00:02"), DispatchOutcome::Failure)
            .await
            .unwrap();
        let settled = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].outcome, DispatchOutcome::Failure);

        // A failed slot stays occupied for the rest of the day
        assert_eq!(
            guard.admit(&key, at("21:00:00")).await.unwrap(),
            Admission::AlreadyAttempted
        );
    }

    #[actix_web::test]
    async fn bypass_admits_every_attempt_and_keeps_one_record() {
        let ctx = NotifierContext::create_inmemory();
        let guard = DispatchGuard::new(
            ctx.repos.dispatch_logs.as_ref(),
            DispatchPolicy {
                suppress_duplicates: false,
            },
        );
        let key = key();

        for (time, outcome) in &[
            ("09:00:00", DispatchOutcome::Success),
            ("09:00:30", DispatchOutcome::Failure),
        ] {
            assert_eq!(guard.admit(&key, at(time)).await.unwrap(), Admission::Admitted);
            guard.record(&key, at(time), *outcome).await.unwrap();
        }

        let records = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, DispatchOutcome::Failure);
        assert_eq!(records[0].attempted_at, at("09:00:30"));
    }
}
