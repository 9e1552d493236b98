use crate::error::NotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use stay_notifier_api_structs::dtos::DispatchLogDTO;
use stay_notifier_api_structs::get_dispatch_logs::{APIResponse, QueryParams};
use stay_notifier_domain::ID;
use stay_notifier_infra::NotifierContext;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

pub async fn get_dispatch_logs_controller(
    query: web::Query<QueryParams>,
    ctx: web::Data<NotifierContext>,
) -> Result<HttpResponse, NotifierError> {
    let usecase = GetDispatchLogsUseCase {
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
    };

    execute(usecase, &ctx)
        .await
        .map(|logs| HttpResponse::Ok().json(APIResponse { logs }))
        .map_err(NotifierError::from)
}

#[derive(Debug)]
pub struct GetDispatchLogsUseCase {
    pub limit: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StoreUnavailable(anyhow::Error),
}

impl From<UseCaseError> for NotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StoreUnavailable(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetDispatchLogsUseCase {
    type Response = Vec<DispatchLogDTO>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetDispatchLogs";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let records = ctx
            .repos
            .dispatch_logs
            .find_recent(self.limit)
            .await
            .map_err(UseCaseError::StoreUnavailable)?;

        let mut stay_ids = records
            .iter()
            .map(|r| r.stay_id.clone())
            .collect::<Vec<ID>>();
        stay_ids.sort();
        stay_ids.dedup();
        let stays = ctx
            .repos
            .stays
            .find_many(&stay_ids)
            .await
            .map_err(UseCaseError::StoreUnavailable)?;

        Ok(records
            .into_iter()
            .map(|record| {
                let stay = stays.iter().find(|s| s.id == record.stay_id);
                DispatchLogDTO::new(record, stay)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use stay_notifier_domain::{DispatchOutcome, DispatchRecord, Stay, TriggerType};

    fn record(stay_id: &ID, at: &str) -> DispatchRecord {
        let attempted_at = at.parse::<NaiveDateTime>().unwrap();
        DispatchRecord {
            stay_id: stay_id.clone(),
            trigger_type: TriggerType::new("checkin_0900"),
            day: attempted_at.date(),
            attempted_at,
            outcome: DispatchOutcome::Success,
        }
    }

    #[actix_web::test]
    async fn joins_records_with_their_stays() {
        let ctx = NotifierContext::create_inmemory();
        let stay = Stay::new(
            "Ocean Villa".into(),
            "Kim".into(),
            "010-1".into(),
            "2025-05-10".parse().unwrap(),
            "2025-05-12".parse().unwrap(),
        )
        .unwrap();
        ctx.repos.stays.insert(&stay).await.unwrap();
        let removed_stay = ID::default();

        for record in &[
            record(&stay.id, "2025-05-10T09:00:00"),
            record(&removed_stay, "2025-05-11T09:00:00"),
            record(&stay.id, "2025-05-11T09:00:00"),
        ] {
            ctx.repos.dispatch_logs.append(record).await.unwrap();
        }

        let logs = execute(GetDispatchLogsUseCase { limit: 2 }, &ctx)
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.day.to_string() == "2025-05-11"));

        let orphan = logs.iter().find(|l| l.stay_id == removed_stay).unwrap();
        assert_eq!(orphan.guest_name, "Unknown");
        assert_eq!(orphan.property_name, "-");
        assert_eq!(orphan.contact, "-");

        let known = logs.iter().find(|l| l.stay_id == stay.id).unwrap();
        assert_eq!(known.guest_name, "Kim");
        assert_eq!(known.contact, "010-1");
    }
}
