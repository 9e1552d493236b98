use super::guard::{Admission, DispatchGuard};
use crate::error::NotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use stay_notifier_api_structs::run_tick::{APIResponse, QueryParams};
use stay_notifier_domain::{
    render, resolve, Candidate, ClockOverride, DispatchKey, DispatchOutcome, TemplateCatalog,
    TickContext,
};
use stay_notifier_infra::{NotifierContext, SendOutcome};
use tracing::{debug, error, info, warn};

pub async fn run_tick_controller(
    query: web::Query<QueryParams>,
    ctx: web::Data<NotifierContext>,
) -> Result<HttpResponse, NotifierError> {
    let clock_override =
        ClockOverride::parse(query.manual_date.as_deref(), query.manual_time.as_deref())
            .map_err(|e| NotifierError::BadClientData(e.to_string()))?;

    let usecase = RunTickUseCase { clock_override };

    execute(usecase, &ctx)
        .await
        .map(|summary| HttpResponse::Ok().json(summary.into_response()))
        .map_err(NotifierError::from)
}

/// Runs one tick: loads the active stays and the templates, resolves the
/// candidates firing at the tick's minute and sends each admitted one.
/// A failing candidate never stops the candidates after it.
#[derive(Debug, Default)]
pub struct RunTickUseCase {
    pub clock_override: ClockOverride,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub server_time: NaiveDateTime,
    pub match_minute: String,
    pub candidates: usize,
    /// Candidates that went through an attempt, `sent` + `failed`
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped_duplicate: usize,
}

impl TickSummary {
    fn new(tick: &TickContext) -> Self {
        Self {
            server_time: tick.now(),
            match_minute: tick.match_minute(),
            candidates: 0,
            processed: 0,
            sent: 0,
            failed: 0,
            skipped_duplicate: 0,
        }
    }

    fn into_response(self) -> APIResponse {
        APIResponse {
            server_time: self.server_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            match_minute: self.match_minute,
            candidates: self.candidates,
            processed: self.processed,
            sent: self.sent,
            failed: self.failed,
            skipped_duplicate: self.skipped_duplicate,
        }
    }
}

#[derive(Debug)]
pub enum RunTickError {
    /// Stays or templates could not be loaded, nothing was sent
    StoreUnavailable(anyhow::Error),
}

impl From<RunTickError> for NotifierError {
    fn from(e: RunTickError) -> Self {
        match e {
            RunTickError::StoreUnavailable(_) => Self::InternalError,
        }
    }
}

enum CandidateResult {
    Sent,
    Failed,
    Skipped,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RunTickUseCase {
    type Response = TickSummary;

    type Error = RunTickError;

    const NAME: &'static str = "RunTick";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let tick = TickContext::capture(ctx.sys.now(), &ctx.config.timezone, &self.clock_override);

        let stays = ctx
            .repos
            .stays
            .list_active(tick.today())
            .await
            .map_err(RunTickError::StoreUnavailable)?;
        let catalog = TemplateCatalog::new(
            ctx.repos
                .templates
                .list_all()
                .await
                .map_err(RunTickError::StoreUnavailable)?,
        );
        for template in catalog.dead_templates() {
            debug!(
                "Template: {} has trigger type: {} which never fires",
                template.id, template.trigger_type
            );
        }

        let candidates = resolve(&tick, &stays, &catalog);
        let mut summary = TickSummary::new(&tick);
        summary.candidates = candidates.len();
        info!(
            "Tick at {} resolved {} candidates from {} active stays",
            summary.match_minute,
            candidates.len(),
            stays.len()
        );

        let guard = DispatchGuard::new(ctx.repos.dispatch_logs.as_ref(), ctx.config.dispatch_policy);
        for candidate in &candidates {
            match dispatch_candidate(candidate, &tick, &guard, ctx).await {
                CandidateResult::Sent => {
                    summary.processed += 1;
                    summary.sent += 1;
                }
                CandidateResult::Failed => {
                    summary.processed += 1;
                    summary.failed += 1;
                }
                CandidateResult::Skipped => summary.skipped_duplicate += 1,
            }
        }

        Ok(summary)
    }
}

async fn dispatch_candidate(
    candidate: &Candidate<'_>,
    tick: &TickContext,
    guard: &DispatchGuard<'_>,
    ctx: &NotifierContext,
) -> CandidateResult {
    let Candidate { stay, template } = *candidate;
    let key = DispatchKey {
        stay_id: stay.id.clone(),
        trigger_type: template.trigger_type.clone(),
        day: tick.today(),
    };

    match guard.admit(&key, tick.now()).await {
        Ok(Admission::Admitted) => (),
        Ok(Admission::AlreadyAttempted) => {
            info!(
                "Skipping {} for stay: {}, already attempted on {}",
                key.trigger_type, stay.id, key.day
            );
            return CandidateResult::Skipped;
        }
        Err(e) => {
            error!(
                "Unable to claim slot: {:?}, not sending. Error: {:?}",
                key, e
            );
            return CandidateResult::Failed;
        }
    }

    let outcome = match render(template, stay) {
        Ok(message) => {
            match ctx
                .sms
                .send(&stay.contact, &message.body, message.subject.as_deref())
                .await
            {
                SendOutcome::Delivered { message_id } => {
                    info!(
                        "Sent {} to stay: {} with message id: {}",
                        key.trigger_type, stay.id, message_id
                    );
                    DispatchOutcome::Success
                }
                SendOutcome::Failed { reason } => {
                    warn!(
                        "Sending {} to stay: {} failed: {}",
                        key.trigger_type, stay.id, reason
                    );
                    DispatchOutcome::Failure
                }
            }
        }
        Err(e) => {
            warn!(
                "Template: {} could not be rendered for stay: {}. Error: {}",
                template.id, stay.id, e
            );
            DispatchOutcome::Failure
        }
    };

    if let Err(e) = guard.record(&key, tick.now(), outcome).await {
        error!(
            "Unable to record outcome: {:?} for slot: {:?}. The slot stays claimed. Error: {:?}",
            outcome, key, e
        );
    }

    match outcome {
        DispatchOutcome::Success => CandidateResult::Sent,
        _ => CandidateResult::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use stay_notifier_domain::{
        DispatchPolicy, DispatchRecord, MessageTemplate, PropertyTarget, Stay, TriggerType,
    };
    use stay_notifier_infra::{AppendResult, IDispatchLogRepo, MockSmsTransport, StaticTimeSys};
    use std::sync::Arc;

    struct TestContext {
        ctx: NotifierContext,
        sms: Arc<MockSmsTransport>,
    }

    /// Inmemory context frozen at the given civil time in Seoul
    fn setup(civil_now: &str) -> TestContext {
        let civil_now = NaiveDateTime::parse_from_str(civil_now, "%Y-%m-%d %H:%M").unwrap();
        let now = chrono_tz::Asia::Seoul
            .from_local_datetime(&civil_now)
            .single()
            .unwrap();
        let sms = Arc::new(MockSmsTransport::new());
        let mut ctx = NotifierContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys::at(now.with_timezone(&chrono::Utc)));
        ctx.sms = sms.clone();
        TestContext { ctx, sms }
    }

    fn date(d: &str) -> NaiveDate {
        d.parse().unwrap()
    }

    async fn insert_stay(
        ctx: &NotifierContext,
        guest: &str,
        contact: &str,
        check_in: &str,
        check_out: &str,
    ) -> Stay {
        let stay = Stay::new(
            "Ocean Villa".into(),
            guest.into(),
            contact.into(),
            date(check_in),
            date(check_out),
        )
        .unwrap();
        ctx.repos.stays.insert(&stay).await.unwrap();
        stay
    }

    async fn insert_template(
        ctx: &NotifierContext,
        property: &str,
        trigger_type: &str,
        at: &str,
        body: &str,
    ) {
        let template = MessageTemplate::new(
            PropertyTarget::parse(property),
            TriggerType::new(trigger_type),
            NaiveTime::parse_from_str(at, "%H:%M").unwrap(),
            None,
            body.into(),
        );
        ctx.repos.templates.insert(&template).await.unwrap();
    }

    #[actix_web::test]
    async fn sends_arrival_and_mid_stay_messages() {
        let TestContext { ctx, sms } = setup("2025-05-10 09:00");
        let arriving = insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-12").await;
        insert_stay(&ctx, "Lee", "010-2", "2025-05-09", "2025-05-12").await;
        insert_template(&ctx, "Ocean Villa", "checkin_0900", "09:00", "Welcome {name} to {accommodation}").await;
        insert_template(&ctx, "전체공용", "multinight_0900", "09:00", "Enjoy your stay {name}").await;
        insert_template(&ctx, "전체공용", "checkout_0900", "09:00", "Bye {name}").await;
        insert_template(&ctx, "Ocean Villa", "checkin_1500", "15:00", "Too late").await;

        let summary = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        assert_eq!(summary.match_minute, "09:00");
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.skipped_duplicate, 0);

        let sent = sms.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent
            .iter()
            .any(|m| m.destination == "010-1" && m.body == "Welcome Kim to Ocean Villa"));
        assert!(sent
            .iter()
            .any(|m| m.destination == "010-2" && m.body == "Enjoy your stay Lee"));

        let logs = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|r| r.outcome == DispatchOutcome::Success));
        assert!(logs
            .iter()
            .any(|r| r.stay_id == arriving.id && r.trigger_type.as_str() == "checkin_0900"));
    }

    #[actix_web::test]
    async fn repeated_ticks_send_once() {
        let TestContext { ctx, sms } = setup("2025-05-12 09:00");
        insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-12").await;
        insert_template(&ctx, "Ocean Villa", "checkout_0900", "09:00", "Bye {name}").await;

        let first = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        let second = execute(RunTickUseCase::default(), &ctx).await.unwrap();

        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(second.skipped_duplicate, 1);
        assert_eq!(sms.sent().len(), 1);
        assert_eq!(ctx.repos.dispatch_logs.find_recent(10).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn concurrent_ticks_leave_one_record() {
        let TestContext { ctx, sms } = setup("2025-05-12 09:00");
        insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-12").await;
        insert_template(&ctx, "Ocean Villa", "checkout_0900", "09:00", "Bye {name}").await;

        let (first, second) = futures::join!(
            execute(RunTickUseCase::default(), &ctx),
            execute(RunTickUseCase::default(), &ctx)
        );

        assert_eq!(first.unwrap().sent + second.unwrap().sent, 1);
        assert_eq!(sms.sent().len(), 1);
        assert_eq!(ctx.repos.dispatch_logs.find_recent(10).await.unwrap().len(), 1);
    }

    /// Dispatch log where `exists` misses records written by another tick
    /// that has not committed from this tick's point of view
    struct LaggingExistsRepo(Arc<dyn IDispatchLogRepo>);

    #[async_trait::async_trait]
    impl IDispatchLogRepo for LaggingExistsRepo {
        async fn exists(&self, _key: &DispatchKey) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn append(&self, record: &DispatchRecord) -> anyhow::Result<AppendResult> {
            self.0.append(record).await
        }

        async fn settle(&self, record: &DispatchRecord) -> anyhow::Result<()> {
            self.0.settle(record).await
        }

        async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<DispatchRecord>> {
            self.0.find_recent(limit).await
        }
    }

    #[actix_web::test]
    async fn racing_tick_loses_the_claim_and_skips() {
        let TestContext { mut ctx, sms } = setup("2025-05-12 09:00");
        ctx.repos.dispatch_logs = Arc::new(LaggingExistsRepo(ctx.repos.dispatch_logs.clone()));
        insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-12").await;
        insert_template(&ctx, "Ocean Villa", "checkout_0900", "09:00", "Bye {name}").await;

        let first = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        // Passes the existence check, the conditional insert refuses the claim
        let second = execute(RunTickUseCase::default(), &ctx).await.unwrap();

        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(second.processed, 0);
        assert_eq!(second.skipped_duplicate, 1);
        assert_eq!(sms.sent().len(), 1);

        let logs = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].outcome, DispatchOutcome::Success);
    }

    #[actix_web::test]
    async fn render_failure_does_not_block_other_candidates() {
        let TestContext { ctx, sms } = setup("2025-05-10 09:00");
        let nameless = insert_stay(&ctx, "", "010-1", "2025-05-10", "2025-05-11").await;
        insert_stay(&ctx, "Kim", "010-2", "2025-05-10", "2025-05-11").await;
        insert_template(&ctx, "Ocean Villa", "checkin_0900", "09:00", "Door code for {name}: 1234").await;

        let summary = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.sent, 1);
        assert_eq!(sms.sent().len(), 1);
        assert_eq!(sms.sent()[0].body, "Door code for Kim: 1234");

        let logs = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        let failed = logs.iter().find(|r| r.stay_id == nameless.id).unwrap();
        assert_eq!(failed.outcome, DispatchOutcome::Failure);

        // Not retried later the same day
        let again = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        assert_eq!(again.skipped_duplicate, 2);
        assert_eq!(sms.sent().len(), 1);
    }

    #[actix_web::test]
    async fn failed_sends_are_not_retried_the_same_day() {
        let TestContext { ctx, sms } = setup("2025-05-10 09:00");
        insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-11").await;
        insert_template(&ctx, "Ocean Villa", "checkin_0900", "09:00", "Welcome {name}").await;
        sms.fail_for("010-1");

        let first = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        assert_eq!(first.failed, 1);
        let second = execute(RunTickUseCase::default(), &ctx).await.unwrap();
        assert_eq!(second.skipped_duplicate, 1);

        let logs = ctx.repos.dispatch_logs.find_recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].outcome, DispatchOutcome::Failure);
        assert!(sms.sent().is_empty());
    }

    #[actix_web::test]
    async fn bypass_policy_sends_every_tick() {
        let TestContext { mut ctx, sms } = setup("2025-05-10 09:00");
        ctx.config.dispatch_policy = DispatchPolicy {
            suppress_duplicates: false,
        };
        insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-11").await;
        insert_template(&ctx, "Ocean Villa", "checkin_0900", "09:00", "Welcome {name}").await;

        execute(RunTickUseCase::default(), &ctx).await.unwrap();
        let second = execute(RunTickUseCase::default(), &ctx).await.unwrap();

        assert_eq!(second.sent, 1);
        assert_eq!(sms.sent().len(), 2);
        assert_eq!(ctx.repos.dispatch_logs.find_recent(10).await.unwrap().len(), 1);
    }

    #[test]
    fn query_accepts_snake_and_camel_case_overrides() {
        for query in &[
            "manual_date=2025-05-12&manual_time=11:00",
            "manualDate=2025-05-12&manualTime=11:00",
        ] {
            let params = web::Query::<QueryParams>::from_query(query).unwrap();
            assert_eq!(params.manual_date.as_deref(), Some("2025-05-12"));
            assert_eq!(params.manual_time.as_deref(), Some("11:00"));
        }
    }

    #[actix_web::test]
    async fn clock_override_moves_the_tick() {
        let TestContext { ctx, sms } = setup("2025-05-01 03:17");
        insert_stay(&ctx, "Kim", "010-1", "2025-05-10", "2025-05-12").await;
        insert_template(&ctx, "Ocean Villa", "checkout_1100", "11:00", "Bye {name}").await;

        let usecase = RunTickUseCase {
            clock_override: ClockOverride::parse(Some("2025-05-12"), Some("11:00")).unwrap(),
        };
        let summary = execute(usecase, &ctx).await.unwrap();
        assert_eq!(summary.match_minute, "11:00");
        assert_eq!(summary.server_time.date(), date("2025-05-12"));
        assert_eq!(summary.sent, 1);
        assert_eq!(sms.sent().len(), 1);
    }
}
