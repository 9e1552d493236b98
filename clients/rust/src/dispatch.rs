use crate::{APIResponse, BaseClient};
use reqwest::StatusCode;
use stay_notifier_api_structs::*;
use stay_notifier_domain::ID;
use std::sync::Arc;

#[derive(Clone)]
pub struct DispatchClient {
    base: Arc<BaseClient>,
}

/// Clock override of a tick, both parts are optional
#[derive(Debug, Default)]
pub struct RunTickInput {
    /// `HH:MM`
    pub manual_time: Option<String>,
    /// `YYYY-MM-DD`
    pub manual_date: Option<String>,
}

pub struct SendManualInput {
    pub stay_id: ID,
    pub kind: String,
    pub template_id: Option<ID>,
    pub custom_body: Option<String>,
}

impl DispatchClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn run_tick(&self, input: RunTickInput) -> APIResponse<run_tick::APIResponse> {
        let query = run_tick::QueryParams {
            manual_time: input.manual_time,
            manual_date: input.manual_date,
        };
        self.base
            .get_with_query("cron".into(), &query, StatusCode::OK)
            .await
    }

    pub async fn get_logs(
        &self,
        limit: Option<usize>,
    ) -> APIResponse<get_dispatch_logs::APIResponse> {
        let query = get_dispatch_logs::QueryParams { limit };
        self.base
            .get_with_query("dispatch-logs".into(), &query, StatusCode::OK)
            .await
    }

    pub async fn send_manual(
        &self,
        input: SendManualInput,
    ) -> APIResponse<send_manual::APIResponse> {
        let body = send_manual::RequestBody {
            stay_id: input.stay_id,
            kind: input.kind,
            template_id: input.template_id,
            custom_body: input.custom_body,
        };
        self.base
            .post(body, "dispatch/manual".into(), StatusCode::OK)
            .await
    }
}
