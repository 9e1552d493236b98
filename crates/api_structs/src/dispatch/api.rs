use crate::dtos::DispatchLogDTO;
use serde::{Deserialize, Serialize};
use stay_notifier_domain::{DispatchOutcome, ID};

pub mod run_tick {
    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        /// Overrides the minute to match templates against, `HH:MM`
        #[serde(alias = "manual_time")]
        pub manual_time: Option<String>,
        /// Overrides the civil date, `YYYY-MM-DD`
        #[serde(alias = "manual_date")]
        pub manual_date: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub server_time: String,
        pub match_minute: String,
        pub candidates: usize,
        pub processed: usize,
        pub sent: usize,
        pub failed: usize,
        pub skipped_duplicate: usize,
    }
}

pub mod get_dispatch_logs {
    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    pub struct QueryParams {
        pub limit: Option<usize>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub logs: Vec<DispatchLogDTO>,
    }
}

pub mod send_manual {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub stay_id: ID,
        /// Logged as the trigger type `manual_<kind>`
        pub kind: String,
        #[serde(default)]
        pub template_id: Option<ID>,
        #[serde(default)]
        pub custom_body: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub trigger_type: String,
        pub outcome: DispatchOutcome,
        pub message_id: Option<String>,
    }
}
