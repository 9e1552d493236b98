mod base;
mod dispatch;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
use dispatch::DispatchClient;
pub use dispatch::{RunTickInput, SendManualInput};
pub use stay_notifier_api_structs::dtos::*;
pub use stay_notifier_domain::{DispatchOutcome, ID};
use status::StatusClient;
use std::sync::Arc;

/// Stay Notifier Server SDK
///
/// The SDK contains methods for interacting with the Stay Notifier server
/// API.
#[derive(Clone)]
pub struct StayNotifierSDK {
    pub dispatch: DispatchClient,
    pub status: StatusClient,
}

impl StayNotifierSDK {
    /// `address` is the api root, e.g. `http://localhost:5000/api/v1`
    pub fn new<T: Into<String>>(address: T) -> Self {
        let base = Arc::new(BaseClient::new(address.into()));
        let dispatch = DispatchClient::new(base.clone());
        let status = StatusClient::new(base);

        Self { dispatch, status }
    }
}
