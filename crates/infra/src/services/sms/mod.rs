mod mock;
mod solapi;

pub use mock::{MockSmsTransport, SentSms};
pub use solapi::SolapiSmsTransport;

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Delivered { message_id: String },
    Failed { reason: String },
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Outbound message transport. It never retries by itself, a failed
/// send is reported as `SendOutcome::Failed`.
#[async_trait::async_trait]
pub trait ISmsTransport: Send + Sync {
    async fn send(&self, destination: &str, body: &str, subject: Option<&str>) -> SendOutcome;
}
