use super::{ISmsTransport, SendOutcome};
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SentSms {
    pub destination: String,
    pub body: String,
    pub subject: Option<String>,
}

/// Transport that only logs and remembers the messages it is given
pub struct MockSmsTransport {
    sent: Mutex<Vec<SentSms>>,
    failing_destinations: Mutex<Vec<String>>,
}

impl MockSmsTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_destinations: Mutex::new(Vec::new()),
        }
    }

    /// Every later send to `destination` fails
    pub fn fail_for(&self, destination: &str) {
        self.failing_destinations
            .lock()
            .unwrap()
            .push(destination.to_string());
    }

    /// Messages that were delivered, in sending order
    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockSmsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ISmsTransport for MockSmsTransport {
    async fn send(&self, destination: &str, body: &str, subject: Option<&str>) -> SendOutcome {
        let failing = self
            .failing_destinations
            .lock()
            .unwrap()
            .iter()
            .any(|d| d == destination);
        if failing {
            info!("[MOCK SEND] Failing send to: {}", destination);
            return SendOutcome::Failed {
                reason: format!("Mock transport configured to fail for {}", destination),
            };
        }

        info!(
            "[MOCK SEND] To: {}, Subject: {:?}, Content: {}",
            destination, subject, body
        );
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentSms {
            destination: destination.to_string(),
            body: body.to_string(),
            subject: subject.map(String::from),
        });
        SendOutcome::Delivered {
            message_id: format!("mock_{}", sent.len()),
        }
    }
}
