use super::{ISmsTransport, SendOutcome};
use crate::config::SolapiConfig;
use chrono::{SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use stay_notifier_utils::create_random_secret;
use std::time::Duration;
use tracing::{error, info};

type HmacSha256 = Hmac<Sha256>;

const SEND_PATH: &str = "messages/v4/send";

#[derive(Debug, Serialize)]
struct SolapiMessage<'a> {
    to: &'a str,
    from: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SolapiSendRequest<'a> {
    message: SolapiMessage<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolapiSendResponse {
    #[serde(default)]
    message_id: Option<String>,
}

/// Sends messages through the Solapi REST api.
/// A message with a subject is sent as a long message (LMS).
pub struct SolapiSmsTransport {
    client: Client,
    config: SolapiConfig,
}

impl SolapiSmsTransport {
    pub fn new(config: SolapiConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    fn signature(secret: &str, date: &str, salt: &str) -> anyhow::Result<String> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
        mac.update(date.as_bytes());
        mac.update(salt.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn authorization_header(&self) -> anyhow::Result<String> {
        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let salt = create_random_secret(32);
        let signature = Self::signature(&self.config.api_secret, &date, &salt)?;
        Ok(format!(
            "HMAC-SHA256 apiKey={}, date={}, salt={}, signature={}",
            self.config.api_key, date, salt, signature
        ))
    }
}

#[async_trait::async_trait]
impl ISmsTransport for SolapiSmsTransport {
    async fn send(&self, destination: &str, body: &str, subject: Option<&str>) -> SendOutcome {
        let authorization = match self.authorization_header() {
            Ok(header) => header,
            Err(e) => {
                error!("Unable to sign solapi request. Error message: {:?}", e);
                return SendOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        let request = SolapiSendRequest {
            message: SolapiMessage {
                to: destination,
                from: &self.config.sender_number,
                text: body,
                subject,
            },
        };

        let res = match self
            .client
            .post(&format!(
                "{}/{}",
                self.config.base_url.trim_end_matches('/'),
                SEND_PATH
            ))
            .header("Authorization", authorization)
            .json(&request)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!("[Network Error] Solapi send error. Error message: {:?}", e);
                return SendOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            error!(
                "[Unexpected Response] Solapi rejected message to: {}. Status: {}, body: {}",
                destination, status, text
            );
            return SendOutcome::Failed {
                reason: format!("{}: {}", status, text),
            };
        }

        let message_id = match res.json::<SolapiSendResponse>().await {
            Ok(res) => res.message_id.unwrap_or_default(),
            Err(e) => {
                // Accepted by solapi, only the receipt is unreadable
                error!(
                    "[Unexpected Response] Solapi send response could not be parsed. Error message: {:?}",
                    e
                );
                String::new()
            }
        };
        info!("Solapi accepted message to: {} with id: {}", destination, message_id);
        SendOutcome::Delivered { message_id }
    }
}
