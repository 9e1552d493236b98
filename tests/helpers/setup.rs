use stay_notifier_api::Application;
use stay_notifier_infra::{MockSmsTransport, NotifierContext, StaticTimeSys};
use stay_notifier_sdk::StayNotifierSDK;
use std::sync::Arc;

pub struct TestApp {
    pub ctx: NotifierContext,
    pub sms: Arc<MockSmsTransport>,
}

// Sat May 10 2025 09:00:00 in Seoul
pub const FROZEN_NOW_MILLIS: i64 = 1746835200000;

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, StayNotifierSDK, String) {
    let sms = Arc::new(MockSmsTransport::new());
    let mut ctx = NotifierContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.sys = Arc::new(StaticTimeSys {
        timestamp_millis: FROZEN_NOW_MILLIS,
    });
    ctx.sms = sms.clone();

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { ctx, sms };
    let sdk = StayNotifierSDK::new(address.clone());
    (app, sdk, address)
}
