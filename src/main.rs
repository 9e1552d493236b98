mod telemetry;

use stay_notifier_api::Application;
use stay_notifier_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("stay_notifier_server".into(), "info".into());
    init_subscriber(subscriber);

    let context = match setup_context().await {
        Ok(context) => context,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Starting with timezone: {} and duplicate suppression: {}",
        context.config.timezone, context.config.dispatch_policy.suppress_duplicates
    );

    let app = Application::new(context).await?;
    app.start().await
}
