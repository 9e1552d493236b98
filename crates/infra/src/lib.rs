mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, ConfigError, SolapiConfig, StoreConfig, TransportConfig};
pub use repos::{AppendResult, IDispatchLogRepo, IStayRepo, ITemplateRepo, Repos};
pub use services::sms::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::error;

#[derive(Clone)]
pub struct NotifierContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub sms: Arc<dyn ISmsTransport>,
}

impl NotifierContext {
    /// Inmemory stores, the mock transport and the real clock
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::default(),
            sys: Arc::new(RealSys {}),
            sms: Arc::new(MockSmsTransport::new()),
        }
    }

    async fn create(config: Config) -> Result<Self, ConfigError> {
        let repos = match &config.store {
            StoreConfig::Postgres { connection_string } => {
                run_migration(connection_string).await.map_err(|e| {
                    error!("Unable to migrate the store. Error: {:?}", e);
                    ConfigError::StoreUnreachable(e.to_string())
                })?;
                Repos::create_postgres(connection_string)
                    .await
                    .map_err(|e| ConfigError::StoreUnreachable(e.to_string()))?
            }
            StoreConfig::InMemory => Repos::create_inmemory(),
        };
        let sms: Arc<dyn ISmsTransport> = match &config.transport {
            TransportConfig::Solapi(solapi) => Arc::new(
                SolapiSmsTransport::new(solapi.clone())
                    .map_err(|e| ConfigError::TransportUnavailable(e.to_string()))?,
            ),
            TransportConfig::Mock => Arc::new(MockSmsTransport::new()),
        };

        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            sms,
        })
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> Result<NotifierContext, ConfigError> {
    let config = Config::new()?;
    NotifierContext::create(config).await
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Unable to connect: {0}")]
    Connect(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

pub async fn run_migration(connection_string: &str) -> Result<(), MigrationError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
