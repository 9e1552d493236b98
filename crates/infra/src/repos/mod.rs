mod dispatch_log;
mod shared;
mod stay;
mod template;

pub use dispatch_log::{AppendResult, IDispatchLogRepo};
use dispatch_log::{InMemoryDispatchLogRepo, PostgresDispatchLogRepo};
use sqlx::postgres::PgPoolOptions;
pub use stay::IStayRepo;
use stay::{InMemoryStayRepo, PostgresStayRepo};
use std::sync::Arc;
pub use template::ITemplateRepo;
use template::{InMemoryTemplateRepo, PostgresTemplateRepo};
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub stays: Arc<dyn IStayRepo>,
    pub templates: Arc<dyn ITemplateRepo>,
    pub dispatch_logs: Arc<dyn IDispatchLogRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> Result<Self, sqlx::Error> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            stays: Arc::new(PostgresStayRepo::new(pool.clone())),
            templates: Arc::new(PostgresTemplateRepo::new(pool.clone())),
            dispatch_logs: Arc::new(PostgresDispatchLogRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            stays: Arc::new(InMemoryStayRepo::new()),
            templates: Arc::new(InMemoryTemplateRepo::new()),
            dispatch_logs: Arc::new(InMemoryDispatchLogRepo::new()),
        }
    }
}
