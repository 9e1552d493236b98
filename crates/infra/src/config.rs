use chrono_tz::Tz;
use stay_notifier_domain::DispatchPolicy;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_PORT: usize = 5000;
const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;
const DEFAULT_SOLAPI_BASE_URL: &str = "https://api.solapi.com";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("The {0} environment variable is required when {1}")]
    MissingVariable(&'static str, &'static str),
    #[error("Unsupported value for {var}: `{value}`. Expected one of: {expected}")]
    UnsupportedValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("Unable to connect to the store: {0}")]
    StoreUnreachable(String),
    #[error("Unable to set up the sms transport: {0}")]
    TransportUnavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Postgres { connection_string: String },
    InMemory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolapiConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Registered number the messages are sent from
    pub sender_number: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportConfig {
    Solapi(SolapiConfig),
    /// Logs messages instead of sending them
    Mock,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// The one civil timezone stays, templates and dispatch days live in
    pub timezone: Tz,
    pub dispatch_policy: DispatchPolicy,
    /// Whether the application itself should run a tick every minute.
    /// Disable when an external scheduler calls the trigger endpoint.
    pub run_tick_scheduler: bool,
    pub store: StoreConfig,
    pub transport: TransportConfig,
}

fn parse_flag(var: &str, value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => default,
        Some(v) if v == "true" || v == "1" || v == "yes" => true,
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        Some(v) => {
            warn!(
                "The given {}: {} is not a valid flag, falling back to the default: {}.",
                var, v, default
            );
            default
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(|key| std::env::var(key).ok())
    }

    pub fn from_env<F: Fn(&str) -> Option<String>>(env: F) -> Result<Self, ConfigError> {
        let port = match env("PORT") {
            None => DEFAULT_PORT,
            Some(port) => match port.parse::<usize>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "The given PORT: {} is not valid, falling back to the default port: {}.",
                        port, DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
        };

        let timezone = match env("TIMEZONE") {
            None => DEFAULT_TIMEZONE,
            Some(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given TIMEZONE: {} is not valid, falling back to the default timezone: {}.",
                        tz, DEFAULT_TIMEZONE
                    );
                    DEFAULT_TIMEZONE
                }
            },
        };

        let suppress_duplicates = parse_flag(
            "SUPPRESS_DUPLICATE_DISPATCH",
            env("SUPPRESS_DUPLICATE_DISPATCH"),
            true,
        );
        if !suppress_duplicates {
            warn!("Duplicate dispatch suppression is disabled. Guests may receive the same message more than once a day.");
        }

        let run_tick_scheduler = parse_flag("RUN_TICK_SCHEDULER", env("RUN_TICK_SCHEDULER"), true);

        let store = match env("STORE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StoreConfig::Postgres {
                connection_string: env("DATABASE_URL").ok_or(ConfigError::MissingVariable(
                    "DATABASE_URL",
                    "STORE_BACKEND is postgres",
                ))?,
            },
            "inmemory" => {
                warn!("Using the inmemory store. Nothing will survive a restart.");
                StoreConfig::InMemory
            }
            other => {
                return Err(ConfigError::UnsupportedValue {
                    var: "STORE_BACKEND",
                    value: other.to_string(),
                    expected: "postgres, inmemory",
                })
            }
        };

        let transport = match env("SMS_TRANSPORT").as_deref().unwrap_or("solapi") {
            "solapi" => {
                let required = |var: &'static str| {
                    env(var).ok_or(ConfigError::MissingVariable(var, "SMS_TRANSPORT is solapi"))
                };
                TransportConfig::Solapi(SolapiConfig {
                    api_key: required("SOLAPI_API_KEY")?,
                    api_secret: required("SOLAPI_SECRET_KEY")?,
                    sender_number: required("SOLAPI_SENDER_NUMBER")?,
                    base_url: env("SOLAPI_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_SOLAPI_BASE_URL.to_string()),
                })
            }
            "mock" => {
                info!("Using the mock sms transport. Messages will only be logged.");
                TransportConfig::Mock
            }
            other => {
                return Err(ConfigError::UnsupportedValue {
                    var: "SMS_TRANSPORT",
                    value: other.to_string(),
                    expected: "solapi, mock",
                })
            }
        };

        Ok(Self {
            port,
            timezone,
            dispatch_policy: DispatchPolicy {
                suppress_duplicates,
            },
            run_tick_scheduler,
            store,
            transport,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timezone: DEFAULT_TIMEZONE,
            dispatch_policy: Default::default(),
            run_tick_scheduler: false,
            store: StoreConfig::InMemory,
            transport: TransportConfig::Mock,
        }
    }
}
