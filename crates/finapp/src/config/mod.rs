use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let endpoint =
            env::var("APP_API_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let api = ApiConfig::new(endpoint)?;

        let data_dir = match non_empty_var("APP_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join("finapp"))
                .ok_or(ConfigError::MissingDataDir)?,
        };

        let session = SessionConfig {
            user_id: non_empty_var("APP_SESSION_USER_ID"),
            email: non_empty_var("APP_SESSION_EMAIL"),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            api,
            storage: StorageConfig { data_dir },
            session,
        })
    }

    /// The bundled storage backend keeps records in memory only, so production refuses it.
    pub fn ensure_development_backend(&self) -> Result<(), ConfigError> {
        match self.environment {
            AppEnvironment::Production => Err(ConfigError::DevelopmentBackendInProduction),
            AppEnvironment::Development | AppEnvironment::Test => Ok(()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Settings controlling the development backend binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the remote application storage API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
}

impl ApiConfig {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint = endpoint.into();
        match reqwest::Url::parse(&endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self { endpoint }),
            _ => Err(ConfigError::InvalidEndpoint { value: endpoint }),
        }
    }
}

/// Where durable client state (drafts, preferences) is kept.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// The signed-in user for this process, standing in for the hosted identity service.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidEndpoint { value: String },
    MissingDataDir,
    DevelopmentBackendInProduction,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidEndpoint { value } => {
                write!(f, "APP_API_ENDPOINT must be an http(s) URL, got '{value}'")
            }
            ConfigError::MissingDataDir => {
                write!(f, "APP_DATA_DIR is unset and no platform data directory exists")
            }
            ConfigError::DevelopmentBackendInProduction => write!(
                f,
                "the in-memory storage backend cannot run with APP_ENV=production; point APP_API_ENDPOINT at the real service"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidEndpoint { .. }
            | ConfigError::MissingDataDir
            | ConfigError::DevelopmentBackendInProduction => None,
        }
    }
}
