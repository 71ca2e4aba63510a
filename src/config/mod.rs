use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_OUTPUT_BUCKET: &str = "crowd-predictions-demo-2025";
const DEFAULT_OUTPUT_FOLDER: &str = "predictions";

/// Distinguishes runtime behavior for different stages of the service.
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
    pub scoring: ScoringConfig,
    pub artifacts: ArtifactConfig,
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

        let endpoint_url = env::var("SCORING_ENDPOINT_URL").ok();
        let storage_base_url = env::var("STORAGE_BASE_URL").ok();
        let output_bucket =
            env::var("OUTPUT_BUCKET").unwrap_or_else(|_| DEFAULT_OUTPUT_BUCKET.to_string());
        let output_folder =
            env::var("OUTPUT_FOLDER").unwrap_or_else(|_| DEFAULT_OUTPUT_FOLDER.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig { endpoint_url },
            artifacts: ArtifactConfig {
                storage_base_url,
                output_bucket,
                output_folder,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
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

/// Inference endpoint settings.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub endpoint_url: Option<String>,
}

impl ScoringConfig {
    pub fn require_endpoint_url(&self) -> Result<&str, ConfigError> {
        self.endpoint_url
            .as_deref()
            .ok_or(ConfigError::Missing {
                variable: "SCORING_ENDPOINT_URL",
            })
    }
}

/// Object storage targets for published artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub storage_base_url: Option<String>,
    pub output_bucket: String,
    pub output_folder: String,
}

impl ArtifactConfig {
    pub fn require_storage_base_url(&self) -> Result<&str, ConfigError> {
        self.storage_base_url
            .as_deref()
            .ok_or(ConfigError::Missing {
                variable: "STORAGE_BASE_URL",
            })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    Missing { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::Missing { variable } => {
                write!(f, "{variable} must be set")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::Missing { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
