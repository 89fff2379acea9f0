use crate::workflows::prakriti::plan::{DEFAULT_PLAN_WEEKS, MAX_PLAN_WEEKS};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub assessment: AssessmentSettings,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessment: AssessmentSettings::from_env()?,
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

pub const DEFAULT_SECONDARY_THRESHOLD_PCT: u8 = 80;
pub const DEFAULT_SAMPLE_PLAN_SEED: u64 = 108;

/// Tunables for classification and plan generation, plus optional paths to
/// replacement configuration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSettings {
    pub secondary_threshold_pct: u8,
    pub default_plan_weeks: u32,
    pub sample_plan_seed: u64,
    pub question_catalog: Option<PathBuf>,
    pub knowledge_base: Option<PathBuf>,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            secondary_threshold_pct: DEFAULT_SECONDARY_THRESHOLD_PCT,
            default_plan_weeks: DEFAULT_PLAN_WEEKS,
            sample_plan_seed: DEFAULT_SAMPLE_PLAN_SEED,
            question_catalog: None,
            knowledge_base: None,
        }
    }
}

impl AssessmentSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Ok(raw) = env::var("PRAKRITI_SECONDARY_THRESHOLD_PCT") {
            settings.secondary_threshold_pct = raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|value| *value <= 100)
                .ok_or(ConfigError::InvalidThreshold { value: raw })?;
        }

        if let Ok(raw) = env::var("PRAKRITI_DEFAULT_PLAN_WEEKS") {
            settings.default_plan_weeks = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|weeks| (1..=MAX_PLAN_WEEKS).contains(weeks))
                .ok_or(ConfigError::InvalidPlanWeeks { value: raw })?;
        }

        if let Ok(raw) = env::var("PRAKRITI_SAMPLE_PLAN_SEED") {
            settings.sample_plan_seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed { value: raw })?;
        }

        settings.question_catalog = non_empty_path("PRAKRITI_QUESTION_CATALOG");
        settings.knowledge_base = non_empty_path("PRAKRITI_KNOWLEDGE_BASE");

        Ok(settings)
    }
}

fn non_empty_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { value: String },
    InvalidPlanWeeks { value: String },
    InvalidSeed { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { value } => write!(
                f,
                "PRAKRITI_SECONDARY_THRESHOLD_PCT must be an integer between 0 and 100 (found '{value}')"
            ),
            ConfigError::InvalidPlanWeeks { value } => write!(
                f,
                "PRAKRITI_DEFAULT_PLAN_WEEKS must be between 1 and {MAX_PLAN_WEEKS} (found '{value}')"
            ),
            ConfigError::InvalidSeed { value } => {
                write!(f, "PRAKRITI_SAMPLE_PLAN_SEED must be a valid u64 (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidThreshold { .. }
            | ConfigError::InvalidPlanWeeks { .. }
            | ConfigError::InvalidSeed { .. } => None,
        }
    }
}
