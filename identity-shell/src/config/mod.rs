use serde::Deserialize;
use shell_core::config as core_config;
use shell_core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Session document location. Relative paths live under the shared
    /// data dir.
    pub session_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthTimingConfig {
    /// Base simulated verification round-trip for the local channels.
    pub verify_latency_ms: u64,
    /// Upper bound of the random extra latency.
    pub latency_jitter_ms: u64,
    /// Base simulated handshake time for federated providers.
    pub provider_latency_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub storage: StorageConfig,
    pub auth: AuthTimingConfig,
}

impl ShellConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "dev".to_string())
            .parse::<Environment>()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment == Environment::Prod;

        let config = Self {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("identity-shell"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            storage: StorageConfig {
                session_file: get_env("SESSION_FILE", Some("session.json"), is_prod)?,
            },
            auth: AuthTimingConfig {
                verify_latency_ms: get_env_u64("AUTH_VERIFY_LATENCY_MS", Some("900"), is_prod)?,
                latency_jitter_ms: get_env_u64("AUTH_LATENCY_JITTER_MS", Some("250"), is_prod)?,
                provider_latency_ms: get_env_u64(
                    "AUTH_PROVIDER_LATENCY_MS",
                    Some("1200"),
                    is_prod,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Absolute or data-dir-relative location of the session document.
    pub fn session_path(&self) -> PathBuf {
        let file = Path::new(&self.storage.session_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            Path::new(&self.common.data_dir).join(file)
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.storage.session_file.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SESSION_FILE must not be empty"
            )));
        }
        if self.auth.verify_latency_ms > 60_000 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AUTH_VERIFY_LATENCY_MS must be at most 60000"
            )));
        }
        if self.auth.latency_jitter_ms > 10_000 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AUTH_LATENCY_JITTER_MS must be at most 10000"
            )));
        }
        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} must be set in production",
                    key
                )))
            } else if let Some(default) = default {
                Ok(default.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!("{} must be set", key)))
            }
        }
    }
}

fn get_env_u64(key: &str, default: Option<&str>, is_prod: bool) -> Result<u64, AppError> {
    get_env(key, default, is_prod)?.parse::<u64>().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} must be an integer: {}", key, e))
    })
}
