use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::markets::{load_markets_file, MarketsFile};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub blockchain: BlockchainSettings,
    pub monitoring: MonitoringSettings,
    pub logging: LoggingSettings,
    pub markets_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainSettings {
    /// Only commands that read chain state need it.
    pub rpc_url: Option<String>,
    pub rpc_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSettings {
    pub check_interval_seconds: u64,
    pub first_check_delay_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

/// Flat view of the environment, as the `config` crate sees it.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    rpc_url: Option<String>,
    rpc_timeout_seconds: u64,
    check_interval_seconds: u64,
    first_check_delay_seconds: u64,
    log_level: String,
    log_format: String,
    markets_file: String,
}

pub const DEFAULT_MARKETS_FILE: &str = "config/markets.toml";
pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 1800;
pub const DEFAULT_FIRST_CHECK_DELAY_SECONDS: u64 = 10;
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

impl Default for Settings {
    fn default() -> Self {
        Settings {
            blockchain: BlockchainSettings::default(),
            monitoring: MonitoringSettings::default(),
            logging: LoggingSettings::default(),
            markets_file: PathBuf::from(DEFAULT_MARKETS_FILE),
        }
    }
}

impl Default for BlockchainSettings {
    fn default() -> Self {
        BlockchainSettings {
            rpc_url: None,
            rpc_timeout_seconds: DEFAULT_RPC_TIMEOUT_SECONDS,
        }
    }
}

impl BlockchainSettings {
    pub fn require_rpc_url(&self) -> Result<&str, AppError> {
        self.rpc_url
            .as_deref()
            .ok_or_else(|| AppError::ConfigError("RPC_URL must be set".to_string()))
    }
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        MonitoringSettings {
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECONDS,
            first_check_delay_seconds: DEFAULT_FIRST_CHECK_DELAY_SECONDS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn new() -> Result<Self, AppError> {
        let source = config::Environment::default();
        Self::from_source(source)
    }

    pub fn from_source<S>(source: S) -> Result<Self, AppError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let env: EnvSettings = config::Config::builder()
            .set_default("rpc_timeout_seconds", DEFAULT_RPC_TIMEOUT_SECONDS)?
            .set_default("check_interval_seconds", DEFAULT_CHECK_INTERVAL_SECONDS)?
            .set_default("first_check_delay_seconds", DEFAULT_FIRST_CHECK_DELAY_SECONDS)?
            .set_default("log_level", "info")?
            .set_default("log_format", "compact")?
            .set_default("markets_file", DEFAULT_MARKETS_FILE)?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        let rpc_url = env.rpc_url.filter(|url| !url.trim().is_empty());

        let settings = Settings {
            blockchain: BlockchainSettings {
                rpc_url,
                rpc_timeout_seconds: env.rpc_timeout_seconds,
            },
            monitoring: MonitoringSettings {
                check_interval_seconds: env.check_interval_seconds,
                first_check_delay_seconds: env.first_check_delay_seconds,
            },
            logging: LoggingSettings {
                level: env.log_level,
                format: env.log_format,
            },
            markets_file: PathBuf::from(env.markets_file),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.monitoring.check_interval_seconds == 0 {
            return Err(AppError::ConfigError(
                "CHECK_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }
        if self.blockchain.rpc_timeout_seconds == 0 {
            return Err(AppError::ConfigError(
                "RPC_TIMEOUT_SECONDS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_markets(&self) -> Result<MarketsFile, AppError> {
        load_markets_file(&self.markets_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config::Environment::default().source(Some(source))
    }

    #[test]
    fn test_defaults_applied() {
        let settings = Settings::from_source(env(&[("RPC_URL", "https://rpc.example.org")])).unwrap();
        assert_eq!(settings.blockchain.require_rpc_url().unwrap(), "https://rpc.example.org");
        assert_eq!(settings.monitoring.check_interval_seconds, 1800);
        assert_eq!(settings.monitoring.first_check_delay_seconds, 10);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.markets_file, PathBuf::from("config/markets.toml"));
    }

    #[test]
    fn test_overrides_from_environment() {
        let settings = Settings::from_source(env(&[
            ("RPC_URL", "https://rpc.example.org"),
            ("CHECK_INTERVAL_SECONDS", "60"),
            ("LOG_FORMAT", "json"),
            ("MARKETS_FILE", "/etc/markets.toml"),
        ]))
        .unwrap();
        assert_eq!(settings.monitoring.check_interval_seconds, 60);
        assert_eq!(settings.logging.format, "json");
        assert_eq!(settings.markets_file, PathBuf::from("/etc/markets.toml"));
    }

    #[test]
    fn test_missing_rpc_url_only_fails_on_use() {
        let settings = Settings::from_source(env(&[])).unwrap();
        assert_eq!(settings.blockchain.rpc_url, None);
        assert!(matches!(
            settings.blockchain.require_rpc_url(),
            Err(AppError::ConfigError(_))
        ));

        let settings = Settings::from_source(env(&[("RPC_URL", "  ")])).unwrap();
        assert!(settings.blockchain.require_rpc_url().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = Settings::from_source(env(&[
            ("RPC_URL", "https://rpc.example.org"),
            ("CHECK_INTERVAL_SECONDS", "0"),
        ]));
        assert!(result.is_err());
    }
}
