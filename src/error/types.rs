use std::fmt;

use crate::adapters::AdapterError;
use crate::blockchain::EthereumError;
use crate::services::SessionError;
use crate::valuation::ValuationError;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    BlockchainError(String),
    ValidationError(String),
    ValuationError(ValuationError),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::BlockchainError(msg) => write!(f, "Blockchain error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ValuationError(err) => write!(f, "Valuation error: {}", err),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigError(format!("Invalid markets file: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

impl From<EthereumError> for AppError {
    fn from(err: EthereumError) -> Self {
        match err {
            EthereumError::InvalidAddress(msg) => AppError::ValidationError(msg),
            other => AppError::BlockchainError(other.to_string()),
        }
    }
}

impl From<AdapterError> for AppError {
    fn from(err: AdapterError) -> Self {
        AppError::BlockchainError(err.to_string())
    }
}

impl From<ValuationError> for AppError {
    fn from(err: ValuationError) -> Self {
        AppError::ValuationError(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
