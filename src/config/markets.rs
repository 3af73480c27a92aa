//! Market definitions loaded once at startup.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{BorrowMarket, LendingMarket, VaultCapabilities};
use crate::valuation::{BorrowDecimals, MAX_DECIMALS};

/// Declared accessor set of a lending vault. `Auto` is probed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilitySetting {
    #[default]
    Erc4626,
    PoolRatio,
    Auto,
}

impl CapabilitySetting {
    /// The statically known capability set, or `None` when it has to be probed.
    pub fn declared(&self) -> Option<VaultCapabilities> {
        match self {
            CapabilitySetting::Erc4626 => Some(VaultCapabilities::Erc4626),
            CapabilitySetting::PoolRatio => Some(VaultCapabilities::PoolRatioOnly),
            CapabilitySetting::Auto => None,
        }
    }
}

impl fmt::Display for CapabilitySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilitySetting::Erc4626 => f.write_str("erc4626"),
            CapabilitySetting::PoolRatio => f.write_str("pool-ratio"),
            CapabilitySetting::Auto => f.write_str("auto"),
        }
    }
}

fn default_asset_decimals() -> u32 {
    18
}

fn default_collateral_decimals() -> u32 {
    18
}

fn default_borrow_decimals() -> u32 {
    6
}

fn default_borrow_shares_decimals() -> u32 {
    18
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingMarketConfig {
    pub name: String,
    pub address: String,
    #[serde(default = "default_asset_decimals")]
    pub asset_decimals: u32,
    #[serde(default)]
    pub capabilities: CapabilitySetting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowMarketConfig {
    pub name: String,
    pub morpho_address: String,
    pub market_id: String,
    #[serde(default = "default_collateral_decimals")]
    pub collateral_decimals: u32,
    #[serde(default = "default_borrow_decimals")]
    pub borrow_decimals: u32,
    #[serde(default = "default_borrow_shares_decimals")]
    pub borrow_shares_decimals: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketsFile {
    #[serde(default)]
    pub lending: Vec<LendingMarketConfig>,
    #[serde(default)]
    pub borrow: Vec<BorrowMarketConfig>,
}

/// A lending market whose capabilities may still need probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLendingMarket {
    pub name: String,
    pub address: Address,
    pub asset_decimals: u32,
    pub capabilities: CapabilitySetting,
}

impl PendingLendingMarket {
    pub fn resolve(self, capabilities: VaultCapabilities) -> LendingMarket {
        LendingMarket::new(self.name, self.address, self.asset_decimals, capabilities)
    }
}

impl MarketsFile {
    pub fn from_toml_str(contents: &str) -> Result<Self, AppError> {
        let markets: MarketsFile = toml::from_str(contents)?;
        Ok(markets)
    }

    pub fn lending_markets(&self) -> Result<Vec<PendingLendingMarket>, AppError> {
        self.lending
            .iter()
            .map(|market| {
                require_name(&market.name)?;
                check_decimals(&market.name, "asset_decimals", market.asset_decimals)?;
                Ok(PendingLendingMarket {
                    name: market.name.clone(),
                    address: parse_address(&market.name, &market.address)?,
                    asset_decimals: market.asset_decimals,
                    capabilities: market.capabilities,
                })
            })
            .collect()
    }

    pub fn borrow_markets(&self) -> Result<Vec<BorrowMarket>, AppError> {
        self.borrow
            .iter()
            .map(|market| {
                require_name(&market.name)?;
                check_decimals(&market.name, "collateral_decimals", market.collateral_decimals)?;
                check_decimals(&market.name, "borrow_decimals", market.borrow_decimals)?;
                check_decimals(&market.name, "borrow_shares_decimals", market.borrow_shares_decimals)?;
                Ok(BorrowMarket {
                    name: market.name.clone(),
                    morpho_address: parse_address(&market.name, &market.morpho_address)?,
                    market_id: parse_market_id(&market.name, &market.market_id)?,
                    decimals: BorrowDecimals {
                        collateral: market.collateral_decimals,
                        borrow_asset: market.borrow_decimals,
                        borrow_shares: market.borrow_shares_decimals,
                    },
                })
            })
            .collect()
    }

    /// Validates every entry without resolving capabilities.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.lending.is_empty() && self.borrow.is_empty() {
            return Err(AppError::ConfigError("no markets configured".to_string()));
        }
        self.lending_markets()?;
        self.borrow_markets()?;
        Ok(())
    }
}

pub fn load_markets_file(path: &Path) -> Result<MarketsFile, AppError> {
    let markets: MarketsFile = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    markets.validate()?;

    tracing::info!(
        path = %path.display(),
        lending_markets = markets.lending.len(),
        borrow_markets = markets.borrow.len(),
        "Loaded market definitions"
    );
    Ok(markets)
}

fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::ConfigError("market name must not be empty".to_string()));
    }
    Ok(())
}

fn check_decimals(market: &str, field: &str, decimals: u32) -> Result<(), AppError> {
    if decimals > MAX_DECIMALS {
        return Err(AppError::ConfigError(format!(
            "{}: {} must be between 0 and {}, got {}",
            market, field, MAX_DECIMALS, decimals
        )));
    }
    Ok(())
}

fn parse_address(market: &str, address: &str) -> Result<Address, AppError> {
    Address::from_str(address.trim())
        .map_err(|e| AppError::ConfigError(format!("{}: invalid address {}: {}", market, address, e)))
}

fn parse_market_id(market: &str, market_id: &str) -> Result<B256, AppError> {
    let raw = market_id.trim().trim_start_matches("0x");
    let bytes = hex::decode(raw)
        .map_err(|e| AppError::ConfigError(format!("{}: invalid market id: {}", market, e)))?;
    if bytes.len() != 32 {
        return Err(AppError::ConfigError(format!(
            "{}: market id must be 32 bytes, got {}",
            market,
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}
