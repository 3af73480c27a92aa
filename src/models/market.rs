use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::valuation::{BorrowDecimals, SHARE_DECIMALS};

/// Accessors a lending vault is known to expose, fixed when the market is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaultCapabilities {
    /// `balanceOf`, `totalAssets`, `totalSupply` and `convertToAssets`.
    Erc4626,
    /// `balanceOf`, `totalAssets` and `totalSupply` only.
    PoolRatioOnly,
}

impl VaultCapabilities {
    pub fn supports_direct_conversion(&self) -> bool {
        matches!(self, VaultCapabilities::Erc4626)
    }
}

impl fmt::Display for VaultCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultCapabilities::Erc4626 => f.write_str("erc4626"),
            VaultCapabilities::PoolRatioOnly => f.write_str("pool-ratio"),
        }
    }
}

/// A share-based lending vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LendingMarket {
    pub name: String,
    pub address: Address,
    pub asset_decimals: u32,
    pub share_decimals: u32,
    pub capabilities: VaultCapabilities,
}

impl LendingMarket {
    pub fn new(
        name: impl Into<String>,
        address: Address,
        asset_decimals: u32,
        capabilities: VaultCapabilities,
    ) -> Self {
        Self {
            name: name.into(),
            address,
            asset_decimals,
            share_decimals: SHARE_DECIMALS,
            capabilities,
        }
    }
}

/// A market inside a Morpho Blue style singleton contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowMarket {
    pub name: String,
    pub morpho_address: Address,
    pub market_id: B256,
    pub decimals: BorrowDecimals,
}
