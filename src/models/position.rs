use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::valuation::{value_shares, BorrowDecimals, CapabilityError, ValuationError};

/// How a vault position's asset value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuationMethod {
    NoBalance,
    DirectConversion,
    PoolRatio,
    ZeroSupply,
}

impl ValuationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationMethod::NoBalance => "no-balance",
            ValuationMethod::DirectConversion => "direct-conversion",
            ValuationMethod::PoolRatio => "pool-ratio",
            ValuationMethod::ZeroSupply => "zero-supply",
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset value of a vault position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub value: BigDecimal,
    pub method: ValuationMethod,
    /// Why the direct conversion was skipped, when the value came from a fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<CapabilityError>,
}

impl Valuation {
    pub fn new(value: BigDecimal, method: ValuationMethod) -> Self {
        Self {
            value,
            method,
            fallback_reason: None,
        }
    }

    pub fn with_fallback_reason(mut self, reason: Option<CapabilityError>) -> Self {
        self.fallback_reason = reason;
        self
    }
}

pub type ValuationResult = Result<Valuation, ValuationError>;

/// Integers read from a vault for one user at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVaultState {
    pub user_shares: U256,
    pub total_assets: U256,
    pub total_shares: U256,
    /// Outcome of the vault's own `convertToAssets(user_shares)`.
    pub direct_assets: Result<U256, CapabilityError>,
}

impl RawVaultState {
    /// State of a user holding no shares; the vault totals are not needed.
    pub fn empty() -> Self {
        Self {
            user_shares: U256::ZERO,
            total_assets: U256::ZERO,
            total_shares: U256::ZERO,
            direct_assets: Err(CapabilityError::Unsupported),
        }
    }

    pub fn valuation(&self, asset_decimals: u32) -> ValuationResult {
        let direct = self.direct_assets.clone();
        value_shares(
            self.user_shares,
            self.total_assets,
            self.total_shares,
            asset_decimals,
            Some(move |_shares: U256| direct),
        )
    }
}

/// Integers read from a borrow market and a user's position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBorrowState {
    pub total_borrow_assets: U256,
    pub total_borrow_shares: U256,
    pub user_borrow_shares: U256,
    pub user_collateral: U256,
}

impl RawBorrowState {
    pub fn position(&self, decimals: BorrowDecimals) -> Result<BorrowResult, ValuationError> {
        crate::valuation::borrow_position(
            self.total_borrow_assets,
            self.total_borrow_shares,
            self.user_borrow_shares,
            self.user_collateral,
            decimals,
        )
    }
}

/// Collateral over debt at 1:1 pricing. Not a protocol health factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum HealthRatio {
    /// No open debt.
    Unbounded,
    Finite(BigDecimal),
}

impl HealthRatio {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, HealthRatio::Unbounded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowResult {
    pub borrowed: BigDecimal,
    pub collateral: BigDecimal,
    /// User borrow shares scaled by the market's share decimals, display only.
    pub borrow_shares: BigDecimal,
    pub health_ratio: HealthRatio,
}

impl BorrowResult {
    pub fn has_position(&self) -> bool {
        use num_traits::Zero;
        !self.borrowed.is_zero() || !self.collateral.is_zero()
    }
}
