//! Pooled-debt accounting for share-based borrow markets.
//!
//! The health ratio here prices collateral and debt 1:1. There is no oracle
//! and no liquidation threshold, so it is an approximation and must be shown
//! as one.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::scaling::{bigint_to_decimal, check_decimals, mul_div_floor, to_decimal, SHARE_DECIMALS};
use super::ValuationError;
use crate::models::{BorrowResult, HealthRatio};

/// Decimals of each token role in a borrow market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowDecimals {
    pub collateral: u32,
    pub borrow_asset: u32,
    /// Only used to display the raw share count.
    pub borrow_shares: u32,
}

impl Default for BorrowDecimals {
    fn default() -> Self {
        BorrowDecimals {
            collateral: 18,
            borrow_asset: 6,
            borrow_shares: SHARE_DECIMALS,
        }
    }
}

impl BorrowDecimals {
    pub fn validate(&self) -> Result<(), ValuationError> {
        check_decimals(self.collateral)?;
        check_decimals(self.borrow_asset)?;
        check_decimals(self.borrow_shares)
    }
}

/// Amount owed by a borrower holding `user_borrow_shares` of the market's debt
/// pool, and the collateral backing it.
///
/// `borrowed_base = user_borrow_shares * total_borrow_assets / total_borrow_shares`
/// is computed on raw integers; the share decimals never enter it.
pub fn borrow_position(
    market_total_borrow_assets: U256,
    market_total_borrow_shares: U256,
    user_borrow_shares: U256,
    user_collateral_base: U256,
    decimals: BorrowDecimals,
) -> Result<BorrowResult, ValuationError> {
    decimals.validate()?;

    let collateral = to_decimal(user_collateral_base, decimals.collateral)?;
    let borrow_shares = to_decimal(user_borrow_shares, decimals.borrow_shares)?;

    let borrowed = if user_borrow_shares.is_zero() {
        BigDecimal::zero()
    } else {
        match mul_div_floor(
            user_borrow_shares,
            market_total_borrow_assets,
            market_total_borrow_shares,
        ) {
            Some(borrowed_base) => bigint_to_decimal(borrowed_base, decimals.borrow_asset)?,
            None => BigDecimal::zero(),
        }
    };

    let health_ratio = health_ratio(&collateral, &borrowed);

    Ok(BorrowResult {
        borrowed,
        collateral,
        borrow_shares,
        health_ratio,
    })
}

/// Collateral over debt, both taken at face value.
pub fn health_ratio(collateral: &BigDecimal, borrowed: &BigDecimal) -> HealthRatio {
    if borrowed.is_zero() {
        return HealthRatio::Unbounded;
    }
    if collateral.is_zero() {
        return HealthRatio::Finite(BigDecimal::zero());
    }
    HealthRatio::Finite(collateral / borrowed)
}
