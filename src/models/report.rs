use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::Serialize;

use super::{BorrowResult, ValuationResult};
use crate::valuation::ValuationError;

#[derive(Debug, Clone, Serialize)]
pub struct LendingEntry {
    pub name: String,
    pub address: Address,
    /// Share balance at the fixed share scale, when it could be read.
    pub shares: Option<BigDecimal>,
    pub result: ValuationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct BorrowEntry {
    pub name: String,
    pub market_id: B256,
    pub result: Result<BorrowResult, ValuationError>,
}

/// Every configured market valued for one address.
#[derive(Debug, Clone, Serialize)]
pub struct PositionReport {
    pub address: Address,
    pub timestamp: DateTime<Utc>,
    pub lending: Vec<LendingEntry>,
    pub borrow: Vec<BorrowEntry>,
}

impl PositionReport {
    /// Sum of successful lending valuations. Assets are added at face value.
    pub fn total_lending(&self) -> BigDecimal {
        self.lending
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok())
            .fold(BigDecimal::zero(), |acc, valuation| acc + &valuation.value)
    }

    pub fn total_borrowed(&self) -> BigDecimal {
        self.borrow
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok())
            .fold(BigDecimal::zero(), |acc, position| acc + &position.borrowed)
    }

    pub fn net_value(&self) -> BigDecimal {
        self.total_lending() - self.total_borrowed()
    }

    pub fn failed_markets(&self) -> usize {
        let lending = self.lending.iter().filter(|entry| entry.result.is_err()).count();
        let borrow = self.borrow.iter().filter(|entry| entry.result.is_err()).count();
        lending + borrow
    }
}
