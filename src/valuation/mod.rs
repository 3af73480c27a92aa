//! Position valuation engine.
//!
//! Everything in here is a pure function of integer inputs read from chain:
//! no I/O, no shared state. Base-unit integers always travel with their own
//! decimals and are only turned into decimals at the last step.

pub mod borrow;
pub mod scaling;
pub mod vault;

use serde::Serialize;

pub use borrow::{borrow_position, BorrowDecimals};
pub use scaling::{scale_divisor, to_base, to_decimal, MAX_DECIMALS, SHARE_DECIMALS};
pub use vault::{value_shares, value_shares_by_ratio};

/// Failure of a single valuation. Never aborts valuation of other markets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValuationError {
    #[error("Invalid decimals: {decimals} (supported range is 0..={max})", max = MAX_DECIMALS)]
    InvalidDecimals { decimals: u32 },

    #[error("Data unavailable: could not read {quantity}: {reason}")]
    DataUnavailable { quantity: String, reason: String },

    #[error("Amount out of range: {reason}")]
    OutOfRange { reason: String },
}

impl ValuationError {
    pub fn data_unavailable(quantity: impl Into<String>, reason: impl ToString) -> Self {
        ValuationError::DataUnavailable {
            quantity: quantity.into(),
            reason: reason.to_string(),
        }
    }

    pub fn out_of_range(reason: impl ToString) -> Self {
        ValuationError::OutOfRange {
            reason: reason.to_string(),
        }
    }
}

/// Outcome of an optional accessor such as `convertToAssets`.
///
/// `Unsupported` means the market never declared the accessor, `Failed` means
/// it was declared and the call itself went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "kebab-case")]
pub enum CapabilityError {
    #[error("accessor not supported by this market")]
    Unsupported,

    #[error("accessor call failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_serialize_with_kind_tag() {
        let json = serde_json::to_value(ValuationError::out_of_range("negative amount -1")).unwrap();
        assert_eq!(json["kind"], "out-of-range");
        assert_eq!(json["reason"], "negative amount -1");

        let json = serde_json::to_value(ValuationError::InvalidDecimals { decimals: 78 }).unwrap();
        assert_eq!(json["kind"], "invalid-decimals");
        assert_eq!(json["decimals"], 78);

        let json = serde_json::to_value(ValuationError::data_unavailable("totalAssets", "reverted")).unwrap();
        assert_eq!(json["kind"], "data-unavailable");
        assert_eq!(json["quantity"], "totalAssets");
    }
}
