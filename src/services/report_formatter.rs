//! Plain-text rendering of position reports.

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};
use std::fmt::Write;

use crate::config::PendingLendingMarket;
use crate::models::{BorrowMarket, HealthRatio, PositionReport};

const SEPARATOR: &str = "--------------------";
const MAX_ERROR_CHARS: usize = 100;
const AMOUNT_DECIMALS: i64 = 4;

/// Bucket of the approximate health ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Above 1.5 is healthy, above 1.1 is a warning, anything else is critical.
    pub fn classify(ratio: &HealthRatio) -> Self {
        match ratio {
            HealthRatio::Unbounded => HealthStatus::Healthy,
            HealthRatio::Finite(value) => {
                if value > &BigDecimal::new(15.into(), 1) {
                    HealthStatus::Healthy
                } else if value > &BigDecimal::new(11.into(), 1) {
                    HealthStatus::Warning
                } else {
                    HealthStatus::Critical
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Four decimal places with thousands separators, e.g. `1,234.5000`.
pub fn format_amount(value: &BigDecimal) -> String {
    let (units, _) = value
        .round(AMOUNT_DECIMALS)
        .with_scale(AMOUNT_DECIMALS)
        .into_bigint_and_exponent();

    let negative = units.is_negative();
    let digits = format!("{:0>5}", units.abs().to_string());
    let (integer, fraction) = digits.split_at(digits.len() - AMOUNT_DECIMALS as usize);

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

pub fn format_health_ratio(ratio: &HealthRatio) -> String {
    let status = HealthStatus::classify(ratio);
    match ratio {
        HealthRatio::Unbounded => format!("Infinity [{}]", status.label()),
        HealthRatio::Finite(value) => format!("{} [{}]", format_amount(value), status.label()),
    }
}

fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_report(report: &PositionReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Positions for {}", short_address(&report.address));
        let _ = writeln!(out, "{}", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));

        for entry in &report.lending {
            let _ = writeln!(out, "{}\nLending: {}", SEPARATOR, entry.name);
            match &entry.result {
                Err(e) => {
                    let _ = writeln!(out, "Error: {}", truncate_error(&e.to_string()));
                }
                Ok(valuation) if entry.shares.as_ref().map_or(false, |shares| !shares.is_zero()) => {
                    let _ = writeln!(out, "Assets: {} ({})", format_amount(&valuation.value), valuation.method);
                    if let Some(shares) = &entry.shares {
                        let _ = writeln!(out, "Shares: {}", format_amount(shares));
                    }
                }
                Ok(_) => {
                    let _ = writeln!(out, "No lending position");
                }
            }
        }

        for entry in &report.borrow {
            let _ = writeln!(out, "{}\nBorrow: {}", SEPARATOR, entry.name);
            match &entry.result {
                Err(e) => {
                    let _ = writeln!(out, "Error: {}", truncate_error(&e.to_string()));
                }
                Ok(position) if position.has_position() => {
                    let _ = writeln!(out, "Borrowed: {}", format_amount(&position.borrowed));
                    let _ = writeln!(out, "Collateral: {}", format_amount(&position.collateral));
                    let _ = writeln!(
                        out,
                        "Health ratio (approx., 1:1 pricing): {}",
                        format_health_ratio(&position.health_ratio)
                    );
                }
                Ok(_) => {
                    let _ = writeln!(out, "No borrow position");
                }
            }
        }

        let _ = writeln!(out, "{}", SEPARATOR);
        let _ = writeln!(out, "Total lending: {}", format_amount(&report.total_lending()));
        let _ = writeln!(out, "Total borrowed: {}", format_amount(&report.total_borrowed()));
        let _ = writeln!(out, "Net value: {}", format_amount(&report.net_value()));
        out
    }

    /// Configured markets, with capabilities as declared in the markets file.
    pub fn format_markets(lending: &[PendingLendingMarket], borrow: &[BorrowMarket]) -> String {
        let mut out = String::from("Lending markets:\n");
        for (i, market) in lending.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} {} (asset decimals {}, {})",
                i + 1,
                market.name,
                market.address,
                market.asset_decimals,
                market.capabilities
            );
        }

        out.push_str("Borrow markets:\n");
        for (i, market) in borrow.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} {} (collateral decimals {}, borrow decimals {})",
                i + 1,
                market.name,
                market.market_id,
                market.decimals.collateral,
                market.decimals.borrow_asset
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BorrowEntry, BorrowResult, LendingEntry, Valuation, ValuationMethod};
    use crate::valuation::ValuationError;
    use alloy::primitives::B256;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&dec("0")), "0.0000");
        assert_eq!(format_amount(&dec("10")), "10.0000");
        assert_eq!(format_amount(&dec("1234567.891")), "1,234,567.8910");
        assert_eq!(format_amount(&dec("0.00001")), "0.0000");
        assert_eq!(format_amount(&dec("-1500.5")), "-1,500.5000");
        assert_eq!(format_amount(&dec("999.99999")), "1,000.0000");
    }

    #[test]
    fn test_short_address() {
        let address = Address::from_str("0x742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8").unwrap();
        assert_eq!(short_address(&address), "0x742d...b8b8");
    }

    #[test]
    fn test_health_status_buckets() {
        assert_eq!(HealthStatus::classify(&HealthRatio::Unbounded), HealthStatus::Healthy);
        assert_eq!(HealthStatus::classify(&HealthRatio::Finite(dec("4"))), HealthStatus::Healthy);
        assert_eq!(HealthStatus::classify(&HealthRatio::Finite(dec("1.5"))), HealthStatus::Warning);
        assert_eq!(HealthStatus::classify(&HealthRatio::Finite(dec("1.1"))), HealthStatus::Critical);
        assert_eq!(HealthStatus::classify(&HealthRatio::Finite(dec("0"))), HealthStatus::Critical);
    }

    #[test]
    fn test_format_report() {
        let report = PositionReport {
            address: Address::ZERO,
            timestamp: Utc::now(),
            lending: vec![
                LendingEntry {
                    name: "USDT0".to_string(),
                    address: Address::ZERO,
                    shares: Some(dec("9500")),
                    result: Ok(Valuation::new(dec("10"), ValuationMethod::PoolRatio)),
                },
                LendingEntry {
                    name: "USDe".to_string(),
                    address: Address::ZERO,
                    shares: Some(dec("0")),
                    result: Ok(Valuation::new(dec("0"), ValuationMethod::NoBalance)),
                },
                LendingEntry {
                    name: "HYPE".to_string(),
                    address: Address::ZERO,
                    shares: None,
                    result: Err(ValuationError::data_unavailable("totalAssets", "execution reverted")),
                },
            ],
            borrow: vec![BorrowEntry {
                name: "WHLP/USDT0".to_string(),
                market_id: B256::ZERO,
                result: Ok(BorrowResult {
                    borrowed: dec("0.5"),
                    collateral: dec("2"),
                    borrow_shares: dec("0.5"),
                    health_ratio: HealthRatio::Finite(dec("4")),
                }),
            }],
        };

        let text = ReportFormatter::format_report(&report);
        assert!(text.contains("Positions for 0x0000...0000"));
        assert!(text.contains("Assets: 10.0000 (pool-ratio)"));
        assert!(text.contains("Shares: 9,500.0000"));
        assert!(text.contains("No lending position"));
        assert!(text.contains("Error: Data unavailable: could not read totalAssets"));
        assert!(text.contains("Borrowed: 0.5000"));
        assert!(text.contains("Health ratio (approx., 1:1 pricing): 4.0000 [healthy]"));
        assert!(text.contains("Total lending: 10.0000"));
        assert!(text.contains("Total borrowed: 0.5000"));
        assert!(text.contains("Net value: 9.5000"));
    }

    #[test]
    fn test_format_markets() {
        use crate::config::CapabilitySetting;
        use crate::valuation::BorrowDecimals;

        let lending = vec![PendingLendingMarket {
            name: "HYPE".to_string(),
            address: Address::ZERO,
            asset_decimals: 18,
            capabilities: CapabilitySetting::Auto,
        }];
        let borrow = vec![BorrowMarket {
            name: "WHLP/USDT0".to_string(),
            morpho_address: Address::ZERO,
            market_id: B256::ZERO,
            decimals: BorrowDecimals::default(),
        }];

        let text = ReportFormatter::format_markets(&lending, &borrow);
        assert!(text.contains("1. HYPE"));
        assert!(text.contains("(asset decimals 18, auto)"));
        assert!(text.contains("1. WHLP/USDT0"));
        assert!(text.contains("collateral decimals 18, borrow decimals 6"));
    }

    #[test]
    fn test_long_errors_truncated() {
        let long = "x".repeat(500);
        assert_eq!(truncate_error(&long).len(), MAX_ERROR_CHARS);
    }
}
