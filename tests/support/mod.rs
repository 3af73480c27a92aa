#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use defi_position_monitor::adapters::{AdapterError, BorrowMarketReader, MarketTotals, UserPosition, VaultReader};
use defi_position_monitor::models::{BorrowMarket, LendingMarket, PositionReport, VaultCapabilities};
use defi_position_monitor::services::ReportSink;
use defi_position_monitor::valuation::{BorrowDecimals, CapabilityError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const OWNER: &str = "0x742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8";

pub fn wad(units: u64) -> U256 {
    U256::from(units) * U256::from(1_000_000_000_000_000_000u64)
}

pub fn owner() -> Address {
    OWNER.parse().unwrap()
}

pub fn lending_market(name: &str, byte: u8, asset_decimals: u32, capabilities: VaultCapabilities) -> LendingMarket {
    LendingMarket::new(name, Address::repeat_byte(byte), asset_decimals, capabilities)
}

pub fn borrow_market(name: &str, byte: u8, decimals: BorrowDecimals) -> BorrowMarket {
    BorrowMarket {
        name: name.to_string(),
        morpho_address: Address::repeat_byte(0xaa),
        market_id: B256::repeat_byte(byte),
        decimals,
    }
}

/// Scripted state of one vault.
#[derive(Debug, Clone, Default)]
pub struct VaultScript {
    pub balance: U256,
    pub total_assets: U256,
    pub total_supply: U256,
    /// `None` makes `convertToAssets` revert.
    pub converted: Option<U256>,
    pub fail_balance: bool,
    pub fail_totals: bool,
}

/// In-memory vault reader that counts the calls it receives.
#[derive(Default)]
pub struct MockVaultReader {
    vaults: HashMap<Address, VaultScript>,
    pub balance_calls: AtomicUsize,
    pub total_calls: AtomicUsize,
    pub convert_calls: AtomicUsize,
}

impl MockVaultReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vault(mut self, market: &LendingMarket, script: VaultScript) -> Self {
        self.vaults.insert(market.address, script);
        self
    }

    fn script(&self, vault: &LendingMarket) -> Result<&VaultScript, AdapterError> {
        self.vaults
            .get(&vault.address)
            .ok_or_else(|| AdapterError::ContractError(format!("no contract at {}", vault.address)))
    }
}

#[async_trait]
impl VaultReader for MockVaultReader {
    async fn balance_of(&self, vault: &LendingMarket, _owner: Address) -> Result<U256, AdapterError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(vault)?;
        if script.fail_balance {
            return Err(AdapterError::RpcError("balanceOf timed out after 30s".to_string()));
        }
        Ok(script.balance)
    }

    async fn total_assets(&self, vault: &LendingMarket) -> Result<U256, AdapterError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(vault)?;
        if script.fail_totals {
            return Err(AdapterError::ContractError("totalAssets failed: execution reverted".to_string()));
        }
        Ok(script.total_assets)
    }

    async fn total_supply(&self, vault: &LendingMarket) -> Result<U256, AdapterError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(vault)?;
        if script.fail_totals {
            return Err(AdapterError::ContractError("totalSupply failed: execution reverted".to_string()));
        }
        Ok(script.total_supply)
    }

    async fn convert_to_assets(&self, vault: &LendingMarket, _shares: U256) -> Result<U256, CapabilityError> {
        if !vault.capabilities.supports_direct_conversion() {
            return Err(CapabilityError::Unsupported);
        }
        self.convert_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .script(vault)
            .map_err(|e| CapabilityError::Failed(e.to_string()))?;
        script
            .converted
            .ok_or_else(|| CapabilityError::Failed("convertToAssets failed: execution reverted".to_string()))
    }
}

/// In-memory borrow market reader. Unknown markets fail.
#[derive(Default)]
pub struct MockBorrowReader {
    markets: HashMap<B256, (MarketTotals, UserPosition)>,
}

impl MockBorrowReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, market: &BorrowMarket, totals: MarketTotals, position: UserPosition) -> Self {
        self.markets.insert(market.market_id, (totals, position));
        self
    }
}

#[async_trait]
impl BorrowMarketReader for MockBorrowReader {
    async fn market(&self, market: &BorrowMarket) -> Result<MarketTotals, AdapterError> {
        self.markets
            .get(&market.market_id)
            .map(|(totals, _)| *totals)
            .ok_or_else(|| AdapterError::ContractError("market failed: execution reverted".to_string()))
    }

    async fn position(&self, market: &BorrowMarket, _owner: Address) -> Result<UserPosition, AdapterError> {
        self.markets
            .get(&market.market_id)
            .map(|(_, position)| *position)
            .ok_or_else(|| AdapterError::ContractError("position failed: execution reverted".to_string()))
    }
}

/// Keeps every published report.
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<PositionReport>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<PositionReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingSink {
    fn publish(&self, report: &PositionReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
