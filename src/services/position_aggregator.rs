use alloy::primitives::Address;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::adapters::{BorrowMarketReader, Erc4626VaultAdapter, MorphoBlueAdapter, VaultReader};
use crate::blockchain::EthereumClient;
use crate::config::MarketsFile;
use crate::error::AppError;
use crate::models::{
    BorrowEntry, BorrowMarket, LendingEntry, LendingMarket, PositionReport, RawBorrowState, RawVaultState,
};
use crate::valuation::{to_decimal, ValuationError};

/// Values every configured market for one address.
///
/// Markets are read concurrently and independently: a failing market shows up
/// as a failed entry in the report and never affects the others.
pub struct PositionAggregator {
    lending: Vec<LendingMarket>,
    borrow: Vec<BorrowMarket>,
    vaults: Arc<dyn VaultReader>,
    borrow_markets: Arc<dyn BorrowMarketReader>,
}

impl PositionAggregator {
    pub fn new(
        lending: Vec<LendingMarket>,
        borrow: Vec<BorrowMarket>,
        vaults: Arc<dyn VaultReader>,
        borrow_markets: Arc<dyn BorrowMarketReader>,
    ) -> Self {
        Self {
            lending,
            borrow,
            vaults,
            borrow_markets,
        }
    }

    /// Builds on-chain readers for `markets`, probing `auto` vault capabilities once.
    pub async fn connect(
        client: EthereumClient,
        markets: &MarketsFile,
        call_timeout: Duration,
    ) -> Result<Self, AppError> {
        let vault_adapter = Erc4626VaultAdapter::new(client.clone(), call_timeout);

        let mut lending = Vec::with_capacity(markets.lending.len());
        for pending in markets.lending_markets()? {
            let capabilities = match pending.capabilities.declared() {
                Some(capabilities) => capabilities,
                None => vault_adapter.probe_capabilities(pending.address).await,
            };
            info!(market = %pending.name, capabilities = %capabilities, "Lending market ready");
            lending.push(pending.resolve(capabilities));
        }

        let borrow = markets.borrow_markets()?;

        Ok(Self::new(
            lending,
            borrow,
            Arc::new(vault_adapter),
            Arc::new(MorphoBlueAdapter::new(client, call_timeout)),
        ))
    }

    pub fn lending_markets(&self) -> &[LendingMarket] {
        &self.lending
    }

    pub fn borrow_markets(&self) -> &[BorrowMarket] {
        &self.borrow
    }

    pub async fn fetch_positions(&self, owner: Address) -> PositionReport {
        let lending_futures = self.lending.iter().map(|market| self.value_lending_market(market, owner));
        let borrow_futures = self.borrow.iter().map(|market| self.value_borrow_market(market, owner));
        let (lending, borrow) = futures::join!(join_all(lending_futures), join_all(borrow_futures));

        let report = PositionReport {
            address: owner,
            timestamp: Utc::now(),
            lending,
            borrow,
        };

        info!(
            owner = %owner,
            lending_markets = report.lending.len(),
            borrow_markets = report.borrow.len(),
            failed_markets = report.failed_markets(),
            "Fetched positions"
        );
        report
    }

    /// Reads the vault quantities needed to value `owner`'s shares. Totals are
    /// skipped when the owner holds no shares.
    pub async fn read_vault_state(
        &self,
        market: &LendingMarket,
        owner: Address,
    ) -> Result<RawVaultState, ValuationError> {
        let user_shares = self
            .vaults
            .balance_of(market, owner)
            .await
            .map_err(|e| ValuationError::data_unavailable("balanceOf", e))?;

        if user_shares.is_zero() {
            return Ok(RawVaultState::empty());
        }

        let (total_assets, total_shares) = futures::try_join!(
            async {
                self.vaults
                    .total_assets(market)
                    .await
                    .map_err(|e| ValuationError::data_unavailable("totalAssets", e))
            },
            async {
                self.vaults
                    .total_supply(market)
                    .await
                    .map_err(|e| ValuationError::data_unavailable("totalSupply", e))
            },
        )?;

        let direct_assets = self.vaults.convert_to_assets(market, user_shares).await;

        Ok(RawVaultState {
            user_shares,
            total_assets,
            total_shares,
            direct_assets,
        })
    }

    pub async fn read_borrow_state(
        &self,
        market: &BorrowMarket,
        owner: Address,
    ) -> Result<RawBorrowState, ValuationError> {
        let (totals, position) = futures::try_join!(
            async {
                self.borrow_markets
                    .market(market)
                    .await
                    .map_err(|e| ValuationError::data_unavailable("market", e))
            },
            async {
                self.borrow_markets
                    .position(market, owner)
                    .await
                    .map_err(|e| ValuationError::data_unavailable("position", e))
            },
        )?;

        Ok(RawBorrowState {
            total_borrow_assets: totals.total_borrow_assets,
            total_borrow_shares: totals.total_borrow_shares,
            user_borrow_shares: position.borrow_shares,
            user_collateral: position.collateral,
        })
    }

    async fn value_lending_market(&self, market: &LendingMarket, owner: Address) -> LendingEntry {
        let state = self.read_vault_state(market, owner).await;
        let shares = state
            .as_ref()
            .ok()
            .and_then(|state| to_decimal(state.user_shares, market.share_decimals).ok());
        let result = state.and_then(|state| state.valuation(market.asset_decimals));

        match &result {
            Ok(valuation) => debug!(
                market = %market.name,
                value = %valuation.value,
                method = %valuation.method,
                "Valued lending position"
            ),
            Err(e) => warn!(market = %market.name, error = %e, "Failed to value lending position"),
        }

        LendingEntry {
            name: market.name.clone(),
            address: market.address,
            shares,
            result,
        }
    }

    async fn value_borrow_market(&self, market: &BorrowMarket, owner: Address) -> BorrowEntry {
        let result = self
            .read_borrow_state(market, owner)
            .await
            .and_then(|state| state.position(market.decimals));

        match &result {
            Ok(position) => debug!(
                market = %market.name,
                borrowed = %position.borrowed,
                collateral = %position.collateral,
                "Valued borrow position"
            ),
            Err(e) => warn!(market = %market.name, error = %e, "Failed to value borrow position"),
        }

        BorrowEntry {
            name: market.name.clone(),
            market_id: market.market_id,
            result,
        }
    }
}
