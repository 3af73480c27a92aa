// Morpho Blue borrow market reader
use alloy::{
    primitives::{Address, U256},
    sol,
};
use async_trait::async_trait;
use std::time::Duration;

use crate::adapters::traits::{timed_call, AdapterError, BorrowMarketReader, MarketTotals, UserPosition};
use crate::blockchain::EthereumClient;
use crate::models::BorrowMarket;

// Morpho Blue contract interface, read-only subset
sol! {
    #[sol(rpc)]
    interface IMorpho {
        function market(bytes32 id) external view returns (
            uint128 totalSupplyAssets,
            uint128 totalSupplyShares,
            uint128 totalBorrowAssets,
            uint128 totalBorrowShares,
            uint128 lastUpdate,
            uint128 fee
        );

        function position(bytes32 id, address user) external view returns (
            uint256 supplyShares,
            uint128 borrowShares,
            uint128 collateral
        );
    }
}

pub struct MorphoBlueAdapter {
    client: EthereumClient,
    call_timeout: Duration,
}

impl MorphoBlueAdapter {
    pub fn new(client: EthereumClient, call_timeout: Duration) -> Self {
        Self { client, call_timeout }
    }
}

#[async_trait]
impl BorrowMarketReader for MorphoBlueAdapter {
    async fn market(&self, market: &BorrowMarket) -> Result<MarketTotals, AdapterError> {
        let morpho = IMorpho::new(market.morpho_address, self.client.provider());
        let data = timed_call("market", self.call_timeout, morpho.market(market.market_id).call()).await?;

        let totals = MarketTotals {
            total_supply_assets: U256::from(data.totalSupplyAssets),
            total_supply_shares: U256::from(data.totalSupplyShares),
            total_borrow_assets: U256::from(data.totalBorrowAssets),
            total_borrow_shares: U256::from(data.totalBorrowShares),
        };

        tracing::debug!(
            market = %market.name,
            market_id = %market.market_id,
            total_borrow_assets = %totals.total_borrow_assets,
            total_borrow_shares = %totals.total_borrow_shares,
            "Read Morpho market totals"
        );
        Ok(totals)
    }

    async fn position(&self, market: &BorrowMarket, owner: Address) -> Result<UserPosition, AdapterError> {
        let morpho = IMorpho::new(market.morpho_address, self.client.provider());
        let data = timed_call(
            "position",
            self.call_timeout,
            morpho.position(market.market_id, owner).call(),
        )
        .await?;

        let position = UserPosition {
            supply_shares: data.supplyShares,
            borrow_shares: U256::from(data.borrowShares),
            collateral: U256::from(data.collateral),
        };

        tracing::debug!(
            market = %market.name,
            owner = %owner,
            borrow_shares = %position.borrow_shares,
            collateral = %position.collateral,
            "Read Morpho position"
        );
        Ok(position)
    }
}
