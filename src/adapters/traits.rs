use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use crate::models::{BorrowMarket, LendingMarket};
use crate::valuation::CapabilityError;

/// Common error type for on-chain readers
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdapterError {
    #[error("Contract call failed: {0}")]
    ContractError(String),

    #[error("RPC error: {0}")]
    RpcError(String),
}

/// Aggregate state of a borrow market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarketTotals {
    pub total_supply_assets: U256,
    pub total_supply_shares: U256,
    pub total_borrow_assets: U256,
    pub total_borrow_shares: U256,
}

/// A user's position inside one borrow market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserPosition {
    pub supply_shares: U256,
    pub borrow_shares: U256,
    pub collateral: U256,
}

/// Reads share-vault quantities.
#[async_trait]
pub trait VaultReader: Send + Sync {
    async fn balance_of(&self, vault: &LendingMarket, owner: Address) -> Result<U256, AdapterError>;

    async fn total_assets(&self, vault: &LendingMarket) -> Result<U256, AdapterError>;

    async fn total_supply(&self, vault: &LendingMarket) -> Result<U256, AdapterError>;

    /// The vault's own shares-to-assets conversion. Implementations must return
    /// `CapabilityError::Unsupported` without any call when the vault does not
    /// declare the accessor.
    async fn convert_to_assets(
        &self,
        vault: &LendingMarket,
        shares: U256,
    ) -> Result<U256, CapabilityError>;
}

/// Reads borrow market state from a Morpho Blue style contract.
#[async_trait]
pub trait BorrowMarketReader: Send + Sync {
    async fn market(&self, market: &BorrowMarket) -> Result<MarketTotals, AdapterError>;

    async fn position(&self, market: &BorrowMarket, owner: Address) -> Result<UserPosition, AdapterError>;
}

/// Error of a single contract read.
pub(crate) trait CallFailure: Display {
    /// True when the node was never reached or never answered, as opposed to
    /// the contract rejecting the call.
    fn is_transport(&self) -> bool;
}

impl CallFailure for alloy::contract::Error {
    fn is_transport(&self) -> bool {
        matches!(
            self,
            alloy::contract::Error::TransportError(alloy::transports::RpcError::Transport(_))
        )
    }
}

/// Runs one contract read under `limit`. Timeouts and transport failures map
/// to `RpcError`, anything the contract answered with to `ContractError`.
pub(crate) async fn timed_call<T, E, Fut>(
    function: &str,
    limit: Duration,
    call: Fut,
) -> Result<T, AdapterError>
where
    Fut: IntoFuture<Output = Result<T, E>>,
    E: CallFailure,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) if e.is_transport() => Err(AdapterError::RpcError(format!("{} failed: {}", function, e))),
        Ok(Err(e)) => Err(AdapterError::ContractError(format!("{} failed: {}", function, e))),
        Err(_) => Err(AdapterError::RpcError(format!(
            "{} timed out after {}s",
            function,
            limit.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    enum FakeFailure {
        Reverted,
        ConnectionRefused,
    }

    impl fmt::Display for FakeFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                FakeFailure::Reverted => f.write_str("execution reverted"),
                FakeFailure::ConnectionRefused => f.write_str("connection refused"),
            }
        }
    }

    impl CallFailure for FakeFailure {
        fn is_transport(&self) -> bool {
            matches!(self, FakeFailure::ConnectionRefused)
        }
    }

    #[tokio::test]
    async fn test_timed_call_maps_errors() {
        let ok = timed_call("totalAssets", Duration::from_secs(1), async {
            Ok::<_, FakeFailure>(U256::from(5u64))
        })
        .await;
        assert_eq!(ok.unwrap(), U256::from(5u64));

        let reverted = timed_call("totalAssets", Duration::from_secs(1), async {
            Err::<U256, _>(FakeFailure::Reverted)
        })
        .await;
        assert!(matches!(reverted, Err(AdapterError::ContractError(msg)) if msg.contains("reverted")));

        let refused = timed_call("totalAssets", Duration::from_secs(1), async {
            Err::<U256, _>(FakeFailure::ConnectionRefused)
        })
        .await;
        assert!(matches!(refused, Err(AdapterError::RpcError(msg)) if msg.contains("refused")));

        let slow = timed_call("totalAssets", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, FakeFailure>(U256::ZERO)
        })
        .await;
        assert!(matches!(slow, Err(AdapterError::RpcError(_))));
    }
}
