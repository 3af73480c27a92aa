// Share-based lending vault reader (ERC-4626 style)
use alloy::{
    primitives::{Address, U256},
    sol,
};
use async_trait::async_trait;
use std::time::Duration;

use crate::adapters::traits::{timed_call, AdapterError, VaultReader};
use crate::blockchain::EthereumClient;
use crate::models::{LendingMarket, VaultCapabilities};
use crate::valuation::CapabilityError;

sol! {
    #[sol(rpc)]
    interface IERC4626 {
        function balanceOf(address account) external view returns (uint256);
        function totalAssets() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function convertToAssets(uint256 shares) external view returns (uint256);
    }
}

/// One share at the fixed 18-decimal share scale, used to probe `convertToAssets`.
const PROBE_SHARES: u64 = 1_000_000_000_000_000_000;

pub struct Erc4626VaultAdapter {
    client: EthereumClient,
    call_timeout: Duration,
}

impl Erc4626VaultAdapter {
    pub fn new(client: EthereumClient, call_timeout: Duration) -> Self {
        Self { client, call_timeout }
    }

    /// Determines once whether `vault` answers `convertToAssets`.
    pub async fn probe_capabilities(&self, vault: Address) -> VaultCapabilities {
        let contract = IERC4626::new(vault, self.client.provider());
        let probe = timed_call(
            "convertToAssets",
            self.call_timeout,
            contract.convertToAssets(U256::from(PROBE_SHARES)).call(),
        )
        .await
        .map(|assets| assets._0);

        capabilities_from_probe(vault, probe)
    }
}

/// Only a contract-level rejection means the accessor is missing. A transport
/// failure keeps the accessor; each later call falls back on its own.
fn capabilities_from_probe(vault: Address, probe: Result<U256, AdapterError>) -> VaultCapabilities {
    match probe {
        Ok(_) => VaultCapabilities::Erc4626,
        Err(AdapterError::ContractError(e)) => {
            tracing::info!(
                vault = %vault,
                error = %e,
                "Vault does not answer convertToAssets, using pool ratio only"
            );
            VaultCapabilities::PoolRatioOnly
        }
        Err(AdapterError::RpcError(e)) => {
            tracing::warn!(
                vault = %vault,
                error = %e,
                "Could not probe convertToAssets, keeping direct conversion"
            );
            VaultCapabilities::Erc4626
        }
    }
}

#[async_trait]
impl VaultReader for Erc4626VaultAdapter {
    async fn balance_of(&self, vault: &LendingMarket, owner: Address) -> Result<U256, AdapterError> {
        let contract = IERC4626::new(vault.address, self.client.provider());
        let balance = timed_call("balanceOf", self.call_timeout, contract.balanceOf(owner).call())
            .await?
            ._0;

        tracing::debug!(vault = %vault.name, owner = %owner, shares = %balance, "Read share balance");
        Ok(balance)
    }

    async fn total_assets(&self, vault: &LendingMarket) -> Result<U256, AdapterError> {
        let contract = IERC4626::new(vault.address, self.client.provider());
        let total_assets = timed_call("totalAssets", self.call_timeout, contract.totalAssets().call())
            .await?
            ._0;
        Ok(total_assets)
    }

    async fn total_supply(&self, vault: &LendingMarket) -> Result<U256, AdapterError> {
        let contract = IERC4626::new(vault.address, self.client.provider());
        let total_supply = timed_call("totalSupply", self.call_timeout, contract.totalSupply().call())
            .await?
            ._0;
        Ok(total_supply)
    }

    async fn convert_to_assets(
        &self,
        vault: &LendingMarket,
        shares: U256,
    ) -> Result<U256, CapabilityError> {
        if !vault.capabilities.supports_direct_conversion() {
            return Err(CapabilityError::Unsupported);
        }

        let contract = IERC4626::new(vault.address, self.client.provider());
        let assets = timed_call(
            "convertToAssets",
            self.call_timeout,
            contract.convertToAssets(shares).call(),
        )
        .await
        .map_err(|e| CapabilityError::Failed(e.to_string()))?
        ._0;
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_undeclared_conversion_makes_no_call() {
        // nothing listens on this port; an attempted call would fail, not report Unsupported
        let client = EthereumClient::connect_lazy("http://127.0.0.1:9").unwrap();
        let adapter = Erc4626VaultAdapter::new(client, Duration::from_secs(1));
        let vault = LendingMarket::new("Plain", Address::ZERO, 6, VaultCapabilities::PoolRatioOnly);

        let result = adapter.convert_to_assets(&vault, U256::from(1u64)).await;
        assert_eq!(result, Err(CapabilityError::Unsupported));
    }

    #[tokio::test]
    async fn test_unreachable_node_keeps_direct_conversion() {
        let client = EthereumClient::connect_lazy("http://127.0.0.1:9").unwrap();
        let adapter = Erc4626VaultAdapter::new(client, Duration::from_secs(2));

        let capabilities = adapter.probe_capabilities(Address::ZERO).await;
        assert_eq!(capabilities, VaultCapabilities::Erc4626);
    }

    #[test]
    fn test_probe_outcomes() {
        let vault = Address::ZERO;
        assert_eq!(
            capabilities_from_probe(vault, Ok(U256::from(PROBE_SHARES))),
            VaultCapabilities::Erc4626
        );
        assert_eq!(
            capabilities_from_probe(
                vault,
                Err(AdapterError::ContractError("convertToAssets failed: execution reverted".to_string()))
            ),
            VaultCapabilities::PoolRatioOnly
        );
        assert_eq!(
            capabilities_from_probe(
                vault,
                Err(AdapterError::RpcError("convertToAssets timed out after 30s".to_string()))
            ),
            VaultCapabilities::Erc4626
        );
    }
}
