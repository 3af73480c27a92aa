use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use std::str::FromStr;

/// Read-only JSON-RPC connection to an EVM chain.
#[derive(Debug, Clone)]
pub struct EthereumClient {
    provider: RootProvider<Http<Client>>,
    rpc_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EthereumError {
    #[error("RPC connection failed: {0}")]
    RpcError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl EthereumClient {
    /// Connects to `rpc_url` and checks that the node answers.
    pub async fn new(rpc_url: &str) -> Result<Self, EthereumError> {
        let client = Self::connect_lazy(rpc_url)?;
        client.test_connection().await?;
        Ok(client)
    }

    /// Builds the provider without contacting the node.
    pub fn connect_lazy(rpc_url: &str) -> Result<Self, EthereumError> {
        let url = rpc_url
            .parse()
            .map_err(|e| EthereumError::RpcError(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Test the RPC connection by getting the latest block number
    pub async fn test_connection(&self) -> Result<(), EthereumError> {
        match self.provider.get_block_number().await {
            Ok(block_number) => {
                tracing::info!(
                    rpc_url = %self.rpc_url,
                    block_number = %block_number,
                    "RPC connection established"
                );
                Ok(())
            }
            Err(e) => Err(EthereumError::RpcError(format!(
                "Failed to connect to RPC {}: {}",
                self.rpc_url, e
            ))),
        }
    }

    /// Parses a hex address. ENS names are not resolved.
    pub fn validate_address(address: &str) -> Result<Address, EthereumError> {
        let address = address.trim();
        if address.ends_with(".eth") {
            return Err(EthereumError::InvalidAddress(format!(
                "ENS names are not supported: {}",
                address
            )));
        }

        Address::from_str(address).map_err(|e| {
            EthereumError::InvalidAddress(format!("Invalid address format {}: {}", address, e))
        })
    }

    /// Get the underlying provider for contract instantiation
    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_validation() {
        let valid_addr = "0x742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8";
        assert!(EthereumClient::validate_address(valid_addr).is_ok());

        let lowercase = "0x742d35cc6634c0532925a3b8d8b7c8b8b8b8b8b8";
        assert_eq!(
            EthereumClient::validate_address(lowercase).unwrap(),
            EthereumClient::validate_address(valid_addr).unwrap()
        );

        assert!(EthereumClient::validate_address("0xinvalid").is_err());
        assert!(EthereumClient::validate_address("vitalik.eth").is_err());
    }

    #[test]
    fn test_lazy_connection_rejects_invalid_url() {
        assert!(EthereumClient::connect_lazy("invalid-url").is_err());
        assert!(EthereumClient::connect_lazy("http://localhost:8545").is_ok());
    }

    #[tokio::test]
    async fn test_client_creation_with_invalid_url() {
        let result = EthereumClient::new("invalid-url").await;
        assert!(result.is_err());
    }
}
