use alloy::primitives::Address;

use crate::blockchain::EthereumClient;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidAddress(String),

    #[error("address {0} is already tracked")]
    AlreadyTracked(Address),

    #[error("no active address")]
    NoActiveAddress,

    #[error("no address at position {0}")]
    UnknownIndex(usize),
}

/// Addresses watched by one user, with the one currently reported on.
///
/// Owned by whoever drives the session and passed to the scheduler by reference.
#[derive(Debug, Clone, Default)]
pub struct WatchSession {
    addresses: Vec<Address>,
    active: Option<Address>,
    monitoring: bool,
}

impl WatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address; the first one added becomes active.
    pub fn add_address(&mut self, raw: &str) -> Result<Address, SessionError> {
        let address = EthereumClient::validate_address(raw)
            .map_err(|e| SessionError::InvalidAddress(e.to_string()))?;

        if self.addresses.contains(&address) {
            return Err(SessionError::AlreadyTracked(address));
        }

        self.addresses.push(address);
        if self.active.is_none() {
            self.active = Some(address);
        }
        Ok(address)
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn active(&self) -> Option<Address> {
        self.active
    }

    /// Makes the address at 1-based `position` active.
    pub fn select(&mut self, position: usize) -> Result<Address, SessionError> {
        let address = position
            .checked_sub(1)
            .and_then(|index| self.addresses.get(index))
            .copied()
            .ok_or(SessionError::UnknownIndex(position))?;
        self.active = Some(address);
        Ok(address)
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// Flips monitoring on or off and returns the new state. Needs an active address.
    pub fn toggle_monitoring(&mut self) -> Result<bool, SessionError> {
        if self.active.is_none() {
            return Err(SessionError::NoActiveAddress);
        }
        self.monitoring = !self.monitoring;
        Ok(self.monitoring)
    }
}
