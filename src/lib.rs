//! Read-only monitoring of DeFi positions: vault shares valued in their
//! underlying asset, pooled-debt borrow positions and a rough health ratio.

pub mod adapters;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod valuation;

pub use error::types::*;
