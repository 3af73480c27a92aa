pub mod ethereum_client;

pub use ethereum_client::*;
