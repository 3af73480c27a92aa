pub mod erc4626;
pub mod morphoblue;
pub mod traits;

pub use erc4626::Erc4626VaultAdapter;
pub use morphoblue::MorphoBlueAdapter;
pub use traits::*;
