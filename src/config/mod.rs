pub mod markets;
pub mod settings;

pub use markets::*;
pub use settings::*;
