pub mod market;
pub mod position;
pub mod report;

pub use market::*;
pub use position::*;
pub use report::*;
