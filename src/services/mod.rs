pub mod monitoring_service;
pub mod position_aggregator;
pub mod report_formatter;
pub mod session;

pub use monitoring_service::*;
pub use position_aggregator::*;
pub use report_formatter::*;
pub use session::*;
