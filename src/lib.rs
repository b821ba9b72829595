//! check-rss: report aggregate resident memory (Rss) for named processes
//! and everything sharing their process groups, as a monitoring check.

pub mod aggregate;
pub mod app;
pub mod config;
pub mod deadline;
mod prelude;
pub mod report;
pub mod snapshot;
pub mod threshold;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
