//! Command implementations for the `growthmap` binary.
//!
//! - **analyze**: estimate the growth class of one source file
//! - **init**: write a default `.growthmap.toml`

pub mod analyze;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use init::init_config;
