//! Common utilities and shared types for the LinkToss client.
//!
//! This crate provides foundational components used across all linktoss crates:
//!
//! - **Configuration**: Client settings via [`Config`]
//! - **Error handling**: Unified error types via [`ApiError`] and [`ApiResult`]
//!
//! # Example
//!
//! ```no_run
//! use linktoss_common::{ApiResult, Config};
//!
//! fn example() -> ApiResult<()> {
//!     let config = Config::load()?;
//!     println!("Backend at {}", config.api.base_url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, HttpConfig};
pub use error::{ApiError, ApiResult};
