//! Core data models for onedist.
//!
//! - Settings and on-disk configuration
//! - Distribution references and query operations
//! - Error taxonomy

mod config;
mod distribution;
mod error;

pub use config::*;
pub use distribution::*;
pub use error::*;
