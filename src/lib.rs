//! onedist - Client for a remote one-dimensional distribution service.
//!
//! ## Overview
//!
//! Define a distribution by family and arguments (e.g. quantile constraints),
//! or point at one the server already holds, then ask for its density,
//! cumulative probability, quantiles or random samples. All fitting and
//! evaluation happens server-side; this crate validates input, builds the
//! requests and extracts the numbers from the responses.
//!
//! ## Flow per call
//!
//! - Validate the query value and the distribution reference
//! - Create the distribution (`POST /1d/dists/`) if only a definition was given
//! - `GET /<path>/{pdf,cdf,qf,samples}/?<param>=<value>` and extract the results

pub mod client;
pub mod models;

// Re-exports for convenience
pub use client::{
    DistClient, HttpTransport, Transport, build_endpoint, cumulative, density, get_distribution,
    normalize_path, quantile, resolve_distribution, sample,
};
pub use models::{
    ConfigFile, DistributionRef, OneDistError, Operation, QueryValue, Result, Settings,
};
