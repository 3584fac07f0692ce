//! Client for the distribution service.

mod endpoint;
#[cfg(test)]
pub(crate) mod mock;
mod query;
mod resolver;
mod transport;

pub use endpoint::*;
pub use query::*;
pub use resolver::*;
pub use transport::*;
