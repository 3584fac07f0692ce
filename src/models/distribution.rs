//! Distribution references, query operations and wire payloads.

use super::{OneDistError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Server path under which new distributions are created.
pub const CREATE_ENDPOINT: &str = "/1d/dists/";

/// Which distribution a query runs against.
///
/// Either a distribution that already exists on the server, or a definition
/// the server should fit before the query is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionRef {
    /// Path of a previously created distribution, e.g. `/1d/dists/abc`
    Existing(String),

    /// Family name plus its arguments (e.g. quantile constraints)
    Definition {
        family: String,
        arguments: serde_json::Value,
    },
}

impl DistributionRef {
    pub fn existing(path: impl Into<String>) -> Self {
        Self::Existing(path.into())
    }

    pub fn definition(family: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self::Definition {
            family: family.into(),
            arguments,
        }
    }

    /// Build a reference from loosely-typed optional parts.
    ///
    /// Exactly one of `path` or (`family` and `arguments`) must be given.
    pub fn from_parts(
        path: Option<String>,
        family: Option<String>,
        arguments: Option<serde_json::Value>,
    ) -> Result<Self> {
        match (path, family, arguments) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(OneDistError::InvalidArgument(
                "provide either a path or both family and arguments, but not both.".to_string(),
            )),
            (Some(path), None, None) => Ok(Self::Existing(path)),
            (None, Some(family), Some(arguments)) => Ok(Self::Definition { family, arguments }),
            (None, _, _) => Err(OneDistError::InvalidArgument(
                "both family and arguments must be provided if path is not.".to_string(),
            )),
        }
    }
}

/// The four numeric queries the service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Probability density (pdf)
    Density,
    /// Cumulative probability (cdf)
    Cumulative,
    /// Inverse cdf (qf)
    Quantile,
    /// Random draws
    Sample,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Density,
        Operation::Cumulative,
        Operation::Quantile,
        Operation::Sample,
    ];

    /// Query-string parameter carrying the request value.
    pub fn query_param(self) -> &'static str {
        match self {
            Self::Density | Self::Cumulative => "x",
            Self::Quantile => "p",
            Self::Sample => "size",
        }
    }

    /// Route segment appended to the distribution path.
    pub fn route(self) -> &'static str {
        match self {
            Self::Density => "pdf",
            Self::Cumulative => "cdf",
            Self::Quantile => "qf",
            Self::Sample => "samples",
        }
    }

    /// Field holding the numeric result in the response.
    ///
    /// For `Sample` this is a field of the top-level object; for the others
    /// it is read from every element of the response array.
    pub fn result_field(self) -> &'static str {
        match self {
            Self::Density => "density",
            Self::Cumulative => "p",
            Self::Quantile => "x",
            Self::Sample => "samples",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Density => write!(f, "density"),
            Self::Cumulative => write!(f, "cumulative"),
            Self::Quantile => write!(f, "quantile"),
            Self::Sample => write!(f, "sample"),
        }
    }
}

impl FromStr for Operation {
    type Err = OneDistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "density" | "pdf" => Ok(Self::Density),
            "cumulative" | "cdf" => Ok(Self::Cumulative),
            "quantile" | "qf" => Ok(Self::Quantile),
            "sample" | "samples" => Ok(Self::Sample),
            _ => Err(OneDistError::InvalidOperation(format!(
                "'{s}' is not one of density, cumulative, quantile, sample"
            ))),
        }
    }
}

/// Value sent along with a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Points (x for density/cumulative, p for quantile), order preserved
    Points(Vec<f64>),
    /// Number of samples to draw
    Size(u64),
}

impl From<Vec<f64>> for QueryValue {
    fn from(points: Vec<f64>) -> Self {
        Self::Points(points)
    }
}

impl From<&[f64]> for QueryValue {
    fn from(points: &[f64]) -> Self {
        Self::Points(points.to_vec())
    }
}

impl From<u64> for QueryValue {
    fn from(size: u64) -> Self {
        Self::Size(size)
    }
}

/// Body of a distribution creation request.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    pub family: FamilyRequest<'a>,
    pub arguments: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct FamilyRequest<'a> {
    pub requested: &'a str,
}
