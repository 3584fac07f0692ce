//! Query façade: density, cumulative probability, quantile and sampling.
//!
//! Every call validates its input, resolves the distribution (creating it if
//! only a definition was given), performs one GET and extracts the numbers.
//! At most two requests are made per call, strictly one after the other.

use crate::client::{
    HttpTransport, Transport, build_endpoint, encode_value, normalize_path, resolve_distribution,
};
use crate::models::{DistributionRef, OneDistError, Operation, QueryValue, Result, Settings};
use serde_json::Value;
use tracing::debug;

/// Client for the distribution service.
///
/// Generic over the transport so tests can swap in a fake; production code
/// uses the default [`HttpTransport`].
///
/// # Example
///
/// ```ignore
/// use onedist::{DistClient, DistributionRef, Settings};
/// use serde_json::json;
///
/// let client = DistClient::new(Settings::default())?;
/// let dist = DistributionRef::definition(
///     "cinterp5_01",
///     json!({"quantiles": [{"p": 0.1, "x": -1}, {"p": 0.5, "x": 0}, {"p": 0.9, "x": 1}]}),
/// );
/// let densities = client.density(&[-1.0, 0.0, 1.0], &dist).await?;
/// ```
pub struct DistClient<T: Transport = HttpTransport> {
    transport: T,
}

impl DistClient<HttpTransport> {
    /// Create a client talking HTTP with the given settings.
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(settings)?))
    }
}

impl<T: Transport> DistClient<T> {
    /// Create a client over an arbitrary transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Probability density at each of `xs`, in input order.
    pub async fn density(&self, xs: &[f64], dist: &DistributionRef) -> Result<Vec<f64>> {
        self.query(Operation::Density, &QueryValue::from(xs), dist).await
    }

    /// Cumulative probability at each of `xs`, in input order.
    pub async fn cumulative(&self, xs: &[f64], dist: &DistributionRef) -> Result<Vec<f64>> {
        self.query(Operation::Cumulative, &QueryValue::from(xs), dist)
            .await
    }

    /// Quantile at each probability in `ps`, in input order.
    pub async fn quantile(&self, ps: &[f64], dist: &DistributionRef) -> Result<Vec<f64>> {
        self.query(Operation::Quantile, &QueryValue::from(ps), dist)
            .await
    }

    /// Draw `size` samples. Order is whatever the server returns.
    pub async fn sample(&self, size: u64, dist: &DistributionRef) -> Result<Vec<f64>> {
        self.query(Operation::Sample, &QueryValue::Size(size), dist)
            .await
    }

    /// Run any numeric query.
    ///
    /// Input is validated before the distribution is resolved, so bad input
    /// never causes a distribution to be created.
    pub async fn query(
        &self,
        operation: Operation,
        value: &QueryValue,
        dist: &DistributionRef,
    ) -> Result<Vec<f64>> {
        encode_value(operation, value)?;
        if let DistributionRef::Existing(path) = dist {
            normalize_path(path)?;
        }

        let path = self.resolve_distribution(dist).await?;
        let endpoint = build_endpoint(&path, operation, value)?;

        debug!(operation = %operation, endpoint = %endpoint, "Querying distribution");
        let response = self.transport.get(&endpoint).await?;
        extract(operation, value, &response)
    }

    /// Resolve a reference to a server path, creating the distribution if needed.
    pub async fn resolve_distribution(&self, dist: &DistributionRef) -> Result<String> {
        resolve_distribution(&self.transport, dist).await
    }

    /// Create a distribution and return its path.
    pub async fn create_distribution(&self, family: &str, arguments: &Value) -> Result<String> {
        crate::client::create_distribution(&self.transport, family, arguments).await
    }

    /// Fetch a distribution's metadata (fit status etc.) unmodified.
    pub async fn get_distribution(&self, path: &str) -> Result<Value> {
        let path = normalize_path(path)?;
        self.transport.get(&path).await
    }
}

/// Pull the numeric results for `operation` out of a response body.
///
/// Point queries must come back with exactly one element per input point;
/// anything else is a malformed response, never a partial result.
pub fn extract(operation: Operation, value: &QueryValue, response: &Value) -> Result<Vec<f64>> {
    let field = operation.result_field();

    match operation {
        Operation::Sample => {
            let samples = response.get(field).ok_or_else(|| {
                OneDistError::malformed(format!("response has no '{field}' field"))
            })?;
            let mut out = Vec::new();
            flatten_numbers(samples, &mut out)?;
            Ok(out)
        }
        Operation::Density | Operation::Cumulative | Operation::Quantile => {
            let items = response.as_array().ok_or_else(|| {
                OneDistError::malformed(format!("expected an array for {operation}, got {response}"))
            })?;
            if let QueryValue::Points(points) = value {
                if items.len() != points.len() {
                    return Err(OneDistError::malformed(format!(
                        "{operation} returned {} values for {} points",
                        items.len(),
                        points.len()
                    )));
                }
            }
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.get(field).and_then(Value::as_f64).ok_or_else(|| {
                        OneDistError::malformed(format!(
                            "element {i} has no numeric '{field}' field"
                        ))
                    })
                })
                .collect()
        }
    }
}

fn flatten_numbers(value: &Value, out: &mut Vec<f64>) -> Result<()> {
    match value {
        Value::Array(items) => items.iter().try_for_each(|item| flatten_numbers(item, out)),
        Value::Number(n) => {
            let n = n
                .as_f64()
                .ok_or_else(|| OneDistError::malformed(format!("sample {n} is not a float")))?;
            out.push(n);
            Ok(())
        }
        other => Err(OneDistError::malformed(format!(
            "samples must be numbers, got {other}"
        ))),
    }
}

fn client_for(settings: Option<Settings>) -> Result<DistClient> {
    DistClient::new(settings.unwrap_or_default())
}

/// Density at `xs` using `settings`, or [`Settings::default`] when `None`.
pub async fn density(
    xs: &[f64],
    dist: &DistributionRef,
    settings: Option<Settings>,
) -> Result<Vec<f64>> {
    client_for(settings)?.density(xs, dist).await
}

/// Cumulative probability at `xs` using `settings`, or [`Settings::default`] when `None`.
pub async fn cumulative(
    xs: &[f64],
    dist: &DistributionRef,
    settings: Option<Settings>,
) -> Result<Vec<f64>> {
    client_for(settings)?.cumulative(xs, dist).await
}

/// Quantiles at `ps` using `settings`, or [`Settings::default`] when `None`.
pub async fn quantile(
    ps: &[f64],
    dist: &DistributionRef,
    settings: Option<Settings>,
) -> Result<Vec<f64>> {
    client_for(settings)?.quantile(ps, dist).await
}

/// `size` samples using `settings`, or [`Settings::default`] when `None`.
pub async fn sample(
    size: u64,
    dist: &DistributionRef,
    settings: Option<Settings>,
) -> Result<Vec<f64>> {
    client_for(settings)?.sample(size, dist).await
}

/// Raw distribution metadata using `settings`, or [`Settings::default`] when `None`.
pub async fn get_distribution(path: &str, settings: Option<Settings>) -> Result<Value> {
    client_for(settings)?.get_distribution(path).await
}
