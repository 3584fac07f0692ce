//! Distribution resolver.
//!
//! Turns a [`DistributionRef`] into the server path of a distribution,
//! creating the distribution first when only a definition is given.

use crate::client::Transport;
use crate::models::{
    CREATE_ENDPOINT, CreateRequest, DistributionRef, FamilyRequest, OneDistError, Result,
};
use serde_json::Value;
use tracing::debug;

/// Resolve a reference to a server path.
///
/// `Existing` paths are returned unchanged without a request; a bad path only
/// surfaces as an HTTP error once it is queried. `Definition`s are POSTed to
/// the creation endpoint and resolve to `/1d/dists/<id>`.
pub async fn resolve_distribution<T>(transport: &T, dist: &DistributionRef) -> Result<String>
where
    T: Transport + ?Sized,
{
    match dist {
        DistributionRef::Existing(path) => Ok(path.clone()),
        DistributionRef::Definition { family, arguments } => {
            create_distribution(transport, family, arguments).await
        }
    }
}

/// Create a distribution on the server and return its path.
pub async fn create_distribution<T>(transport: &T, family: &str, arguments: &Value) -> Result<String>
where
    T: Transport + ?Sized,
{
    let request = CreateRequest {
        family: FamilyRequest { requested: family },
        arguments,
    };
    let body = serde_json::to_value(&request)
        .map_err(|e| OneDistError::InvalidArgument(format!("unserializable arguments: {e}")))?;

    let response = transport.post(CREATE_ENDPOINT, &body).await?;
    let id = extract_id(&response)?;
    let path = format!("{CREATE_ENDPOINT}{id}");

    debug!(family = family, path = %path, "Created distribution");
    Ok(path)
}

fn extract_id(response: &Value) -> Result<String> {
    match response.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) if id.is_u64() || id.is_i64() => Ok(id.to_string()),
        Some(other) => Err(OneDistError::malformed(format!(
            "creation response has unusable id: {other}"
        ))),
        None => Err(OneDistError::malformed(
            "creation response has no 'id' field",
        )),
    }
}
