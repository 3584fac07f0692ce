//! Endpoint construction.
//!
//! Distribution paths are always normalized to exactly one leading and one
//! trailing slash, so `1d/dists/abc`, `/1d/dists/abc` and `/1d/dists/abc/`
//! all address `/1d/dists/abc/`.

use crate::models::{OneDistError, Operation, QueryValue, Result};

/// Normalize a distribution path to `/<path>/`.
pub fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(OneDistError::InvalidArgument(format!(
            "distribution path '{path}' is empty"
        )));
    }
    Ok(format!("/{trimmed}/"))
}

/// Build the request path (relative to the base URL) for a query.
///
/// `Sample` takes a [`QueryValue::Size`]; the other operations take a
/// non-empty [`QueryValue::Points`] encoded as a comma-separated list in
/// input order: `[-1, 0, 1.5]` becomes `x=-1,0,1.5`.
pub fn build_endpoint(path: &str, operation: Operation, value: &QueryValue) -> Result<String> {
    let path = normalize_path(path)?;
    let encoded = encode_value(operation, value)?;
    Ok(format!(
        "{path}{}/?{}={encoded}",
        operation.route(),
        operation.query_param()
    ))
}

/// Encode the query-string value for `operation`, validating it on the way.
pub fn encode_value(operation: Operation, value: &QueryValue) -> Result<String> {
    match (operation, value) {
        (Operation::Sample, QueryValue::Size(size)) => Ok(size.to_string()),
        (
            Operation::Density | Operation::Cumulative | Operation::Quantile,
            QueryValue::Points(points),
        ) => encode_points(points),
        (operation, value) => Err(OneDistError::InvalidOperation(format!(
            "{operation} does not accept {value:?}"
        ))),
    }
}

fn encode_points(points: &[f64]) -> Result<String> {
    if points.is_empty() {
        return Err(OneDistError::InvalidArgument(
            "at least one value is required".to_string(),
        ));
    }
    if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
        return Err(OneDistError::InvalidArgument(format!(
            "values must be finite, got {bad}"
        )));
    }

    Ok(points
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/1d/dists/abc").unwrap(), "/1d/dists/abc/");
        assert_eq!(normalize_path("1d/dists/abc").unwrap(), "/1d/dists/abc/");
        assert_eq!(normalize_path("//1d/dists/abc//").unwrap(), "/1d/dists/abc/");
        assert!(normalize_path("/").is_err());
        assert!(normalize_path("").is_err());
    }

    #[test]
    fn test_density_endpoint() {
        let endpoint = build_endpoint(
            "/1d/dists/D1",
            Operation::Density,
            &QueryValue::Points(vec![-1.0, 0.0, 1.5]),
        )
        .unwrap();
        assert_eq!(endpoint, "/1d/dists/D1/pdf/?x=-1,0,1.5");
    }

    #[test]
    fn test_points_keep_input_order() {
        let points = vec![3.0, -2.25, 0.5, 1e-3, 100.0];
        let endpoint =
            build_endpoint("1d/dists/D1/", Operation::Cumulative, &points.clone().into()).unwrap();
        assert_eq!(endpoint, "/1d/dists/D1/cdf/?x=3,-2.25,0.5,0.001,100");
    }

    #[test]
    fn test_quantile_uses_p() {
        let endpoint = build_endpoint(
            "/1d/dists/D1",
            Operation::Quantile,
            &QueryValue::Points(vec![0.1, 0.5, 0.9]),
        )
        .unwrap();
        assert_eq!(endpoint, "/1d/dists/D1/qf/?p=0.1,0.5,0.9");
    }

    #[test]
    fn test_sample_size_not_joined() {
        let endpoint = build_endpoint("/1d/dists/abc", Operation::Sample, &QueryValue::Size(16)).unwrap();
        assert_eq!(endpoint, "/1d/dists/abc/samples/?size=16");

        let endpoint = build_endpoint("/1d/dists/abc", Operation::Sample, &0u64.into()).unwrap();
        assert_eq!(endpoint, "/1d/dists/abc/samples/?size=0");
    }

    #[test]
    fn test_empty_points_rejected() {
        let err = build_endpoint("/1d/dists/abc", Operation::Density, &QueryValue::Points(vec![]))
            .unwrap_err();
        assert!(matches!(err, OneDistError::InvalidArgument(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = build_endpoint(
                "/1d/dists/abc",
                Operation::Density,
                &QueryValue::Points(vec![0.0, bad]),
            )
            .unwrap_err();
            assert!(matches!(err, OneDistError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_mismatched_value_rejected() {
        let err = build_endpoint("/1d/dists/abc", Operation::Sample, &QueryValue::Points(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, OneDistError::InvalidOperation(_)));

        let err = build_endpoint("/1d/dists/abc", Operation::Quantile, &QueryValue::Size(3))
            .unwrap_err();
        assert!(matches!(err, OneDistError::InvalidOperation(_)));
    }
}
