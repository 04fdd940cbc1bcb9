//! API constants
//!
//! Every versioned route is mounted under [`API_PREFIX`]. Handler path
//! annotations for the OpenAPI document use the same literal prefix.

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Current API version segment
pub const API_VERSION: &str = "v0";

/// Versioned prefix, `API_BASE` + `/` + `API_VERSION`
pub const API_PREFIX: &str = "/api/v0";

/// Where the OpenAPI document is served
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches_parts() {
        assert_eq!(API_PREFIX, format!("{}/{}", API_BASE, API_VERSION));
        assert!(OPENAPI_JSON_PATH.starts_with(API_BASE));
    }
}
