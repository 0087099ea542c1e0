//! Reporting API wire models
//!
//! Request and response bodies for the auth, meta and load endpoints.

use crate::domain::{CubeApiError, CubeMetadata, CubeName, Row};
use serde::{Deserialize, Serialize};

/// Sentinel error value the load endpoint returns while a query is still being prepared
pub const CONTINUE_WAIT: &str = "Continue wait";

/// Login request body
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login response body
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
}

/// Catalog response from the meta endpoint
#[derive(Debug, Deserialize)]
pub struct MetaResponse {
    #[serde(default)]
    pub cubes: Vec<CubeDescriptor>,
}

/// One cube as described by the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CubeDescriptor {
    pub name: String,

    #[serde(default)]
    pub dimensions: Vec<MemberDescriptor>,

    #[serde(default)]
    pub measures: Vec<MemberDescriptor>,
}

/// A dimension or measure entry; only the name matters for export
#[derive(Debug, Clone, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
}

impl TryFrom<CubeDescriptor> for CubeMetadata {
    type Error = CubeApiError;

    fn try_from(descriptor: CubeDescriptor) -> Result<Self, Self::Error> {
        let name = CubeName::new(descriptor.name).map_err(CubeApiError::InvalidResponse)?;

        Ok(CubeMetadata::new(
            name,
            descriptor.dimensions.into_iter().map(|d| d.name).collect(),
            descriptor.measures.into_iter().map(|m| m.name).collect(),
        ))
    }
}

/// Successful load response
#[derive(Debug, Deserialize)]
pub struct LoadResponse {
    pub data: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_response_parsing() {
        let json = r#"{
            "cubes": [
                {
                    "name": "Orders",
                    "title": "Orders",
                    "measures": [{"name": "Orders.count", "type": "number"}],
                    "dimensions": [
                        {"name": "Orders.id", "type": "number"},
                        {"name": "Orders.updatedAt", "type": "time"}
                    ]
                },
                {"name": "Stores"}
            ]
        }"#;

        let meta: MetaResponse = serde_json::from_str(json).unwrap();
        assert_eq!(meta.cubes.len(), 2);

        let orders = CubeMetadata::try_from(meta.cubes[0].clone()).unwrap();
        assert_eq!(orders.name.as_str(), "Orders");
        assert_eq!(orders.dimensions, vec!["Orders.id", "Orders.updatedAt"]);
        assert_eq!(orders.measures, vec!["Orders.count"]);

        let stores = CubeMetadata::try_from(meta.cubes[1].clone()).unwrap();
        assert!(stores.dimensions.is_empty());
        assert!(stores.measures.is_empty());
    }

    #[test]
    fn test_invalid_cube_name_rejected() {
        let descriptor = CubeDescriptor {
            name: "../escape".to_string(),
            dimensions: vec![],
            measures: vec![],
        };
        assert!(matches!(
            CubeMetadata::try_from(descriptor),
            Err(CubeApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_auth_response_aliases() {
        for body in [
            r#"{"token": "abc"}"#,
            r#"{"accessToken": "abc"}"#,
            r#"{"access_token": "abc"}"#,
        ] {
            let parsed: AuthResponse = serde_json::from_str(body).unwrap();
            assert_eq!(parsed.token, "abc");
        }
    }

    #[test]
    fn test_auth_request_shape() {
        let body = serde_json::to_value(AuthRequest {
            email: "a@example.com",
            password: "pw",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@example.com", "password": "pw"}));
    }
}
