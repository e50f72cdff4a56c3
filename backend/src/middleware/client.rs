//! Client identification for per-client settings

use axum::http::{request::Parts, StatusCode};
use axum::Json;

use crate::error::{ErrorDetail, ErrorResponse};

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const DEFAULT_CLIENT_ID: &str = "default";

const MAX_CLIENT_ID_LEN: usize = 64;

/// Settings namespace taken from the `X-Client-Id` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A valid id is 1-64 ASCII letters, digits, `-` or `_`
fn parse_client_id(raw: Option<&str>) -> Result<ClientId, String> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(ClientId(DEFAULT_CLIENT_ID.to_string()));
    };

    let valid_chars = raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if raw.len() > MAX_CLIENT_ID_LEN || !valid_chars {
        return Err(format!(
            "X-Client-Id must be 1-{} letters, digits, '-' or '_'",
            MAX_CLIENT_ID_LEN
        ));
    }

    Ok(ClientId(raw.to_string()))
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|v| v.to_str().ok());

        parse_client_id(header).map_err(|message| {
            let error = ErrorResponse {
                error: ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message,
                    field: Some(CLIENT_ID_HEADER.to_string()),
                },
            };
            (StatusCode::BAD_REQUEST, Json(error))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header_uses_default() {
        assert_eq!(parse_client_id(None).unwrap().as_str(), DEFAULT_CLIENT_ID);
        assert_eq!(parse_client_id(Some("  ")).unwrap().as_str(), DEFAULT_CLIENT_ID);
    }

    #[test]
    fn test_valid_client_id() {
        assert_eq!(parse_client_id(Some("kitchen-tablet_2")).unwrap().as_str(), "kitchen-tablet_2");
    }

    #[test]
    fn test_rejects_bad_client_id() {
        assert!(parse_client_id(Some("a b")).is_err());
        assert!(parse_client_id(Some(&"x".repeat(65))).is_err());
    }
}
