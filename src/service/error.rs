//! HTTP error shaping.
//!
//! Two body shapes leave this service:
//!
//! - `{"error": "<message>"}` for handler failures (422, expired token 401, 500)
//! - `{"error": true, "msg": "<message>"}` for credential and issuance failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::token::TokenError;

/// Message returned when a path id is empty.
pub const MISSING_ID: &str = "id is not defined";

/// Message returned when a valid token has expired.
pub const EXPIRED_TOKEN: &str = "unauthorized, check expiration time of your token";

/// Plain error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// Token endpoint envelope, shared by issuance and credential failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEnvelope {
    /// Whether the request failed.
    pub error: bool,
    /// Failure message, `null` on success.
    pub msg: Option<String>,
    /// Issued token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl TokenEnvelope {
    /// Successful issuance.
    pub fn issued(access_token: String) -> Self {
        Self {
            error: false,
            msg: None,
            access_token: Some(access_token),
        }
    }

    /// Failure with a message.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            error: true,
            msg: Some(msg.into()),
            access_token: None,
        }
    }
}

/// Request handler failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Empty path id.
    #[error("{}", MISSING_ID)]
    MissingId,
    /// Body did not decode into a travel.
    #[error("{0}")]
    InvalidBody(String),
    /// Token verified but past its `exp`.
    #[error("{}", EXPIRED_TOKEN)]
    Expired,
    /// Bearer credential rejected.
    #[error(transparent)]
    Credential(TokenError),
    /// Token issuance failed.
    #[error(transparent)]
    Issuance(TokenError),
    /// Any store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Status code for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingId | Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Expired => StatusCode::UNAUTHORIZED,
            Self::Credential(e) if e.is_malformed() => StatusCode::BAD_REQUEST,
            Self::Credential(_) => StatusCode::UNAUTHORIZED,
            Self::Issuance(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(
            status = status.as_u16(),
            error = %self,
            "Request error"
        );

        match self {
            Self::Credential(_) | Self::Issuance(_) => {
                (status, Json(TokenEnvelope::failed(self.to_string()))).into_response()
            }
            _ => (status, Json(ErrorBody { error: self.to_string() })).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingId.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::InvalidBody("bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::Expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Credential(TokenError::MalformedCredential).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store(StoreError::NotFound("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store(StoreError::InvalidArgument("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_envelope_shape() {
        let issued = serde_json::to_value(TokenEnvelope::issued("t".into())).unwrap();
        assert_eq!(issued, serde_json::json!({"error": false, "msg": null, "access_token": "t"}));

        let failed = serde_json::to_value(TokenEnvelope::failed("nope")).unwrap();
        assert_eq!(failed, serde_json::json!({"error": true, "msg": "nope"}));
    }
}
