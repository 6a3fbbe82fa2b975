//! Bearer authentication for write routes.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;

use super::error::ApiError;
use super::middleware::record_token_verification;
use super::state::ServiceState;
use crate::store::TravelStore;
use crate::token::{TokenClaims, TokenError};

/// Claims of a request's verified bearer token.
///
/// Extraction checks the signature only; handlers call
/// [`BearerClaims::ensure_fresh`] before acting.
#[derive(Debug, Clone, Copy)]
pub struct BearerClaims(pub TokenClaims);

impl BearerClaims {
    /// Reject the request if the token's `exp` is before now.
    pub fn ensure_fresh(&self) -> Result<(), ApiError> {
        if self.0.is_expired_at(Utc::now().timestamp()) {
            return Err(ApiError::Expired);
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<Arc<ServiceState<S>>> for BearerClaims
where
    S: TravelStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServiceState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Credential(TokenError::MalformedCredential))?;

        let result = state.tokens.verify_bearer(header);
        record_token_verification(result.is_ok());

        result.map(BearerClaims).map_err(ApiError::Credential)
    }
}
