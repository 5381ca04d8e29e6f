use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Validation};

use crate::{app_state::AppState, domain::models::UserId, routes::ApiError};

use super::Claims;

/// A custom Axum extractor that verifies the `Authorization: Bearer` token
/// and extracts the authenticated user's id from its claims. Returns 401
/// Unauthorized when the header is missing or the token does not verify.
///
/// Token issuance is the identity provider's business; this service only
/// accepts or rejects.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let token_data = decode::<Claims>(
            token,
            &app_state.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            id: UserId::from(token_data.claims.sub),
        })
    }
}
