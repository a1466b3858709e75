use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// Claims minted by the external identity provider; this backend only
/// validates them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// Authenticated caller, inserted into request extensions by [`authenticate`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Requires a valid bearer token and exposes the caller as an [`AuthUser`]
/// extension to downstream handlers.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;
    let token = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header format".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))?;
    let claims = validate_token(token, &state.config.jwt_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    log::info!("Authenticated user: {}", claims.sub);
    request.extensions_mut().insert(AuthUser {
        email: claims.email,
    });
    Ok(next.run(request).await)
}

/// Restricts a route to the configured marketplace administrator. Must run
/// after [`authenticate`].
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Unauthorized("Missing authenticated user".to_string()))?;
    if user.email != state.config.admin_email {
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(request).await)
}
