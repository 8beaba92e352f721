//! Admin JWT verification.
//!
//! Token issuance (login, 2FA) belongs to the external authentication
//! provider; this side only verifies HS256 bearer tokens signed with the
//! shared `JWT_SECRET` and requires the `ADMIN` role.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use fournil_core::types::AdminUserId;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Claims carried by an admin token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id (UUID).
    pub sub: uuid::Uuid,
    /// Display username.
    #[serde(default)]
    pub username: String,
    /// Role; only `ADMIN` may use this API.
    pub role: String,
    /// Expiry (seconds since epoch), enforced by the decoder.
    pub exp: u64,
}

/// The authenticated administrator behind a request.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub id: AdminUserId,
    pub username: String,
}

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a Bearer token".to_string()))?;

        let key = DecodingKey::from_secret(
            state.config().jwt_secret.expose_secret().as_bytes(),
        );
        let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))?;

        if data.claims.role != "ADMIN" {
            return Err(AppError::Forbidden(
                "admin role required".to_string(),
            ));
        }

        Ok(Self {
            id: AdminUserId::new(data.claims.sub),
            username: data.claims.username,
        })
    }
}
