// src/utils/jwt.rs

//! Bearer-token checks for the staff routes.
//!
//! Tokens are issued by the school's identity platform with a shared HS256
//! secret. This service never mints them.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Roles allowed to record results and trigger rank computation.
pub const STAFF_ROLES: [&str; 2] = ["admin", "teacher"];

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Account id on the identity platform.
    pub sub: String,
    /// `admin`, `teacher`, `student`, ...
    pub role: String,
    /// Unix timestamp, checked by `jsonwebtoken`.
    pub exp: u64,
}

impl Claims {
    pub fn is_staff(&self) -> bool {
        STAFF_ROLES.contains(&self.role.as_str())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })
}

/// Verifies the bearer token and stores its `Claims` in the request extensions.
pub async fn require_token(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = verify_jwt(token, &config.jwt_secret)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Layered inside `require_token`.
pub async fn require_staff(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    if !claims.is_staff() {
        tracing::warn!("Role '{}' denied access to staff route", claims.role);
        return Err(AppError::Forbidden("Staff role required".to_string()));
    }

    Ok(next.run(req).await)
}
