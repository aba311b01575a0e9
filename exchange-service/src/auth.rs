//! Stands in for the out-of-scope API-key authentication middleware (spec
//! §1: "auth middleware... deliberately out of scope"). The reference
//! `middleware.AuthAPIKeyMiddlewareRequireScopes` resolves a caller's user
//! id from a bearer token against relational storage; here the caller is
//! trusted to assert its own identity via a header, as it would sit behind
//! a gateway that performs the real check upstream.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub struct UserId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.headers.get("x-user-id").ok_or(AppError::MissingUserHeader)?;
        let raw = raw.to_str().map_err(|_| AppError::InvalidUserHeader)?;
        let user_id = raw.parse::<i64>().map_err(|_| AppError::InvalidUserHeader)?;
        Ok(UserId(user_id))
    }
}
