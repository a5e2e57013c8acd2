use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::policy::{Admin, Principal};
use crate::error::AppError;

/// Any caller holding a valid, unexpired token.
pub struct AuthUser(pub Principal);

/// A caller whose token carries the `Admin` role.
pub struct AdminUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header"))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(Principal::from(claims)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        principal.require(&Admin)?;
        Ok(AdminUser(principal))
    }
}
