// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser with ACLs and groups resolved
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::{AuthError, AuthenticatedUser, TokenClaims};
use crate::state::{AppState, AuthConfig};
use crate::storage::{FileStorage, GroupRepository, StorageError, UserRepository};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Accepted authorization schemes.
const AUTH_SCHEMES: [&str; 2] = ["Bearer ", "token "];

/// Extractor for authenticated users.
///
/// Validates the token from the Authorization header, then loads the user
/// it names together with the groups they belong to.
///
/// ## Authentication Modes
///
/// - **Production mode** (`AUTH_SECRET` set): HS256 signature, expiry and issuer checks
/// - **Development mode** (no `AUTH_SECRET`): Structure and expiry only (no signature check)
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = AUTH_SCHEMES
            .iter()
            .find_map(|scheme| auth_header.strip_prefix(scheme))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = verify_jwt(token, &state.auth_config)?;

        let storage = state.storage.read().await;
        let user = resolve_user(&storage, claims)?;

        Ok(Auth(user))
    }
}

/// Verify a token and return its claims.
fn verify_jwt(token: &str, auth_config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    match auth_config.secret {
        Some(ref secret) => verify_jwt_production(token, secret, auth_config),
        None => verify_jwt_development(token),
    }
}

fn verify_jwt_production(
    token: &str,
    secret: &str,
    auth_config: &AuthConfig,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;
    if let Some(ref issuer) = auth_config.issuer {
        validation.set_issuer(&[issuer]);
    }

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        _ => AuthError::MalformedToken,
    })?;

    Ok(token_data.claims)
}

/// Development token verification (no signature check).
///
/// WARNING: This should only be used in development environments.
fn verify_jwt_development(token: &str) -> Result<TokenClaims, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;
    let claims = token_data.claims;

    let now = chrono::Utc::now().timestamp();
    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Load the user a token names, with their current group memberships.
fn resolve_user(storage: &FileStorage, claims: TokenClaims) -> Result<AuthenticatedUser, AuthError> {
    let stored = match UserRepository::new(storage).get(&claims.sub) {
        Ok(user) => user,
        Err(StorageError::NotFound(_)) => return Err(AuthError::UnknownUser),
        Err(e) => return Err(AuthError::InternalError(e.to_string())),
    };

    let group_ids = GroupRepository::new(storage)
        .ids_for_member(&stored.id)
        .map_err(|e| AuthError::InternalError(e.to_string()))?;

    Ok(AuthenticatedUser::from_stored(stored, group_ids, claims.exp))
}

/// Extractor that requires the system admin ACL.
pub struct SystemAdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for SystemAdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_system_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(SystemAdminOnly(user))
    }
}
