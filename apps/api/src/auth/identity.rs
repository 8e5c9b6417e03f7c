//! Identity resolution: credential in, principal (or nothing) out.
//!
//! Resolution fails closed. A missing, malformed, foreign-signed or expired
//! credential all produce `None`, and callers only ever learn "unauthenticated".

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::principal::Principal;
use crate::auth::token::TokenService;
use crate::errors::AppError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// Pulls the raw credential out of a request: the `token` cookie first,
/// then an `Authorization: Bearer` header.
pub fn credential_from_headers(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| bearer_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

pub fn resolve(tokens: &TokenService, credential: Option<&str>) -> Option<Principal> {
    tokens.verify(credential?).map(|claims| claims.principal())
}

/// Session cookie carrying a freshly issued token.
pub fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .secure(secure)
        .build()
}

/// Cookie that tells the browser to drop the session.
pub fn expired_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), chrono::Duration::zero(), secure);
    cookie.make_removal();
    cookie
}

/// Extractor for routes that require a principal. Rejects with 401.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Principal);

/// Extractor for routes that behave differently for signed-in callers but
/// are also open to anonymous ones.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = credential_from_headers(&parts.headers);
        Ok(MaybeUser(resolve(&state.tokens, credential.as_deref())))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(principal) = MaybeUser::from_request_parts(parts, state).await?;
        principal
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
