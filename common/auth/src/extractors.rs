use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use tracing::debug;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::verifier::TokenVerifier;

/// Verified claims for a request that presented a valid bearer token.
///
/// Extraction rejects with a generic 401 when the token is missing or
/// fails verification.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.claims.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

/// Per-request authentication outcome for handlers that serve both
/// authenticated and anonymous callers. Never rejects; the
/// unauthenticated arm keeps the verification failure so callers can
/// record why the token was turned away.
#[derive(Debug, Clone)]
pub enum AuthSession {
    Authenticated(AuthContext),
    Unauthenticated(AuthError),
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthSession::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        match self {
            AuthSession::Authenticated(context) => context.is_admin(),
            AuthSession::Unauthenticated(_) => false,
        }
    }

    pub fn context(&self) -> Option<&AuthContext> {
        match self {
            AuthSession::Authenticated(context) => Some(context),
            AuthSession::Unauthenticated(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&AuthError> {
        match self {
            AuthSession::Authenticated(_) => None,
            AuthSession::Unauthenticated(err) => Some(err),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.context().map(AuthContext::user_id)
    }
}

/// Outcome of the one verification performed for a request, cached in
/// the request extensions so repeated extraction never re-verifies.
#[derive(Clone)]
struct CachedAuth(Result<AuthContext, AuthError>);

fn authenticate(parts: &Parts, verifier: &TokenVerifier) -> AuthResult<AuthContext> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    let token = parse_bearer(header_value)?;
    let claims = verifier.verify(&token)?;

    Ok(AuthContext { claims, token })
}

fn cached_outcome<S>(parts: &mut Parts, state: &S) -> Result<AuthContext, AuthError>
where
    Arc<TokenVerifier>: FromRef<S>,
{
    if let Some(cached) = parts.extensions.get::<CachedAuth>() {
        return cached.0.clone();
    }

    let verifier = Arc::<TokenVerifier>::from_ref(state);
    let outcome = authenticate(parts, &verifier);
    if let Err(err) = &outcome {
        debug!(kind = err.kind(), "request not authenticated: {err}");
    }

    parts.extensions.insert(CachedAuth(outcome.clone()));
    outcome
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        cached_outcome(parts, state)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(match cached_outcome(parts, state) {
            Ok(context) => AuthSession::Authenticated(context),
            Err(err) => AuthSession::Unauthenticated(err),
        })
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively; surrounding whitespace is ignored.
fn parse_bearer(value: &axum::http::HeaderValue) -> AuthResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    let (scheme, rest) = raw
        .split_once(|c: char| c.is_ascii_whitespace())
        .ok_or(AuthError::InvalidAuthorization)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthorization);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
