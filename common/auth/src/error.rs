use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Internal taxonomy of authentication failures.
///
/// The verifier preserves the distinction for diagnostics, but every
/// token-related variant renders as the same generic 401 so clients
/// cannot probe which check rejected them.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("token does not have exactly three segments")]
    MalformedToken,
    #[error("invalid base64url in token segment: {0}")]
    Decode(String),
    #[error("failed to decode token header: {0}")]
    InvalidHeader(String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("token signature mismatch")]
    SignatureMismatch,
    #[error("token expired")]
    Expired,
    #[error("shared secret must not be empty")]
    EmptySecret,
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl AuthError {
    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed",
            AuthError::Decode(_) => "decode",
            AuthError::InvalidHeader(_) => "header",
            AuthError::InvalidJson(_) => "claims_json",
            AuthError::InvalidClaim(_, _) => "claims",
            AuthError::SignatureMismatch => "signature",
            AuthError::Expired => "expired",
            AuthError::EmptySecret => "config",
            AuthError::MissingAuthorization => "missing_header",
            AuthError::InvalidAuthorization => "bad_header",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => (
                StatusCode::UNAUTHORIZED,
                "AUTH_HEADER",
                "Authentication required",
            ),
            AuthError::EmptySecret => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_CONFIG",
                "Authentication misconfigured",
            ),
            // Deliberately indistinguishable to the client.
            _ => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN",
                "Invalid or expired token",
            ),
        };

        let body = ErrorBody { code, message };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_collapse_to_one_response() {
        let variants = [
            AuthError::MalformedToken,
            AuthError::Decode("bad".into()),
            AuthError::SignatureMismatch,
            AuthError::Expired,
        ];
        for err in variants {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
