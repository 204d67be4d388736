use chrono::{DateTime, Utc};
use hmac::Mac;
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr};
use crate::codec::{decode_segment, split};
use crate::error::{AuthError, AuthResult};
use crate::signer::{mac_for, Header};

/// Verifies presented tokens against the shared secret.
///
/// Verification is a pure function of (token, secret, now): no I/O and
/// no shared mutable state, so a single verifier is safe to share across
/// concurrently handled requests.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(Self { secret })
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Deterministic variant of [`verify`](Self::verify) taking an
    /// explicit comparison instant.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let (header_segment, payload_segment, signature_segment) = split(token)?;

        let header_bytes = decode_segment(header_segment)?;
        let header: Header = serde_json::from_slice(&header_bytes)
            .map_err(|err| AuthError::InvalidHeader(err.to_string()))?;
        if header.alg != "HS256" {
            return Err(AuthError::InvalidHeader(format!(
                "unsupported alg '{}'",
                header.alg
            )));
        }

        let payload_bytes = decode_segment(payload_segment)?;
        let signature = decode_segment(signature_segment)?;

        // verify_slice is the constant-time comparison; a plain byte
        // compare would leak the position of the first mismatch.
        let mut mac = mac_for(&self.secret)?;
        mac.update(header_segment.as_bytes());
        mac.update(b".");
        mac.update(payload_segment.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::SignatureMismatch)?;

        let repr: ClaimsRepr = serde_json::from_slice(&payload_bytes)
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        let claims = Claims::try_from(repr)?;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        debug!(user_id = claims.user_id, role = %claims.role, "verified token");
        Ok(claims)
    }
}
