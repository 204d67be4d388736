use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::claims::{Claims, ClaimsRepr};
use crate::codec::{encode_segment, join};
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Token header. Field order matters for the exact wire encoding:
/// `{"typ":"JWT","alg":"HS256"}`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Header {
    pub typ: String,
    pub alg: String,
}

impl Header {
    pub(crate) fn hs256() -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: "HS256".to_string(),
        }
    }
}

pub(crate) fn mac_for(secret: &[u8]) -> AuthResult<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(secret).map_err(|_| AuthError::EmptySecret)
}

/// Issues HS256-signed tokens for authenticated subjects.
#[derive(Clone, Debug)]
pub struct TokenSigner {
    config: JwtConfig,
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(config: JwtConfig, secret: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(Self { config, secret })
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue a token for `user_id` with `iat = now` and `exp = now + ttl`.
    pub fn issue(&self, user_id: i64, role: Role) -> AuthResult<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Deterministic variant of [`issue`](Self::issue) taking an explicit
    /// issuance instant. Sub-second precision is dropped; the wire form
    /// carries whole Unix seconds.
    pub fn issue_at(
        &self,
        user_id: i64,
        role: Role,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = Claims {
            issuer: self.config.issuer.clone(),
            issued_at: now,
            expires_at: now + self.config.ttl,
            user_id,
            role,
        };

        let header_bytes = serde_json::to_vec(&Header::hs256())
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        let payload_bytes = serde_json::to_vec(&ClaimsRepr::from(&claims))
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;

        let header_segment = encode_segment(&header_bytes);
        let payload_segment = encode_segment(&payload_bytes);

        let mut mac = mac_for(&self.secret)?;
        mac.update(header_segment.as_bytes());
        mac.update(b".");
        mac.update(payload_segment.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(join(
            &header_segment,
            &payload_segment,
            &encode_segment(&signature),
        ))
    }
}
