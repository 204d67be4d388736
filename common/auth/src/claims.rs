use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// Application-focused representation of verified token claims.
///
/// Immutable once issued; a refresh mints a brand-new value with fresh
/// timestamps rather than mutating an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_id: i64,
    pub role: Role,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Wire shape of the signed payload. Field order matters: serialization
/// must reproduce `iss`, `iat`, `exp`, `user_id`, `user_role` exactly as
/// the signature is computed over the encoded bytes.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClaimsRepr {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub user_id: i64,
    pub user_role: Role,
}

impl From<&Claims> for ClaimsRepr {
    fn from(claims: &Claims) -> Self {
        Self {
            iss: claims.issuer.clone(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            user_id: claims.user_id,
            user_role: claims.role,
        }
    }
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let issued_at = Utc
            .timestamp_opt(value.iat, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("iat", value.iat.to_string()))?;
        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        Ok(Self {
            issuer: value.iss,
            issued_at,
            expires_at,
            user_id: value.user_id,
            role: value.user_role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_serializes_in_declaration_order() {
        let claims = Claims {
            issuer: "PK Social Network".to_string(),
            issued_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            expires_at: Utc.timestamp_opt(1_700_003_600, 0).unwrap(),
            user_id: 42,
            role: Role::Admin,
        };
        let json = serde_json::to_string(&ClaimsRepr::from(&claims)).unwrap();
        assert_eq!(
            json,
            r#"{"iss":"PK Social Network","iat":1700000000,"exp":1700003600,"user_id":42,"user_role":"admin"}"#
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let payload = r#"{"iss":"pk","iat":1,"exp":2,"user_id":3}"#;
        assert!(serde_json::from_str::<ClaimsRepr>(payload).is_err());
    }

    #[test]
    fn role_outside_closed_set_is_rejected() {
        let payload = r#"{"iss":"pk","iat":1,"exp":2,"user_id":3,"user_role":"root"}"#;
        assert!(serde_json::from_str::<ClaimsRepr>(payload).is_err());
    }

    #[test]
    fn repr_round_trips_through_claims() {
        let repr = ClaimsRepr {
            iss: "pk".to_string(),
            iat: 100,
            exp: 200,
            user_id: 7,
            user_role: Role::User,
        };
        let claims = Claims::try_from(repr).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.issued_at.timestamp(), 100);
        assert_eq!(claims.expires_at.timestamp(), 200);
        assert!(!claims.is_admin());
    }

    #[test]
    fn expiry_is_strictly_before_now() {
        let claims = Claims {
            issuer: "pk".to_string(),
            issued_at: Utc.timestamp_opt(0, 0).unwrap(),
            expires_at: Utc.timestamp_opt(100, 0).unwrap(),
            user_id: 1,
            role: Role::User,
        };
        assert!(!claims.is_expired_at(Utc.timestamp_opt(100, 0).unwrap()));
        assert!(claims.is_expired_at(Utc.timestamp_opt(101, 0).unwrap()));
    }
}
