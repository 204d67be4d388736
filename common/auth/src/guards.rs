use axum::http::StatusCode;

use crate::extractors::AuthContext;
use crate::roles::Role;

#[derive(Debug, Clone)]
pub enum GuardError {
    Forbidden { required: Vec<&'static str> },
}

impl GuardError {
    pub fn into_response(self) -> (StatusCode, String) {
        match self {
            GuardError::Forbidden { required } => (
                StatusCode::FORBIDDEN,
                if required.is_empty() {
                    "Insufficient role".to_string()
                } else {
                    format!("Insufficient role. Required one of: {}", required.join(", "))
                },
            ),
        }
    }
}

impl From<GuardError> for (StatusCode, String) {
    fn from(value: GuardError) -> Self {
        value.into_response()
    }
}

pub fn ensure_role(auth: &AuthContext, allowed: &[Role]) -> Result<(), GuardError> {
    if allowed.is_empty() || allowed.contains(&auth.claims.role) {
        Ok(())
    } else {
        Err(GuardError::Forbidden {
            required: allowed.iter().map(Role::as_str).collect(),
        })
    }
}

pub fn ensure_admin(auth: &AuthContext) -> Result<(), GuardError> {
    ensure_role(auth, &[Role::Admin])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Claims;
    use chrono::{TimeZone, Utc};

    fn context(role: Role) -> AuthContext {
        AuthContext {
            claims: Claims {
                issuer: "pk".to_string(),
                issued_at: Utc.timestamp_opt(0, 0).unwrap(),
                expires_at: Utc.timestamp_opt(4_102_444_800, 0).unwrap(),
                user_id: 1,
                role,
            },
            token: String::new(),
        }
    }

    #[test]
    fn admin_passes_admin_guard() {
        assert!(ensure_admin(&context(Role::Admin)).is_ok());
    }

    #[test]
    fn user_fails_admin_guard_with_403() {
        let err = ensure_admin(&context(Role::User)).unwrap_err();
        let (status, message) = err.into_response();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(message.contains("admin"));
    }

    #[test]
    fn empty_allow_list_admits_everyone() {
        assert!(ensure_role(&context(Role::User), &[]).is_ok());
    }
}
