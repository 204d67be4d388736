use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pk_auth::{AuthContext, AuthError, AuthSession, Role};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::store::{NewUser, StoreError, UserProfile};
use crate::AppState;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid credentials",
        )
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// Mirrors the generic responses pk_auth::AuthError renders itself: the
// client never learns which verification step failed.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AUTH_HEADER",
                "Authentication required",
            ),
            _ => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN",
                "Invalid or expired token",
            ),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => {
                ApiError::bad_request("EMAIL_TAKEN", "Email already in use")
            }
            StoreError::Unavailable(detail) => {
                error!(detail, "user store unavailable");
                ApiError::internal_error("User store unavailable")
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !domain.contains('@')
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!(error = %err, "password hashing failed");
            ApiError::internal_error("Registration failed")
        })
}

fn issue_token(state: &AppState, user_id: i64, role: Role) -> Result<String, ApiError> {
    let token = state.signer.issue(user_id, role).map_err(|err| {
        error!(error = %err, "token issuance failed");
        ApiError::internal_error("Failed to issue token")
    })?;
    state.metrics.token_issued();
    Ok(token)
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::bad_request(
            "MISSING_FIELDS",
            "Please provide name, email and password",
        ));
    }

    let email = request.email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::bad_request(
            "INVALID_EMAIL",
            "Invalid email format",
        ));
    }

    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(
            "WEAK_PASSWORD",
            "Password must be at least 6 characters long",
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let user = state
        .store
        .insert(NewUser {
            name: request.name.trim().to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::User,
        })
        .await?;

    let token = issue_token(&state, user.id, user.role)?;
    info!(user_id = user.id, "registered new user");

    let body = AuthResponse {
        message: "Registration successful",
        token,
        user: UserProfile::from(&user),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request(
            "MISSING_FIELDS",
            "Please provide email and password",
        ));
    }

    let Some(user) = state.store.find_by_email(request.email.trim()).await? else {
        state.metrics.login_attempt("failure");
        return Err(ApiError::invalid_credentials());
    };

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|err| {
        error!(user_id = user.id, error = %err, "stored password hash unreadable");
        ApiError::internal_error("Login failed")
    })?;

    if Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        state.metrics.login_attempt("failure");
        return Err(ApiError::invalid_credentials());
    }

    let token = issue_token(&state, user.id, user.role)?;
    state.metrics.login_attempt("success");
    info!(user_id = user.id, "login successful");

    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user: UserProfile::from(&user),
    }))
}

/// Tokens are stateless; logout is an acknowledgment and the client
/// discards its copy.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logout successful",
    })
}

pub async fn check_auth(
    session: AuthSession,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let Some(context) = session.context() else {
        if let Some(err) = session.rejection() {
            state.record_token_rejection(err);
        }
        let body = CheckResponse {
            authenticated: false,
            user: None,
            error: Some("Invalid or expired token"),
        };
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    };

    let Some(user) = state.store.find_by_id(context.user_id()).await? else {
        let body = CheckResponse {
            authenticated: false,
            user: None,
            error: Some("User not found"),
        };
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    };

    let body = CheckResponse {
        authenticated: true,
        user: Some(UserProfile::from(&user)),
        error: None,
    };
    Ok(Json(body).into_response())
}

/// Mints a brand-new token with fresh timestamps. The role comes from
/// the store, not the old token, so promotions and demotions propagate.
pub async fn refresh_token(
    session: AuthSession,
    State(state): State<AppState>,
) -> Result<Json<AuthResponse>, ApiError> {
    let auth: AuthContext = match session {
        AuthSession::Authenticated(context) => context,
        AuthSession::Unauthenticated(err) => {
            state.record_token_rejection(&err);
            return Err(err.into());
        }
    };

    let Some(user) = state.store.find_by_id(auth.user_id()).await? else {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "USER_NOT_FOUND",
            "User not found",
        ));
    };

    let token = issue_token(&state, user.id, user.role)?;
    info!(user_id = user.id, "token refreshed");

    Ok(Json(AuthResponse {
        message: "Token refreshed successfully",
        token,
        user: UserProfile::from(&user),
    }))
}
