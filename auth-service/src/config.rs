use anyhow::{bail, Context, Result};
use std::env;

use pk_auth::config::DEFAULT_TTL_SECONDS;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Shared HS256 secret. Must be non-empty; startup aborts otherwise.
    pub jwt_secret: String,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub token_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret =
            env::var("PK_JWT_SECRET").context("PK_JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("PK_JWT_SECRET must not be empty");
        }

        let issuer =
            env::var("PK_JWT_ISSUER").unwrap_or_else(|_| "PK Social Network".to_string());

        let token_ttl_seconds = match env::var("PK_TOKEN_TTL_SECS") {
            Ok(raw) => {
                let ttl: i64 = raw
                    .parse()
                    .context("PK_TOKEN_TTL_SECS must be an integer")?;
                if ttl <= 0 {
                    bail!("PK_TOKEN_TTL_SECS must be positive");
                }
                ttl
            }
            Err(_) => DEFAULT_TTL_SECONDS,
        };

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            jwt_secret,
            issuer,
            token_ttl_seconds,
            host,
            port,
        })
    }
}
