use chrono::Duration;

/// Default token lifetime: seven days, matching the reference deployment.
pub const DEFAULT_TTL_SECONDS: i64 = 7 * 24 * 3600;

/// Runtime configuration for token issuance and verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Value of the `iss` claim stamped into every token.
    pub issuer: String,
    /// Fixed lifetime applied at issuance (`exp = iat + ttl`).
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
        }
    }

    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl = Duration::seconds(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_seven_days() {
        let config = JwtConfig::new("pk");
        assert_eq!(config.ttl.num_seconds(), 604_800);
    }

    #[test]
    fn ttl_override() {
        let config = JwtConfig::new("pk").with_ttl_seconds(3600);
        assert_eq!(config.ttl.num_seconds(), 3600);
    }
}
