use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct AuthMetrics {
    registry: Registry,
    login_attempts: IntCounterVec,
    tokens_issued: IntCounter,
    tokens_rejected: IntCounterVec,
}

impl AuthMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            Opts::new(
                "auth_login_attempts_total",
                "Count of login attempts grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let tokens_issued = IntCounter::new(
            "auth_tokens_issued_total",
            "Count of tokens issued across register, login and refresh",
        )?;
        registry.register(Box::new(tokens_issued.clone()))?;

        let tokens_rejected = IntCounterVec::new(
            Opts::new(
                "auth_tokens_rejected_total",
                "Count of presented tokens that failed verification, by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(tokens_rejected.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            tokens_issued,
            tokens_rejected,
        })
    }

    pub fn login_attempt(&self, outcome: &str) {
        self.login_attempts.with_label_values(&[outcome]).inc();
    }

    pub fn token_issued(&self) {
        self.tokens_issued.inc();
    }

    pub fn token_rejected(&self, reason: &str) {
        self.tokens_rejected.with_label_values(&[reason]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
