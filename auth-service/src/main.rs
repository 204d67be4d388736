use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use auth_service::app::{build_router, AppState};
use auth_service::config::ServiceConfig;
use auth_service::metrics::AuthMetrics;
use auth_service::store::InMemoryUserStore;
use pk_auth::{JwtConfig, TokenSigner, TokenVerifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = ServiceConfig::from_env()?;

    let jwt_config =
        JwtConfig::new(config.issuer.clone()).with_ttl_seconds(config.token_ttl_seconds);
    let signer = TokenSigner::new(jwt_config, config.jwt_secret.as_bytes())
        .context("invalid token signer configuration")?;
    let verifier = TokenVerifier::new(config.jwt_secret.as_bytes())
        .context("invalid token verifier configuration")?;

    let state = AppState {
        store: Arc::new(InMemoryUserStore::new()),
        signer: Arc::new(signer),
        verifier: Arc::new(verifier),
        metrics: Arc::new(AuthMetrics::new()?),
    };

    let app = build_router(state);

    let ip: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    info!(%addr, issuer = %config.issuer, "starting auth-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
