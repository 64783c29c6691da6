//! Serve command - run the Taskboard API
//!
//! Opens the SQLite database, builds the token keys from `[auth]`, wires the
//! request gate and serves the router until Ctrl+C or SIGTERM.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use taskboard_api::{AppState, RouterOptions, SessionSettings, TrackerStore, build_router_with_options};
use taskboard_auth::{CredentialConfig, JwtCredentials, LocalUserStore, UserStore};
use taskboard_config::Config;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

/// Run the API server
pub async fn run(config: Config) -> Result<()> {
    config.validate().context("invalid configuration")?;

    let credentials = Arc::new(init_credentials(&config)?);

    ensure_parent_dir(&config.storage.db_path)?;
    let users = Arc::new(
        LocalUserStore::open(&config.storage.db_path)
            .await
            .context("failed to open user store")?,
    );
    let tracker = Arc::new(
        TrackerStore::open(&config.storage.db_path)
            .await
            .context("failed to open tracker store")?,
    );

    if users.is_empty().await.context("failed to count users")? {
        warn!("no user accounts yet, create one with `taskboard user add`");
    }

    let session = SessionSettings {
        cookie_name: config.auth.cookie_name.clone(),
        allow_query_token: config.auth.allow_query_token,
    };
    if session.allow_query_token {
        warn!("query string tokens enabled, tokens may end up in access logs");
    }

    let state = AppState::new(users as Arc<dyn UserStore>, tracker, credentials, session);

    let app = build_router_with_options(
        state,
        RouterOptions {
            audit_logging: config.server.audit_logging,
        },
    );

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        addr = %addr,
        db = %config.storage.db_path.display(),
        audit_logging = config.server.audit_logging,
        "Taskboard API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("API server error")?;

    info!("Taskboard shutdown complete");
    Ok(())
}

/// Build token keys from `[auth]`
pub fn init_credentials(config: &Config) -> Result<JwtCredentials> {
    let secret = config.auth.resolve_jwt_secret()?;

    let mut credential_config =
        CredentialConfig::new(secret.into_bytes()).with_ttl(config.auth.jwt_expires_in);
    if let Some(ref issuer) = config.auth.issuer {
        credential_config = credential_config.with_issuer(issuer);
    }

    JwtCredentials::new(&credential_config).context("failed to initialize token keys")
}

/// Create the database directory if needed
pub fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use taskboard_auth::CredentialVerifier;

    #[test]
    fn test_credentials_from_config() {
        let config = Config::from_str(
            r#"
[auth]
jwt_secret = "0123456789abcdef0123456789abcdef"
jwt_expires_in = "1h"
"#,
        )
        .unwrap();

        let credentials = init_credentials(&config).unwrap();
        assert_eq!(credentials.ttl().num_seconds(), 3600);

        let issued = credentials.mint("user-1").unwrap();
        assert_eq!(credentials.verify(&issued.token).unwrap().user_id, "user-1");
    }

    #[test]
    fn test_missing_secret_fails() {
        let config = Config::default();
        assert!(init_credentials(&config).is_err());
    }
}
