// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use knowledge_base_server::{
    api::router,
    auth::TokenService,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    state::AppState,
    storage::{DocumentStore, StoragePaths},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Time allowed for in-flight requests once shutdown starts.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet.
            let format = match std::env::var(LOG_FORMAT_ENV).as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            };
            init_tracing(format);
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    #[cfg(feature = "dev")]
    if std::env::var(knowledge_base_server::config::JWT_SECRET_ENV).is_err() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let mut store = DocumentStore::new(StoragePaths::new(&config.data_dir));
    if let Err(e) = store.initialize() {
        tracing::error!(data_dir = %config.data_dir.display(), error = %e, "Failed to initialize storage");
        return ExitCode::FAILURE;
    }
    if let Err(e) = store.health_check() {
        tracing::error!(data_dir = %config.data_dir.display(), error = %e, "Storage health check failed");
        return ExitCode::FAILURE;
    }
    tracing::info!(data_dir = %config.data_dir.display(), "Storage initialized");

    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl);
    tracing::info!(token_ttl_secs = tokens.ttl().as_secs(), "Token service ready");
    let state = AppState::new(store, tokens).with_bcrypt_cost(config.bcrypt_cost);
    let app = router(state);
    let addr = config.bind_addr;

    let result = match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!("rustls crypto provider already installed");
            }

            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    tracing::error!(
                        cert = %tls.cert.display(),
                        key = %tls.key.display(),
                        error = %e,
                        "Failed to load TLS certificate"
                    );
                    return ExitCode::FAILURE;
                }
            };

            let handle = Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
            });

            tracing::info!(%addr, "Knowledge base server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!(%addr, "Knowledge base server listening on http (docs at /docs)");
                axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown_signal())
                    .await
            }
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
