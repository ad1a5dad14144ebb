use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use rcgen::CertifiedKey;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::ConsoleError;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const WORKSPACE_CRATES: [&str; 3] = ["eviloauth", "eviloauth_axum", "eviloauth_console"];

/// Load the operator's certificate pair, or generate a self-signed one for
/// `localhost`/`127.0.0.1` when none is given.
pub(crate) async fn load_tls_config(
    cert: Option<&Path>,
    key: Option<&Path>,
) -> Result<RustlsConfig, ConsoleError> {
    if let (Some(cert), Some(key)) = (cert, key) {
        tracing::info!("Using TLS certificate {}", cert.display());
        return RustlsConfig::from_pem_file(cert, key)
            .await
            .map_err(|e| ConsoleError::Tls(e.to_string()));
    }

    tracing::warn!("No TLS certificate given, generating a self-signed one");
    let subject_alt_names = vec!["localhost".to_string(), "127.0.0.1".to_string()];
    let CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(subject_alt_names)?;

    RustlsConfig::from_pem(cert.pem().into_bytes(), key_pair.serialize_pem().into_bytes())
        .await
        .map_err(|e| ConsoleError::Tls(e.to_string()))
}

/// The capture listener running in the background.
pub(crate) struct ServerHandle {
    handle: Handle,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Bind `addr` with TLS and serve `app` on a spawned task.
    ///
    /// Returns once the socket is bound, so a bind failure surfaces here rather than
    /// after the console has started.
    pub(crate) async fn spawn(
        addr: SocketAddr,
        config: RustlsConfig,
        app: Router,
    ) -> Result<(Self, SocketAddr), ConsoleError> {
        let handle = Handle::new();
        let server = axum_server::bind_rustls(addr, config)
            .handle(handle.clone())
            .serve(app.into_make_service());
        let task = tokio::spawn(server);

        match handle.listening().await {
            Some(bound) => {
                tracing::info!("Capture listener on https://{}", bound);
                Ok((Self { handle, task }, bound))
            }
            // The server future ended before binding; its result carries the reason
            None => {
                task.await??;
                Err(ConsoleError::Listener(std::io::Error::other(
                    "listener stopped before binding",
                )))
            }
        }
    }

    /// Stop accepting connections, let in-flight requests finish, then wait for the task.
    pub(crate) async fn shutdown(self) -> Result<(), ConsoleError> {
        tracing::info!("Shutting down capture listener");
        self.handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        self.task.await??;
        Ok(())
    }
}

fn default_filter(verbosity: u8) -> String {
    match verbosity {
        0 => "warn".to_string(),
        1 => {
            let crates: Vec<String> = WORKSPACE_CRATES.iter().map(|c| format!("{c}=info")).collect();
            format!("{},warn", crates.join(","))
        }
        _ => {
            let crates: Vec<String> = WORKSPACE_CRATES.iter().map(|c| format!("{c}=debug")).collect();
            format!("{},tower_http=debug,info", crates.join(","))
        }
    }
}

pub(crate) fn init_tracing(verbosity: u8) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(verbosity).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Log levels from least to most verbose: error < warn < info < debug < trace");
}
