use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ConsoleError {
    #[error("Failed to load TLS certificate: {0}")]
    Tls(String),

    #[error("Failed to generate self-signed certificate: {0}")]
    SelfSigned(#[from] rcgen::Error),

    #[error("Listener failed: {0}")]
    Listener(#[from] std::io::Error),

    #[error("Console input failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
