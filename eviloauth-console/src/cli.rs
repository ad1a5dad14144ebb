use clap::{ArgAction, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;

use eviloauth::IdpSettings;

/// OAuth2.0 token capture console for authorized red-team engagements
#[derive(Debug, Parser)]
#[command(name = "eviloauth")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Socket address the capture listener binds to
    #[arg(long, env = "EVILOAUTH_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// host[:port] the victim's browser reaches the listener at; used in redirect URIs
    #[arg(long, env = "EVILOAUTH_REDIRECT_SERVER", default_value = "127.0.0.1:5000")]
    pub redirect_server: String,

    /// Default application (client) id for `idp configure`
    #[arg(long, env = "EVILOAUTH_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Default scope for `idp configure`
    #[arg(long, env = "EVILOAUTH_SCOPE", default_value = "")]
    pub scope: String,

    /// Where the victim is sent after the token is captured
    #[arg(long, env = "EVILOAUTH_FINAL_DESTINATION", default_value = "/")]
    pub final_destination: String,

    /// PEM certificate for the listener; a self-signed one is generated when omitted
    #[arg(long, env = "EVILOAUTH_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key matching --tls-cert
    #[arg(long, env = "EVILOAUTH_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Defaults every `idp configure` starts from.
    pub(crate) fn idp_defaults(&self) -> IdpSettings {
        let mut settings = IdpSettings::new(self.redirect_server.clone());
        settings.client_id = self.client_id.clone().filter(|id| !id.trim().is_empty());
        settings.scope = self.scope.clone();
        settings.final_destination = self.final_destination.clone();
        settings
    }
}
