//! eviloauth: TLS capture listener plus interactive operator console

use clap::Parser;
use eviloauth::{Dispatcher, ModuleRegistry, SharedState, builtin_modules};
use eviloauth_axum::capture_router;

mod cli;
mod errors;
mod repl;
mod server;

use crate::{
    cli::Cli,
    repl::{ConsoleExit, Repl, wait_for_console},
    server::{ServerHandle, init_tracing, load_tls_config},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install default CryptoProvider for rustls to prevent:
    // "no process-level CryptoProvider available -- call CryptoProvider::install_default() before this point"
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let state = SharedState::new();
    let modules = ModuleRegistry::load(builtin_modules()).await;
    let dispatcher = Dispatcher::new(state.clone(), modules, cli.idp_defaults());

    let tls = load_tls_config(cli.tls_cert.as_deref(), cli.tls_key.as_deref()).await?;
    let (server, bound) = ServerHandle::spawn(cli.bind, tls, capture_router(state)).await?;
    println!("Capture listener on https://{bound}");

    let runtime = tokio::runtime::Handle::current();
    let console = tokio::task::spawn_blocking(move || {
        let mut repl = Repl::new(dispatcher, runtime)?;
        repl.run()
    });

    // At the prompt rustyline turns Ctrl-C into input; this catches it while a command runs
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let exit = wait_for_console(console, interrupt).await;

    server.shutdown().await?;
    match exit? {
        ConsoleExit::Finished(result) => result?,
        ConsoleExit::Interrupted => {
            eprintln!("\nInterrupted");
            // The console thread may still be inside the command; do not wait for it
            std::process::exit(130);
        }
    }
    Ok(())
}
