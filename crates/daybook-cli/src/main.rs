//! Daybook - a terminal client for the daybook tasks, expenses and notes API.
//!
//! Every invocation runs one command against the API and exits. The session
//! token persists between invocations in the configured token backend.

mod commands;

use std::io;
use std::path::Path;
use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use daybook_core::api::{ApiClient, ErrorKind};
use daybook_core::auth::{NavigationHandle, TokenStore};
use daybook_core::Config;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "daybook.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file layer and must outlive `main`'s work.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            eprintln!("{}", commands::USAGE);
            std::process::exit(2);
        }
    };

    if let Command::Help = command {
        println!("{}", commands::USAGE);
        return;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let log_dir = config
        .cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let _guard = init_tracing(log_dir.as_deref());
    info!(command = command.name(), base_url = %config.base_url, "daybook starting");

    if let Err(e) = run(command, config).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        let session_lost = e.downcast_ref::<daybook_core::ApiError>().map(|e| e.kind());
        let code = match session_lost {
            Some(ErrorKind::AuthenticationRequired) | Some(ErrorKind::SessionExpired) => 3,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(command: Command, mut config: Config) -> Result<()> {
    let storage = config
        .open_token_storage()
        .context("Failed to open token storage")?;

    let navigation = Arc::new(NavigationHandle::new());
    let tokens = Arc::new(TokenStore::new(storage, navigation.clone()));
    let client =
        ApiClient::from_config(&config, tokens).context("Failed to create HTTP client")?;

    // A reset in a one-shot CLI means telling the user how to get back in, once
    let hint = Once::new();
    navigation.mount(Arc::new(move || {
        hint.call_once(|| {
            eprintln!("Your session has ended. Run `daybook login <email>` to sign in again.");
        });
    }));

    commands::execute(command, &client, &mut config).await
}
