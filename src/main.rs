// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CuraPets command-line client
//!
//! Each invocation is one mount: the stored session is resolved before any
//! role-gated request, and an unresolvable session sends the user to login.

mod cli;

use clap::Parser;
use curapets::{
    config::Config,
    error::ClientError,
    notices::{ConsoleNotices, NoticeSink, TracingNotices},
    storage::TokenStore,
    App,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let json_logs = std::env::var("CURAPETS_LOG_JSON").is_ok_and(|v| v == "1");
    init_logging(args.verbose, json_logs);

    let config = Config::from_env_with_base_url(args.api_url.as_deref())?;
    tracing::debug!(api = %config.api_base_url, "Configuration loaded");

    let store = TokenStore::from_config(&config);
    // Machine-readable runs keep notices in the log stream
    let notices: Arc<dyn NoticeSink> = if json_logs {
        Arc::new(TracingNotices)
    } else {
        Arc::new(ConsoleNotices)
    };
    let app = App::new(config, store, notices)?;

    match cli::run(&app, args.command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}

/// Print a failed command the way a user should see it.
fn report(err: &ClientError) {
    match err {
        ClientError::Validation(errors) => {
            for (field, message) in errors {
                eprintln!("  {}: {}", field, message);
            }
        }
        e if e.is_auth_error() => {
            eprintln!("{}", e.user_message());
            eprintln!("Run `curapets login` to sign in.");
        }
        e => eprintln!("{}", e.user_message()),
    }
}

/// Initialize logging on stderr; JSON when `CURAPETS_LOG_JSON=1`.
fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "curapets=debug" } else { "curapets=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
