//! Rulebook MCP Server
//!
//! Serves a directory of grouped Markdown rules to AI agents via the MCP protocol.
//!
//! ## Tools
//!
//! - `list_rules` - Available rule keys plus `ALL`
//! - `get_rule` - One rule by key, or every rule when the key is `ALL`
//! - `repository_status` - Root, snapshot age, staleness, scan warnings
//! - `reload` - Force a rescan
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "rulebook": {
//!       "command": "rulebook-mcp",
//!       "env": { "RULEBOOK_ROOT": "/path/to/rules" }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use rulebook_repository::{
    ChangeMonitor, MonitorConfig, RepositoryConfig, RepositoryError, RuleQuery, RuleRepository,
};
use std::sync::Arc;

mod cli;
mod tools;

use clap::Parser;
use cli::{Cli, Mode};
use tools::catalog;
use tools::RulebookService;

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit with code 2; --help and --version exit with 0.
    let cli = Cli::parse();

    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = RepositoryConfig::resolve(cli.root.as_deref());
    let repository = Arc::new(RuleRepository::open(&config));
    let query = RuleQuery::new(Arc::clone(&repository));

    match cli.mode() {
        Mode::List => {
            for key in query.list_keys() {
                println!("{key}");
            }
            return Ok(());
        }
        Mode::Get(key) => match query.get(&key) {
            Ok(text) => {
                println!("{text}");
                return Ok(());
            }
            Err(err @ RepositoryError::UnknownKey { .. }) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        },
        Mode::PrintTools => {
            let payload = catalog::tool_inventory_json(env!("CARGO_PKG_VERSION"), &query.list_keys());
            println!("{payload}");
            return Ok(());
        }
        Mode::Serve => {}
    }

    log::info!(
        "Starting Rulebook MCP server (root: {})",
        config.root.display()
    );
    let initial = repository.read();
    log::info!("Serving {} rules", initial.len());

    let _monitor = if config.watch {
        match ChangeMonitor::start(&config.root, repository.clone(), MonitorConfig::default()) {
            Ok(monitor) => Some(monitor),
            Err(err) => {
                log::warn!("Change monitor disabled, relying on snapshot expiry: {err}");
                None
            }
        }
    } else {
        log::info!("Change monitor disabled by configuration");
        None
    };

    let server = RulebookService::new(query).serve(stdio()).await?;

    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received");
        cancel.cancel();
    });

    server.waiting().await?;

    log::info!("Rulebook MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                log::warn!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
