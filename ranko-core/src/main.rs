//! ranko - command-line entry point for the ranking engine
//!
//! Opens the database under the resolved root folder, builds the engine, and
//! runs one command. Notifications are delivered inline here: the process
//! exits right after the command, which would drop detached deliveries.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ranko_common::config::{self, DispatchMode, TomlConfig};
use ranko_common::{SqliteStore, Store};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use ranko_core::{Engine, EngineConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let toml = TomlConfig::load_or_default(args.config.as_deref());

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml);
    let db_path = config::database_path(&root_folder);
    debug!("Database: {}", db_path.display());

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?,
    );

    let engine_config = EngineConfig {
        dispatch: DispatchMode::Inline,
        ..EngineConfig::from_toml(&toml)
    };
    let engine = Engine::new(
        store,
        Engine::push_sender(&toml.notifications),
        engine_config,
    );

    if matches!(args.command, cli::Command::Init) {
        info!("Database ready at {}", db_path.display());
    }

    cli::run(&engine, args.command).await
}
