// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # OzMirror Configuration Service
//!
//! The `ozmirror-config` binary runs the dashboard configuration store.
//!
//! ## Commands
//!
//! - `ozmirror-config serve` - Seed defaults and serve the REST API
//! - `ozmirror-config migrate [--dry-run]` - Apply database migrations
//! - `ozmirror-config config show|validate|generate` - Configuration management

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ozmirror_config::commands::{self, ConfigCommand, MigrateCommand};
use ozmirror_config::logging::{init_logging, LogFormat};
use ozmirror_config::server::{self, ServeOverrides};

/// OzMirror configuration service
#[derive(Parser)]
#[command(name = "ozmirror-config")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "OZMIRROR_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "OZMIRROR_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed defaults and serve the HTTP API
    #[command(name = "serve")]
    Serve {
        /// HTTP bind host (overrides config)
        #[arg(long, env = "OZMIRROR_HOST")]
        host: Option<String>,

        /// HTTP bind port (overrides config)
        #[arg(long, env = "OZMIRROR_PORT")]
        port: Option<u16>,
    },

    /// Apply pending database migrations
    #[command(name = "migrate")]
    Migrate {
        #[command(flatten)]
        command: MigrateCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is not an error.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Serve { host, port } => {
            server::start_server(cli.config, ServeOverrides { host, port }).await
        }
        Commands::Migrate { command } => commands::migrate::execute(command, cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}
