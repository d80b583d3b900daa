// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shopbot - Telegram subscription shop bot.
//!
//! This is the binary entry point.

mod history;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopbot_config::ShopConfig;

/// Shopbot - operator broadcasts and manual payment relay for a Telegram shop.
#[derive(Parser, Debug)]
#[command(name = "shopbot", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot until interrupted.
    Serve,
    /// Show the most recent broadcast campaigns.
    Broadcasts {
        /// Number of campaigns to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Validate configuration and exit.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> ShopConfig {
    let result = match path {
        Some(path) => shopbot_config::load_and_validate_path(path),
        None => shopbot_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            shopbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Broadcasts { limit }) => history::run_broadcasts(&config, limit).await,
        Some(Commands::Check) => {
            println!(
                "shopbot: config OK (bot.name={}, operator_id={}, database={})",
                config.bot.name, config.telegram.operator_id, config.storage.database_path
            );
            Ok(())
        }
        None => {
            println!("shopbot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
