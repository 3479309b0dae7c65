// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! SessionGate CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands, InitArgs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still override
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "SessionGate".bold().green(), sessiongate::VERSION);
            println!("Token-authenticated session and connection gateway");
            Ok(())
        }

        Commands::Init {
            node_number,
            label,
            host,
            port,
            ip,
            mode,
            ssl,
            dbms,
            force,
        } => cli::handle_init(
            cli.storage,
            &cli.path,
            InitArgs {
                node_number,
                label,
                host,
                port,
                ip,
                mode,
                ssl,
                dbms,
                force,
            },
        ),

        Commands::Config { action } => cli::handle_config(cli.storage, &cli.path, action),

        Commands::Peers { action } => cli::handle_peers(cli.storage, &cli.path, action),

        Commands::Inspect { format } => cli::handle_inspect(cli.storage, &cli.path, format),
    }
}
