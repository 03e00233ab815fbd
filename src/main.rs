// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debuglevel);

    let resolved = match cli.command {
        Commands::Init { db_path } => {
            commands::cmd_init(&db_path)?;
            true
        }
        Commands::Import {
            file,
            repo,
            db_path,
        } => {
            commands::cmd_import(&file, &repo, &db_path)?;
            true
        }
        Commands::Solve {
            units,
            source_repo,
            target_repo,
            ignore_recommends,
            db_path,
        } => commands::cmd_solve(
            &units,
            &source_repo,
            target_repo.as_deref(),
            ignore_recommends,
            &db_path,
        )?,
        Commands::Closure {
            unit,
            repo,
            db_path,
        } => commands::cmd_closure(&unit, &repo, &db_path)?,
        Commands::Completions { shell } => {
            commands::cmd_completions(shell);
            true
        }
    };

    if !resolved {
        std::process::exit(1);
    }
    Ok(())
}

/// Map the CLI debug level onto the tracing filter, with RUST_LOG taking
/// precedence when set.
fn init_tracing(debuglevel: u8) {
    let default = match debuglevel {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}
