//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, matches!(cli.command, Commands::Serve(_)));

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = crate::config::load(cli.config.as_deref(), cli.database)?;

    let ctx = commands::Context {
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
        verbose: cli.verbose,
        no_color: cli.no_color,
        config,
        server: cli.server,
    };

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(ctx, args).await,
        Commands::Get(args) => commands::get::execute(&ctx, &args).await,
        Commands::Set(args) => commands::set::execute(&ctx, args).await,
        Commands::Delete(args) => commands::delete::execute(&ctx, &args).await,
        Commands::List(args) => commands::list::execute(&ctx, &args).await,
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the defaults.
fn init_tracing(verbose: bool, serving: bool) {
    let default = match (verbose, serving) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
