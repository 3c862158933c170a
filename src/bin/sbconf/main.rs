//! sbconf CLI - Starboard build configuration

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::CommandContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr
    let filter = if cli.global.verbose {
        EnvFilter::new("sbconf=debug")
    } else {
        EnvFilter::new("sbconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let command = match cli.command {
        Commands::Completions(args) => return commands::completions::execute(args),
        command => command,
    };

    let ctx = CommandContext::new(&cli.global)?;

    match command {
        Commands::Platforms => commands::platforms::execute(&ctx),
        Commands::Variables(args) => commands::variables::execute(args, &ctx),
        Commands::Includes(args) => commands::includes::execute(args, &ctx),
        Commands::App(args) => commands::app::execute(args, &ctx),
        Commands::Resolve(args) => commands::resolve::execute(args, &ctx),
        Commands::TestTargets(args) => commands::test_targets::execute(args, &ctx),
        Commands::Accelerator(args) => commands::accelerator::execute(args, &ctx),
        Commands::Deploy(args) => commands::deploy::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
