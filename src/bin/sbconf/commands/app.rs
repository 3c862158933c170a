//! `sbconf app` command

use anyhow::Result;

use super::CommandContext;
use crate::cli::AppArgs;

pub fn execute(args: AppArgs, ctx: &CommandContext) -> Result<()> {
    let platform = ctx.platform(&args.platform, &args.search_paths)?;

    println!("Search path:");
    for dir in platform.search_path() {
        println!("  {}", dir.display());
    }
    println!();

    let app = platform.application_configuration(&args.application)?;
    println!("Application: {}", app.name());
    println!("  kind:   {}", app.kind());
    println!("  path:   {}", app.path().display());
    if let Some(file) = app.default_target_build_file() {
        println!("  build:  {}", file.display());
    }

    Ok(())
}
