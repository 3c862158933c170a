//! `sbconf deploy` command

use anyhow::{Context, Result};

use super::CommandContext;
use crate::cli::DeployArgs;
use sbconf::ops::deploy::{expand_deploy_patterns, product_dir};

pub fn execute(args: DeployArgs, ctx: &CommandContext) -> Result<()> {
    let platform = ctx.platform(&args.platform, &[])?;
    let dir = args
        .product_dir
        .unwrap_or_else(|| product_dir(&args.source_root, platform.name(), args.config));
    let dir = if dir.is_relative() {
        std::env::current_dir()
            .context("failed to get current directory")?
            .join(dir)
    } else {
        dir
    };

    let files = expand_deploy_patterns(&platform, &dir)?;
    if files.is_empty() {
        eprintln!("No files in {} match the deploy patterns", dir.display());
    }
    for file in files {
        println!("{}", file.display());
    }

    Ok(())
}
