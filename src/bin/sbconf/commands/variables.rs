//! `sbconf variables` command

use anyhow::Result;

use super::CommandContext;
use crate::cli::TargetArgs;
use sbconf::ops::resolve::{resolve_build, ResolveOptions};

pub fn execute(args: TargetArgs, ctx: &CommandContext) -> Result<()> {
    let platform = ctx.platform(&args.platform, &args.search_paths)?;
    let resolved = resolve_build(&platform, &options(&args))?;

    for (key, value) in resolved.variables.iter() {
        println!("{}={}", key, value);
    }

    if !resolved.generator_variables.is_empty() {
        println!();
        println!("# Generator variables:");
        for (key, value) in resolved.generator_variables.iter() {
            println!("{}={}", key, value);
        }
    }

    Ok(())
}

/// Resolve options for platform/config/application arguments.
pub fn options(args: &TargetArgs) -> ResolveOptions {
    ResolveOptions {
        config: args.config,
        application: args.app.clone(),
        legacy_clang: args.clang,
    }
}
