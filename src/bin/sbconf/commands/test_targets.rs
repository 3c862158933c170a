//! `sbconf test-targets` command

use anyhow::Result;

use super::variables::options;
use super::CommandContext;
use crate::cli::TargetArgs;
use sbconf::ops::resolve::resolve_build;

pub fn execute(args: TargetArgs, ctx: &CommandContext) -> Result<()> {
    let platform = ctx.platform(&args.platform, &args.search_paths)?;
    let resolved = resolve_build(&platform, &options(&args))?;

    for target in &resolved.test_targets {
        let whole_target_filtered = resolved
            .test_filters
            .iter()
            .any(|f| &f.target == target && f.filters_whole_target());
        if whole_target_filtered {
            println!("{} (filtered)", target);
        } else {
            println!("{}", target);
        }
    }

    if !resolved.test_filters.is_empty() {
        println!();
        println!("# Filters ({}):", resolved.config);
        for filter in &resolved.test_filters {
            println!("  {}", filter);
        }
    }

    if !resolved.test_env_variables.is_empty() {
        println!();
        println!("# Test environment:");
        for (key, value) in &resolved.test_env_variables {
            println!("  {}={}", key, value);
        }
    }

    Ok(())
}
