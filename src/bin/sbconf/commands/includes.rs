//! `sbconf includes` command

use anyhow::Result;

use super::variables::options;
use super::CommandContext;
use crate::cli::TargetArgs;
use sbconf::ops::resolve::resolve_build;

pub fn execute(args: TargetArgs, ctx: &CommandContext) -> Result<()> {
    let platform = ctx.platform(&args.platform, &args.search_paths)?;
    let resolved = resolve_build(&platform, &options(&args))?;

    if resolved.includes.is_empty() {
        eprintln!("No include files for {}", resolved.platform);
    }
    for include in &resolved.includes {
        println!("{}", include.display());
    }

    Ok(())
}
