//! `sbconf accelerator` command

use anyhow::Result;

use super::CommandContext;
use crate::cli::AcceleratorArgs;
use sbconf::builder::accelerator::{select_build_accelerator, AcceleratorAvailability};

pub fn execute(args: AcceleratorArgs, ctx: &CommandContext) -> Result<()> {
    let kind = args.kind.unwrap_or_else(|| ctx.environment.accelerator());
    let vars = ctx.environment.vars();

    match kind.availability(vars) {
        AcceleratorAvailability::Available { path } => {
            println!("{}: {}", kind, path.display());
        }
        AcceleratorAvailability::Disabled { toggle } => {
            println!("{}: disabled by {}=0", kind, toggle);
        }
        AcceleratorAvailability::NotInstalled => {
            println!("{}: not found on PATH", kind);
        }
    }

    let selected = select_build_accelerator(kind, vars);
    println!(
        "Selected: {}",
        if selected.is_empty() { "none" } else { selected.as_str() }
    );

    Ok(())
}
