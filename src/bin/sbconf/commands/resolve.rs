//! `sbconf resolve` command

use anyhow::Result;

use super::variables::options;
use super::CommandContext;
use crate::cli::ResolveArgs;
use sbconf::ops::resolve::{resolve_build, ResolvedBuild};

pub fn execute(args: ResolveArgs, ctx: &CommandContext) -> Result<()> {
    let target = &args.target;
    let platform = ctx.platform(&target.platform, &target.search_paths)?;
    let resolved = resolve_build(&platform, &options(target))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        print_summary(&resolved);
    }

    Ok(())
}

fn print_summary(resolved: &ResolvedBuild) {
    println!("Platform:    {}", resolved.platform);
    println!("Config:      {}", resolved.config);
    match &resolved.application {
        Some(app) => println!("Application: {} ({})", app.name, app.kind),
        None => println!("Application: none"),
    }
    println!("Format:      {}", resolved.build_format);
    println!(
        "Accelerator: {}",
        if resolved.build_accelerator.is_empty() {
            "none"
        } else {
            resolved.build_accelerator.as_str()
        }
    );

    let toolchain = match &resolved.target_toolchain {
        Some(tools) => format!("{} tools", tools.len()),
        None => "legacy".to_string(),
    };
    println!(
        "Toolchain:   {}{}",
        toolchain,
        if resolved.clang { " (clang)" } else { "" }
    );
    println!(
        "Build file:  {}",
        resolved.default_target_build_file.display()
    );

    println!();
    println!("Includes:");
    for include in &resolved.includes {
        println!("  {}", include.display());
    }

    println!();
    println!("Variables:");
    for (key, value) in resolved.variables.iter() {
        println!("  {}={}", key, value);
    }

    if !resolved.environment_variables.is_empty() {
        println!();
        println!("Environment:");
        for (key, value) in &resolved.environment_variables {
            println!("  {}={}", key, value);
        }
    }
}
