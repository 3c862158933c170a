//! `sbconf platforms` command

use anyhow::Result;

use super::CommandContext;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let platforms = ctx.environment.platforms();

    if platforms.is_empty() {
        let roots: Vec<String> = ctx
            .config
            .platform_roots()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        eprintln!("No platforms found under {}", roots.join(", "));
        eprintln!("help: Pass --platform-root or set paths.platform_roots in .sbconf/config.toml");
        return Ok(());
    }

    for info in platforms.iter() {
        println!("{}\t{}", info.name, info.path.display());
    }

    Ok(())
}
