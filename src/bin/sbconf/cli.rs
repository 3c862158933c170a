//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use sbconf::builder::AcceleratorKind;
use sbconf::core::BuildConfig;

/// sbconf - Starboard platform and application build configuration
#[derive(Parser)]
#[command(name = "sbconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to search for platform descriptors (repeatable)
    #[arg(long = "platform-root", global = true, value_name = "DIR")]
    pub platform_roots: Vec<PathBuf>,

    /// Root of the Starboard sources
    #[arg(long, global = true, env = "SB_STARBOARD_ROOT", value_name = "DIR")]
    pub starboard_root: Option<PathBuf>,

    /// Project config file (defaults to .sbconf/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known platforms
    Platforms,

    /// Show the generator variables for a platform
    Variables(TargetArgs),

    /// Show the generator include files for a platform
    Includes(TargetArgs),

    /// Show which application configuration a platform selects
    App(AppArgs),

    /// Resolve the complete build configuration
    Resolve(ResolveArgs),

    /// Show the unit test targets and filters for a platform
    TestTargets(TargetArgs),

    /// Probe the build accelerator
    Accelerator(AcceleratorArgs),

    /// List the files to deploy for a platform
    Deploy(DeployArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Platform, build config and optional application.
#[derive(Args)]
pub struct TargetArgs {
    /// Platform name
    pub platform: String,

    /// Build config (debug, devel, qa, gold)
    #[arg(short, long, default_value = "debug")]
    pub config: BuildConfig,

    /// Application to layer on top of the platform
    #[arg(short, long)]
    pub app: Option<String>,

    /// Treat the legacy toolchain as Clang
    #[arg(long)]
    pub clang: bool,

    /// Extra directory to search for application configurations (repeatable)
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct AppArgs {
    /// Platform name
    pub platform: String,

    /// Application name
    pub application: String,

    /// Extra directory to search for application configurations (repeatable)
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit the resolved configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AcceleratorArgs {
    /// Accelerator to probe (defaults to the configured one)
    #[arg(long)]
    pub kind: Option<AcceleratorKind>,
}

#[derive(Args)]
pub struct DeployArgs {
    /// Platform name
    pub platform: String,

    /// Build config (debug, devel, qa, gold)
    #[arg(short, long, default_value = "debug")]
    pub config: BuildConfig,

    /// Source root holding the `out/` directory
    #[arg(long, default_value = ".")]
    pub source_root: PathBuf,

    /// Product directory (overrides `<source root>/out/<platform>_<config>`)
    #[arg(long)]
    pub product_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
