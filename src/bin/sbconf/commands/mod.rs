//! Command implementations

pub mod accelerator;
pub mod app;
pub mod completions;
pub mod deploy;
pub mod includes;
pub mod platforms;
pub mod resolve;
pub mod test_targets;
pub mod variables;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use sbconf::core::{ConfigError, Environment, PlatformConfiguration, ProcessEnv};
use sbconf::util::config::{global_config_path, load_config, project_config_path, Config};

/// Configuration and environment shared by every command.
pub struct CommandContext {
    pub config: Config,
    pub environment: Arc<Environment>,
}

impl CommandContext {
    /// Load the merged config and apply command-line overrides.
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let project_path = match &global.config_file {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("config file {} does not exist", path.display());
                }
                path.clone()
            }
            None => project_config_path(&cwd),
        };

        let mut config = load_config(global_config_path().as_deref(), &project_path);
        if let Some(root) = &global.starboard_root {
            config.paths.starboard_root = Some(root.clone());
        }
        if !global.platform_roots.is_empty() {
            config.paths.platform_roots = global.platform_roots.clone();
        }

        let environment = Arc::new(config.environment(ProcessEnv));
        tracing::debug!(
            "Discovered {} platforms under {:?}",
            environment.platforms().len(),
            config.platform_roots()
        );

        Ok(CommandContext {
            config,
            environment,
        })
    }

    /// Platform configuration for a discovered platform, with the configured
    /// and given application search paths appended.
    pub fn platform(&self, name: &str, search_paths: &[PathBuf]) -> Result<PlatformConfiguration> {
        let info = self
            .environment
            .platforms()
            .get(name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "{}\n\
                     help: Run `sbconf platforms` to see available platforms",
                    ConfigError::UnknownPlatform(name.to_string())
                )
            })?;

        let mut platform = PlatformConfiguration::from_info(info, Arc::clone(&self.environment));
        for path in self
            .config
            .paths
            .application_search_paths
            .iter()
            .chain(search_paths)
        {
            platform.append_application_configuration_path(path.clone());
        }
        Ok(platform)
    }
}
