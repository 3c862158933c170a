//! Application configurations: per-application overrides layered on top of a
//! platform configuration.
//!
//! Every hook has a "no override" default, so the base configuration is just
//! an implementation that overrides nothing. Configuration source files
//! (`configuration.toml`) produce [`FileApplicationConfiguration`]s; code can
//! register its own implementations through
//! [`ApplicationRegistry`](crate::core::locator::ApplicationRegistry).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::build_config::BuildConfig;
use crate::core::test_filter::TestFilter;
use crate::core::variables::VariableMapping;

/// Overrides declared in the `[application]` table of a configuration source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationOverrides {
    /// Name of a registered factory to instantiate instead of using the
    /// declarative overrides directly
    pub factory: Option<String>,

    /// Include files processed before the platform's includes
    pub pre_includes: Vec<PathBuf>,

    /// Include files processed after the platform's includes
    pub post_includes: Vec<PathBuf>,

    /// Variables for every build config
    pub variables: VariableMapping,

    /// Variables for a single build config, keyed by config name
    pub config_variables: BTreeMap<String, VariableMapping>,

    pub generator_variables: VariableMapping,

    /// Environment variables set before running the generator
    pub environment: BTreeMap<String, String>,

    pub test_filters: Vec<TestFilter>,

    /// Environment variables needed by unit test binaries
    pub test_environment: BTreeMap<String, String>,

    pub default_target_build_file: Option<PathBuf>,
}

impl ApplicationOverrides {
    /// Resolve relative include and build file paths against `base`.
    pub fn rebase(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.pre_includes = self.pre_includes.into_iter().map(join).collect();
        self.post_includes = self.post_includes.into_iter().map(join).collect();
        self.default_target_build_file = self.default_target_build_file.map(join);
        self
    }
}

/// Everything an application configuration is constructed from.
#[derive(Debug, Clone, Default)]
pub struct ApplicationContext {
    /// Name of the owning platform
    pub platform_name: String,

    /// Root directory of the owning platform
    pub platform_directory: PathBuf,

    pub application_name: String,

    /// `<platform directory>/<application name>`
    pub application_path: PathBuf,

    /// Configuration source file the application was found in, if any
    pub source: Option<PathBuf>,

    pub overrides: ApplicationOverrides,
}

/// Per-application configuration overrides.
pub trait ApplicationConfiguration: Send + Sync + fmt::Debug {
    /// Application name, in its canonical filesystem-friendly form.
    fn name(&self) -> &str;

    /// Application root path.
    fn path(&self) -> &Path;

    /// Short description of where this configuration came from.
    fn kind(&self) -> &str;

    fn pre_includes(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn post_includes(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Variables that override the platform's variables.
    fn variables(&self, _config: BuildConfig) -> VariableMapping {
        VariableMapping::new()
    }

    fn generator_variables(&self, _config: BuildConfig) -> VariableMapping {
        VariableMapping::new()
    }

    fn environment_variables(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn test_filters(&self) -> Vec<TestFilter> {
        Vec::new()
    }

    fn test_env_variables(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Build file to build by default, if the application has its own.
    fn default_target_build_file(&self) -> Option<PathBuf> {
        None
    }
}

/// Configuration with no overrides.
#[derive(Debug, Clone)]
pub struct BaseApplicationConfiguration {
    context: ApplicationContext,
}

impl BaseApplicationConfiguration {
    pub fn new(context: ApplicationContext) -> Self {
        BaseApplicationConfiguration { context }
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }
}

impl ApplicationConfiguration for BaseApplicationConfiguration {
    fn name(&self) -> &str {
        &self.context.application_name
    }

    fn path(&self) -> &Path {
        &self.context.application_path
    }

    fn kind(&self) -> &str {
        "base"
    }
}

/// Configuration declared in a `configuration.toml` source file.
#[derive(Debug, Clone)]
pub struct FileApplicationConfiguration {
    context: ApplicationContext,
}

impl FileApplicationConfiguration {
    /// Relative paths in the overrides are taken relative to the directory of
    /// the source file.
    pub fn new(mut context: ApplicationContext) -> Self {
        if let Some(dir) = context.source.as_deref().and_then(Path::parent) {
            let dir = dir.to_path_buf();
            context.overrides = std::mem::take(&mut context.overrides).rebase(&dir);
        }
        FileApplicationConfiguration { context }
    }

    pub fn source(&self) -> Option<&Path> {
        self.context.source.as_deref()
    }

    fn overrides(&self) -> &ApplicationOverrides {
        &self.context.overrides
    }
}

impl ApplicationConfiguration for FileApplicationConfiguration {
    fn name(&self) -> &str {
        &self.context.application_name
    }

    fn path(&self) -> &Path {
        &self.context.application_path
    }

    fn kind(&self) -> &str {
        "file"
    }

    fn pre_includes(&self) -> Vec<PathBuf> {
        self.overrides().pre_includes.clone()
    }

    fn post_includes(&self) -> Vec<PathBuf> {
        self.overrides().post_includes.clone()
    }

    fn variables(&self, config: BuildConfig) -> VariableMapping {
        let mut vars = self.overrides().variables.clone();
        if let Some(per_config) = self.overrides().config_variables.get(config.as_str()) {
            vars.merge(per_config);
        }
        vars
    }

    fn generator_variables(&self, _config: BuildConfig) -> VariableMapping {
        self.overrides().generator_variables.clone()
    }

    fn environment_variables(&self) -> BTreeMap<String, String> {
        self.overrides().environment.clone()
    }

    fn test_filters(&self) -> Vec<TestFilter> {
        self.overrides().test_filters.clone()
    }

    fn test_env_variables(&self) -> BTreeMap<String, String> {
        self.overrides().test_environment.clone()
    }

    fn default_target_build_file(&self) -> Option<PathBuf> {
        self.overrides().default_target_build_file.clone()
    }
}
