//! Environment collaborators shared by platform configurations.
//!
//! Wraps everything a platform configuration consults outside itself:
//! environment variables, the application factory registry, the registry of
//! known platforms, repository paths, and the optional test target list.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::accelerator::AcceleratorKind;
use crate::core::errors::{ConfigError, Result};
use crate::core::locator::ApplicationRegistry;
use crate::core::registry::PlatformRegistry;
use crate::core::sabi::SB_API_VERSION;

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    /// Look up a variable.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        MapEnv {
            vars: HashMap::new(),
        }
    }

    /// Set a variable.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Read an integer toggle, falling back to `default` when unset.
pub fn read_toggle(env: &dyn EnvSource, key: &str, default: i64) -> Result<i64> {
    match env.var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidToggle {
                var: key.to_string(),
                value: raw,
            }),
    }
}

/// Shared, read-only resolution environment.
#[derive(Clone)]
pub struct Environment {
    vars: Arc<dyn EnvSource>,
    applications: ApplicationRegistry,
    platforms: PlatformRegistry,
    starboard_root: PathBuf,
    sabi_api_version: u32,
    optional_test_targets: Vec<String>,
    accelerator: AcceleratorKind,
}

impl Environment {
    /// Create an environment over the given variable source with empty
    /// registries.
    pub fn new(vars: impl EnvSource + 'static) -> Self {
        Environment {
            vars: Arc::new(vars),
            applications: ApplicationRegistry::new(),
            platforms: PlatformRegistry::new(),
            starboard_root: PathBuf::from("starboard"),
            sabi_api_version: SB_API_VERSION,
            optional_test_targets: Vec::new(),
            accelerator: AcceleratorKind::default(),
        }
    }

    /// Environment backed by the process environment.
    pub fn from_process() -> Self {
        Self::new(ProcessEnv)
    }

    pub fn with_applications(mut self, applications: ApplicationRegistry) -> Self {
        self.applications = applications;
        self
    }

    pub fn with_platforms(mut self, platforms: PlatformRegistry) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_starboard_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.starboard_root = root.into();
        self
    }

    pub fn with_sabi_api_version(mut self, version: u32) -> Self {
        self.sabi_api_version = version;
        self
    }

    pub fn with_optional_test_targets(mut self, targets: Vec<String>) -> Self {
        self.optional_test_targets = targets;
        self
    }

    pub fn with_accelerator(mut self, accelerator: AcceleratorKind) -> Self {
        self.accelerator = accelerator;
        self
    }

    pub fn vars(&self) -> &dyn EnvSource {
        self.vars.as_ref()
    }

    pub fn applications(&self) -> &ApplicationRegistry {
        &self.applications
    }

    pub fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    pub fn starboard_root(&self) -> &Path {
        &self.starboard_root
    }

    pub fn sabi_api_version(&self) -> u32 {
        self.sabi_api_version
    }

    pub fn optional_test_targets(&self) -> &[String] {
        &self.optional_test_targets
    }

    /// Accelerator probed when a platform configuration is constructed.
    pub fn accelerator(&self) -> AcceleratorKind {
        self.accelerator
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("applications", &self.applications)
            .field("platforms", &self.platforms)
            .field("starboard_root", &self.starboard_root)
            .field("sabi_api_version", &self.sabi_api_version)
            .field("optional_test_targets", &self.optional_test_targets)
            .field("accelerator", &self.accelerator)
            .finish_non_exhaustive()
    }
}
