//! Declarative leaf platforms read from `platform.toml`.
//!
//! ```toml
//! name = "linux-x64x11"
//! asan_enabled_by_default = true
//! sabi_json_path = "starboard/sabi/x64/sysv/sabi-v{sb_api_version}.json"
//! deploy_path_patterns = ["*.so", "content/*"]
//!
//! [environment]
//! CC = "clang"
//!
//! [[toolchain.target]]
//! kind = "c-compiler"
//! path = "clang"
//! family = "clang"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{Capability, Tool};
use crate::core::errors::{ConfigError, Result};
use crate::core::platform::PlatformDefinition;
use crate::core::sabi::DEFAULT_SABI_JSON_PATH;
use crate::core::test_filter::TestFilter;

/// File name of a platform descriptor.
pub const PLATFORM_FILE: &str = "platform.toml";

/// Toolchains declared by a descriptor. A missing list means the platform
/// relies on the generator's legacy toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSection {
    pub target: Option<Vec<Tool>>,
    pub host: Option<Vec<Tool>>,
}

/// Contents of a `platform.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformDescriptor {
    pub name: String,
    pub asan_enabled_by_default: bool,
    pub sabi_json_path: Option<String>,
    pub build_format: Option<String>,
    pub deploy_path_patterns: Option<Vec<String>>,
    pub launcher_path: Option<PathBuf>,
    pub environment: BTreeMap<String, String>,
    pub test_environment: BTreeMap<String, String>,
    pub test_filters: Vec<TestFilter>,
    pub toolchain: ToolchainSection,
}

impl PlatformDescriptor {
    /// Load a descriptor from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parse descriptor contents; `path` is only used for error reporting.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Leaf platform backed by a [`PlatformDescriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorPlatform {
    descriptor: PlatformDescriptor,
    directory: PathBuf,
}

impl DescriptorPlatform {
    /// `directory` is where the descriptor lives; relative launcher paths are
    /// resolved against it.
    pub fn new(descriptor: PlatformDescriptor, directory: impl Into<PathBuf>) -> Self {
        DescriptorPlatform {
            descriptor,
            directory: directory.into(),
        }
    }

    pub fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }
}

fn toolchain_capability(tools: &Option<Vec<Tool>>) -> Capability<Vec<Tool>> {
    match tools {
        Some(tools) => Capability::Provided(tools.clone()),
        None => Capability::NotSupported,
    }
}

impl PlatformDefinition for DescriptorPlatform {
    fn sabi_json_path(&self) -> String {
        self.descriptor
            .sabi_json_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SABI_JSON_PATH.to_string())
    }

    fn build_format(&self) -> &str {
        self.descriptor.build_format.as_deref().unwrap_or("ninja")
    }

    fn target_toolchain(&self) -> Capability<Vec<Tool>> {
        toolchain_capability(&self.descriptor.toolchain.target)
    }

    fn host_toolchain(&self) -> Capability<Vec<Tool>> {
        toolchain_capability(&self.descriptor.toolchain.host)
    }

    fn deploy_path_patterns(&self) -> Capability<Vec<String>> {
        match &self.descriptor.deploy_path_patterns {
            Some(patterns) => Capability::Provided(patterns.clone()),
            None => Capability::NotSupported,
        }
    }

    fn environment_variables(&self) -> BTreeMap<String, String> {
        self.descriptor.environment.clone()
    }

    fn test_env_variables(&self) -> BTreeMap<String, String> {
        self.descriptor.test_environment.clone()
    }

    fn test_filters(&self) -> Vec<TestFilter> {
        self.descriptor.test_filters.clone()
    }

    fn launcher_path(&self) -> Option<PathBuf> {
        self.descriptor
            .launcher_path
            .as_ref()
            .map(|p| self.directory.join(p))
    }
}
