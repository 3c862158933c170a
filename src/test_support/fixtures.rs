//! Test fixtures for common test scenarios.
//!
//! [`SourceTreeFixture`] lays out a miniature Starboard source tree:
//! platform descriptors under `starboard/`, application configuration
//! sources next to them or in extra search directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::core::environment::{Environment, MapEnv};
use crate::core::platform::PlatformConfiguration;
use crate::core::registry::PlatformRegistry;

use super::{write_app_config, write_platform};

/// Descriptor of a Clang platform with deploy patterns.
pub const CLANG_PLATFORM: &str = r#"
name = "linux-x64x11"
asan_enabled_by_default = true
sabi_json_path = "starboard/sabi/x64/sysv/sabi-v{sb_api_version}.json"
deploy_path_patterns = ["*.so", "content/**/*"]

[environment]
CC = "clang"

[[test_filters]]
target = "nplb"
test = "SbSocketTest.Connect"

[[toolchain.target]]
kind = "c-compiler"
path = "clang"
family = "clang"
"#;

/// Descriptor of a platform that relies on the legacy toolchain.
pub const LEGACY_PLATFORM: &str = r#"
name = "raspi-2"
"#;

/// A temporary source tree.
pub struct SourceTreeFixture {
    dir: TempDir,
}

impl SourceTreeFixture {
    /// Create an empty tree with a `starboard/` directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("starboard")).unwrap();
        SourceTreeFixture { dir }
    }

    /// Tree with [`CLANG_PLATFORM`] at `starboard/linux/x64x11` and
    /// [`LEGACY_PLATFORM`] at `starboard/raspi/2`.
    pub fn standard() -> Self {
        Self::new()
            .with_platform("linux/x64x11", CLANG_PLATFORM)
            .with_platform("raspi/2", LEGACY_PLATFORM)
    }

    pub fn with_platform(self, relative: &str, descriptor: &str) -> Self {
        write_platform(&self.starboard_root(), relative, descriptor);
        self
    }

    /// Add `configuration.toml` for `application` under `dir` (relative to the
    /// tree root).
    pub fn with_app_config(self, dir: &str, application: &str, contents: &str) -> Self {
        write_app_config(&self.root().join(dir), application, contents);
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn starboard_root(&self) -> PathBuf {
        self.root().join("starboard")
    }

    /// Environment over this tree with the given variables.
    pub fn environment(&self, vars: MapEnv) -> Environment {
        Environment::new(vars)
            .with_starboard_root(self.starboard_root())
            .with_platforms(PlatformRegistry::discover(&[self.starboard_root()]))
    }

    /// Platform configuration for a discovered platform.
    pub fn platform(&self, name: &str, env: Environment) -> PlatformConfiguration {
        let env = Arc::new(env);
        let info = env.platforms().get(name).cloned().unwrap();
        PlatformConfiguration::from_info(&info, env)
    }
}

impl Default for SourceTreeFixture {
    fn default() -> Self {
        Self::new()
    }
}
