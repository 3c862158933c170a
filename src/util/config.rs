//! Configuration file support for sbconf.
//!
//! sbconf supports two configuration file locations:
//! - Global: `~/.sbconf/config.toml` - User-wide defaults
//! - Project: `.sbconf/config.toml` - Source-tree specific overrides
//!
//! Project config takes precedence over global config. Relative paths in a
//! file are taken relative to the directory holding its `.sbconf` directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::accelerator::AcceleratorKind;
use crate::core::environment::{EnvSource, Environment};
use crate::core::registry::PlatformRegistry;
use crate::core::sabi::SB_API_VERSION;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".sbconf";

/// sbconf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source tree layout
    pub paths: PathsConfig,

    /// ABI descriptor settings
    pub sabi: SabiConfig,

    /// Unit test settings
    pub tests: TestsConfig,

    /// Build settings
    pub build: BuildSettings,
}

/// Source tree layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the Starboard sources (default: `starboard`)
    pub starboard_root: Option<PathBuf>,

    /// Directories searched for `platform.toml` descriptors
    /// (default: the Starboard root)
    pub platform_roots: Vec<PathBuf>,

    /// Extra directories searched for application configurations, after the
    /// platform directory
    pub application_search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SabiConfig {
    /// Starboard API version substituted into ABI descriptor paths
    pub api_version: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    /// Test targets appended to every platform's base list
    pub optional_targets: Vec<String>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Build accelerator to probe (ccache, sccache)
    pub accelerator: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Resolve relative paths against `base`.
    pub fn rebase(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.paths.starboard_root = self.paths.starboard_root.map(join);
        self.paths.platform_roots = self.paths.platform_roots.into_iter().map(join).collect();
        self.paths.application_search_paths = self
            .paths
            .application_search_paths
            .into_iter()
            .map(join)
            .collect();
        self
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.paths.starboard_root.is_some() {
            self.paths.starboard_root = other.paths.starboard_root;
        }
        if !other.paths.platform_roots.is_empty() {
            self.paths.platform_roots = other.paths.platform_roots;
        }
        if !other.paths.application_search_paths.is_empty() {
            self.paths.application_search_paths = other.paths.application_search_paths;
        }

        if other.sabi.api_version.is_some() {
            self.sabi.api_version = other.sabi.api_version;
        }

        if !other.tests.optional_targets.is_empty() {
            self.tests.optional_targets = other.tests.optional_targets;
        }

        if other.build.accelerator.is_some() {
            self.build.accelerator = other.build.accelerator;
        }
    }

    pub fn starboard_root(&self) -> PathBuf {
        self.paths
            .starboard_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("starboard"))
    }

    /// Platform roots, defaulting to the Starboard root.
    pub fn platform_roots(&self) -> Vec<PathBuf> {
        if self.paths.platform_roots.is_empty() {
            vec![self.starboard_root()]
        } else {
            self.paths.platform_roots.clone()
        }
    }

    pub fn sabi_api_version(&self) -> u32 {
        self.sabi.api_version.unwrap_or(SB_API_VERSION)
    }

    /// Parse the accelerator from its config string. Unknown names fall back
    /// to the default with a warning.
    pub fn accelerator(&self) -> AcceleratorKind {
        match self.build.accelerator.as_deref() {
            None => AcceleratorKind::default(),
            Some(name) => name.parse().unwrap_or_else(|e: String| {
                tracing::warn!("{}; using {}", e, AcceleratorKind::default());
                AcceleratorKind::default()
            }),
        }
    }

    /// Build the environment this configuration describes.
    ///
    /// Platforms are discovered under the platform roots.
    pub fn environment(&self, vars: impl EnvSource + 'static) -> Environment {
        Environment::new(vars)
            .with_starboard_root(self.starboard_root())
            .with_platforms(PlatformRegistry::discover(&self.platform_roots()))
            .with_sabi_api_version(self.sabi_api_version())
            .with_optional_test_targets(self.tests.optional_targets.clone())
            .with_accelerator(self.accelerator())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sbconf/config.toml)
/// 2. Global config (~/.sbconf/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            let global = Config::load_or_default(global_path);
            config.merge(global.rebase(&config_base(global_path)));
        }
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project.rebase(&config_base(project_path)));
    }

    config
}

/// Directory relative config paths resolve against: the parent of the
/// `.sbconf` directory, or the file's own directory for a file elsewhere.
fn config_base(path: &Path) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    match dir.file_name() {
        Some(name) if name == CONFIG_DIR => dir.parent().unwrap_or(dir).to_path_buf(),
        _ => dir.to_path_buf(),
    }
}

/// Get the global sbconf config directory (~/.sbconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.sbconf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.sbconf/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::MapEnv;
    use crate::test_support::write_platform;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.starboard_root(), PathBuf::from("starboard"));
        assert_eq!(config.platform_roots(), vec![PathBuf::from("starboard")]);
        assert_eq!(config.sabi_api_version(), SB_API_VERSION);
        assert_eq!(config.accelerator(), AcceleratorKind::Ccache);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[paths]
starboard_root = "/src/starboard"
application_search_paths = ["/src/cobalt/build"]

[sabi]
api_version = 14

[tests]
optional_targets = ["renderer_test"]

[build]
accelerator = "sccache"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.starboard_root(), PathBuf::from("/src/starboard"));
        assert_eq!(config.platform_roots(), vec![PathBuf::from("/src/starboard")]);
        assert_eq!(config.sabi_api_version(), 14);
        assert_eq!(config.tests.optional_targets, vec!["renderer_test"]);
        assert_eq!(config.accelerator(), AcceleratorKind::Sccache);
    }

    #[test]
    fn test_unknown_accelerator_falls_back() {
        let mut config = Config::default();
        config.build.accelerator = Some("distcc".to_string());
        assert_eq!(config.accelerator(), AcceleratorKind::Ccache);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.paths.starboard_root = Some(PathBuf::from("/global/starboard"));
        base.sabi.api_version = Some(12);

        let mut override_cfg = Config::default();
        override_cfg.sabi.api_version = Some(14);

        base.merge(override_cfg);

        assert_eq!(base.sabi_api_version(), 14);
        assert_eq!(base.starboard_root(), PathBuf::from("/global/starboard")); // Not overridden
    }

    #[test]
    fn test_project_overrides_global_and_rebases() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let global_path = home.path().join(".sbconf/config.toml");
        let project_path = project_config_path(project.path());
        std::fs::create_dir_all(global_path.parent().unwrap()).unwrap();
        std::fs::create_dir_all(project_path.parent().unwrap()).unwrap();
        std::fs::write(&global_path, "[sabi]\napi_version = 12\n[build]\naccelerator = \"sccache\"\n").unwrap();
        std::fs::write(&project_path, "[paths]\nstarboard_root = \"starboard\"\n[sabi]\napi_version = 15\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.sabi_api_version(), 15);
        assert_eq!(config.accelerator(), AcceleratorKind::Sccache);
        assert_eq!(config.starboard_root(), project.path().join("starboard"));
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let project_path = project_config_path(tmp.path());
        std::fs::create_dir_all(project_path.parent().unwrap()).unwrap();
        std::fs::write(&project_path, "[sabi\n").unwrap();

        let config = load_config(None, &project_path);
        assert_eq!(config.sabi_api_version(), SB_API_VERSION);
    }

    #[test]
    fn test_environment_discovers_platforms() {
        let tmp = TempDir::new().unwrap();
        write_platform(&tmp.path().join("starboard"), "linux/x64x11", "name = \"linux-x64x11\"\n");
        let mut config = Config::default();
        config.paths.starboard_root = Some(tmp.path().join("starboard"));
        config.tests.optional_targets = vec!["extra_test".to_string()];

        let env = config.environment(MapEnv::new());
        assert!(env.platforms().get("linux-x64x11").is_some());
        assert_eq!(env.starboard_root(), tmp.path().join("starboard"));
        assert_eq!(env.optional_test_targets(), &["extra_test".to_string()]);
    }
}
