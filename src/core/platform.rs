//! Platform configuration: the entry point a generator talks to.
//!
//! A [`PlatformConfiguration`] owns the application search path and the
//! cached application configuration. It delegates everything platform-specific
//! to a [`PlatformDefinition`] (the leaf platform).
//!
//! # Application configuration cache
//!
//! The application configuration is resolved on first request and cached for
//! the lifetime of the platform configuration. The cache is not keyed by
//! application name: after the first call, every call returns the same
//! instance whatever name it is given. Use one platform configuration per
//! application.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::builder::accelerator::{select_build_accelerator, AcceleratorKind};
use crate::builder::descriptor::DescriptorPlatform;
use crate::builder::toolchain::{Capability, Tool};
use crate::core::application::ApplicationConfiguration;
use crate::core::build_config::BuildConfig;
use crate::core::environment::Environment;
use crate::core::errors::{ConfigError, Result};
use crate::core::locator::locate_application;
use crate::core::registry::PlatformInfo;
use crate::core::resolver::{resolve_variables, ResolverInput};
use crate::core::sabi::DEFAULT_SABI_JSON_PATH;
use crate::core::search_path::SearchPath;
use crate::core::test_filter::TestFilter;
use crate::core::variables::VariableMapping;

/// Test targets every platform runs.
pub const BASE_TEST_TARGETS: &[&str] = &[
    "app_key_files_test",
    "app_key_test",
    "drain_file_test",
    "elf_loader_test",
    "installation_manager_test",
    "nplb",
    "nplb_blitter_pixel_tests",
    "player_filter_tests",
    "slot_management_test",
    "starboard_platform_tests",
];

/// Build file built when no target is named.
pub const DEFAULT_TARGET_BUILD_FILE: &str = "starboard_all.gyp";

/// Platform-specific data supplied by a leaf platform.
///
/// Every method has a default; a leaf overrides what it knows. Toolchains
/// default to [`Capability::NotSupported`] (use the legacy toolchain); deploy
/// path patterns default to `NotSupported` too, but the platform configuration
/// turns that into a hard error.
pub trait PlatformDefinition: Send + Sync + fmt::Debug {
    /// ABI descriptor path, complete or templated on the API version.
    fn sabi_json_path(&self) -> String {
        DEFAULT_SABI_JSON_PATH.to_string()
    }

    fn build_format(&self) -> &str {
        "ninja"
    }

    fn target_toolchain(&self) -> Capability<Vec<Tool>> {
        Capability::NotSupported
    }

    fn host_toolchain(&self) -> Capability<Vec<Tool>> {
        Capability::NotSupported
    }

    /// Wildcard patterns, relative to the product directory, of files needed
    /// to run target executables.
    fn deploy_path_patterns(&self) -> Capability<Vec<String>> {
        Capability::NotSupported
    }

    /// Environment variable overrides applied before running the generator.
    fn environment_variables(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn test_env_variables(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn test_filters(&self) -> Vec<TestFilter> {
        Vec::new()
    }

    /// Directory holding the platform's launcher, when it is not the
    /// platform directory.
    fn launcher_path(&self) -> Option<PathBuf> {
        None
    }

    /// Install tools and SDKs needed to build for the platform.
    fn setup_platform_tools(&self, _build_number: u64) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Leaf platform that overrides nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePlatform;

impl PlatformDefinition for BasePlatform {}

/// Build configuration for one platform.
pub struct PlatformConfiguration {
    name: String,
    directory: PathBuf,
    search_path: SearchPath,
    asan_default: bool,
    build_accelerator: String,
    definition: Box<dyn PlatformDefinition>,
    environment: Arc<Environment>,
    application: OnceLock<Box<dyn ApplicationConfiguration>>,
}

impl PlatformConfiguration {
    /// Create a configuration rooted at `<starboard root>/build`, backed by
    /// [`BasePlatform`].
    ///
    /// Probes the environment's build accelerator.
    pub fn new(name: impl Into<String>, environment: Arc<Environment>) -> Self {
        let directory = environment.starboard_root().join("build");
        let build_accelerator =
            select_build_accelerator(environment.accelerator(), environment.vars());

        PlatformConfiguration {
            name: name.into(),
            search_path: SearchPath::new(directory.clone()),
            directory,
            asan_default: false,
            build_accelerator,
            definition: Box::new(BasePlatform),
            environment,
            application: OnceLock::new(),
        }
    }

    /// Create a configuration for a discovered platform.
    pub fn from_info(info: &PlatformInfo, environment: Arc<Environment>) -> Self {
        Self::new(info.name.clone(), environment)
            .with_directory(info.path.clone())
            .with_asan_enabled_by_default(info.descriptor.asan_enabled_by_default)
            .with_definition(DescriptorPlatform::new(
                info.descriptor.clone(),
                info.path.clone(),
            ))
    }

    pub fn with_definition(mut self, definition: impl PlatformDefinition + 'static) -> Self {
        self.definition = Box::new(definition);
        self
    }

    pub fn with_asan_enabled_by_default(mut self, enabled: bool) -> Self {
        self.asan_default = enabled;
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.set_directory(directory);
        self
    }

    /// Platform name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root directory of the platform configuration.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Rebind the root directory.
    ///
    /// The old directory's search-path entry is replaced in place; if it was
    /// no longer on the search path, the new directory goes first.
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        let directory = directory.into();
        self.search_path.replace(&self.directory, directory.clone());
        self.directory = directory;
    }

    /// Append a directory to search for application configurations.
    pub fn append_application_configuration_path(&mut self, path: impl Into<PathBuf>) {
        self.search_path.push(path);
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn definition(&self) -> &dyn PlatformDefinition {
        self.definition.as_ref()
    }

    pub fn asan_enabled_by_default(&self) -> bool {
        self.asan_default
    }

    /// Application configuration for this platform, resolved once.
    ///
    /// The first call decides the configuration; later calls return the same
    /// instance regardless of `application_name`. A failed resolution is not
    /// cached.
    pub fn application_configuration(
        &self,
        application_name: &str,
    ) -> Result<&dyn ApplicationConfiguration> {
        if let Some(cached) = self.application.get() {
            if cached.name() != application_name {
                tracing::debug!(
                    "Application configuration already resolved for {}, ignoring {}",
                    cached.name(),
                    application_name
                );
            }
            return Ok(cached.as_ref());
        }

        let resolved = locate_application(self, application_name)?;
        Ok(self.application.get_or_init(|| resolved).as_ref())
    }

    /// Name of the build accelerator selected at construction, or empty.
    pub fn build_accelerator(&self) -> &str {
        &self.build_accelerator
    }

    /// Probe another build accelerator.
    pub fn select_build_accelerator(&self, kind: AcceleratorKind) -> String {
        select_build_accelerator(kind, self.environment.vars())
    }

    pub fn build_format(&self) -> &str {
        self.definition.build_format()
    }

    /// Generator include files, in order.
    ///
    /// Empty when the platform is not in the platform registry.
    pub fn includes(&self) -> Vec<PathBuf> {
        match self.environment.platforms().get(&self.name) {
            Some(info) => vec![info.include_file()],
            None => {
                tracing::debug!("Platform {} is not registered; no includes", self.name);
                Vec::new()
            }
        }
    }

    /// Generator variables for `config`.
    ///
    /// Fails if the requested instrumentation is contradictory.
    pub fn variables(&self, config: BuildConfig, use_clang: bool) -> Result<VariableMapping> {
        let input = ResolverInput {
            config,
            use_clang,
            asan_default: self.asan_default,
            sabi_json_path: self.definition.sabi_json_path(),
            sabi_api_version: self.environment.sabi_api_version(),
        };
        resolve_variables(&input, self.environment.vars())
    }

    /// Generator-specific variables. The platform layer defines none.
    pub fn generator_variables(&self, _config: BuildConfig) -> VariableMapping {
        VariableMapping::new()
    }

    pub fn environment_variables(&self) -> BTreeMap<String, String> {
        self.definition.environment_variables()
    }

    pub fn sabi_json_path(&self) -> String {
        self.definition.sabi_json_path()
    }

    /// Target toolchain; `NotSupported` means use the legacy toolchain.
    pub fn target_toolchain(&self) -> Capability<Vec<Tool>> {
        self.definition.target_toolchain()
    }

    /// Host toolchain; `NotSupported` means use the legacy toolchain.
    pub fn host_toolchain(&self) -> Capability<Vec<Tool>> {
        self.definition.host_toolchain()
    }

    /// Deployment path patterns. Every platform that deploys must supply
    /// them; there is no fallback.
    pub fn deploy_path_patterns(&self) -> Result<Vec<String>> {
        match self.definition.deploy_path_patterns() {
            Capability::Provided(patterns) => Ok(patterns),
            Capability::NotSupported => Err(ConfigError::Unimplemented {
                platform: self.name.clone(),
                operation: "deploy_path_patterns",
            }),
        }
    }

    pub fn launcher_path(&self) -> PathBuf {
        self.definition
            .launcher_path()
            .unwrap_or_else(|| self.directory.clone())
    }

    pub fn setup_platform_tools(&self, build_number: u64) -> anyhow::Result<()> {
        self.definition.setup_platform_tools(build_number)
    }

    pub fn test_env_variables(&self) -> BTreeMap<String, String> {
        self.definition.test_env_variables()
    }

    pub fn test_filters(&self) -> Vec<TestFilter> {
        self.definition.test_filters()
    }

    /// Base test targets followed by the environment's optional targets.
    pub fn test_targets(&self) -> Vec<String> {
        BASE_TEST_TARGETS
            .iter()
            .map(|t| t.to_string())
            .chain(self.environment.optional_test_targets().iter().cloned())
            .collect()
    }

    pub fn default_target_build_file(&self) -> PathBuf {
        self.environment
            .starboard_root()
            .join(DEFAULT_TARGET_BUILD_FILE)
    }
}

impl fmt::Debug for PlatformConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfiguration")
            .field("name", &self.name)
            .field("directory", &self.directory)
            .field("search_path", &self.search_path)
            .field("asan_default", &self.asan_default)
            .field("build_accelerator", &self.build_accelerator)
            .field("definition", &self.definition)
            .field("application", &self.application.get().map(|a| a.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::ToolKind;
    use crate::core::environment::MapEnv;
    use crate::core::registry::PlatformRegistry;
    use crate::test_support::{write_app_config, write_platform};

    fn env() -> Arc<Environment> {
        Arc::new(Environment::new(MapEnv::new()).with_starboard_root("/src/starboard"))
    }

    #[test]
    fn test_defaults() {
        let platform = PlatformConfiguration::new("stub", env());
        assert_eq!(platform.name(), "stub");
        assert_eq!(platform.directory(), Path::new("/src/starboard/build"));
        assert_eq!(platform.search_path().as_slice(), &[PathBuf::from("/src/starboard/build")]);
        assert_eq!(platform.build_accelerator(), "");
        assert_eq!(platform.build_format(), "ninja");
        assert_eq!(platform.sabi_json_path(), DEFAULT_SABI_JSON_PATH);
        assert_eq!(platform.launcher_path(), PathBuf::from("/src/starboard/build"));
        assert_eq!(
            platform.default_target_build_file(),
            PathBuf::from("/src/starboard/starboard_all.gyp")
        );
        assert!(platform.generator_variables(BuildConfig::Debug).is_empty());
        assert!(platform.setup_platform_tools(1).is_ok());
    }

    #[test]
    fn test_set_directory_preserves_position() {
        let mut platform = PlatformConfiguration::new("stub", env());
        platform.append_application_configuration_path("/extra/a");
        platform.append_application_configuration_path("/extra/b");
        let before: Vec<_> = platform.search_path().as_slice().to_vec();

        platform.set_directory("/src/starboard/stub");

        let after = platform.search_path().as_slice();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0], PathBuf::from("/src/starboard/stub"));
        assert_eq!(&after[1..], &before[1..]);
        assert_eq!(platform.directory(), Path::new("/src/starboard/stub"));
    }

    #[test]
    fn test_application_configuration_is_cached() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_app_config(tmp.path(), "cobalt", "[application]\n");
        let platform = PlatformConfiguration::new("stub", env()).with_directory(tmp.path());

        let first = platform.application_configuration("cobalt").unwrap();
        let second = platform.application_configuration("something_else").unwrap();

        assert!(std::ptr::eq(
            first as *const dyn ApplicationConfiguration as *const u8,
            second as *const dyn ApplicationConfiguration as *const u8,
        ));
        assert_eq!(second.name(), "cobalt");
        assert_eq!(second.kind(), "file");
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_app_config(tmp.path(), "broken", "[application\n");
        let platform = PlatformConfiguration::new("stub", env()).with_directory(tmp.path());

        assert!(platform.application_configuration("broken").is_err());
        let app = platform.application_configuration("cobalt").unwrap();
        assert_eq!(app.kind(), "base");
    }

    #[test]
    fn test_variables_scenarios() {
        let platform = PlatformConfiguration::new("stub", env()).with_asan_enabled_by_default(true);

        let debug = platform.variables(BuildConfig::Debug, true).unwrap();
        assert_eq!(debug.get_int("use_asan"), Some(1));
        assert_eq!(debug.get_int("use_tsan"), Some(0));
        assert_eq!(debug.get_int("use_source_code_coverage"), Some(0));

        let gold = platform.variables(BuildConfig::Gold, true).unwrap();
        assert_eq!(gold.get_int("use_asan"), Some(0));
    }

    #[test]
    fn test_variables_conflict_is_fatal() {
        let env = Arc::new(Environment::new(
            MapEnv::new().with("USE_ASAN", "1").with("USE_TSAN", "1"),
        ));
        let platform = PlatformConfiguration::new("stub", env);
        let err = platform.variables(BuildConfig::Debug, true).unwrap_err();
        assert!(matches!(err, ConfigError::MutuallyExclusive { .. }));
    }

    #[test]
    fn test_includes_for_known_and_unknown_platform() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_platform(tmp.path(), "linux/x64x11", "name = \"linux-x64x11\"\n");
        let env = Arc::new(
            Environment::new(MapEnv::new())
                .with_platforms(PlatformRegistry::discover(&[tmp.path()])),
        );

        let known = PlatformConfiguration::new("linux-x64x11", Arc::clone(&env));
        assert_eq!(
            known.includes(),
            vec![tmp.path().join("linux/x64x11/gyp_configuration.gypi")]
        );

        let unknown = PlatformConfiguration::new("nowhere", env);
        assert!(unknown.includes().is_empty());
    }

    #[test]
    fn test_toolchains_and_deploy_patterns_of_base_platform() {
        let platform = PlatformConfiguration::new("stub", env());
        assert_eq!(platform.target_toolchain(), Capability::NotSupported);
        assert_eq!(platform.host_toolchain(), Capability::NotSupported);

        let err = platform.deploy_path_patterns().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Unimplemented { ref platform, operation: "deploy_path_patterns" } if platform == "stub"
        ));
    }

    #[test]
    fn test_from_info_uses_descriptor() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_platform(
            tmp.path(),
            "raspi/2",
            r#"
name = "raspi-2"
asan_enabled_by_default = true
sabi_json_path = "starboard/sabi/arm/hardfp/sabi-v{sb_api_version}.json"
deploy_path_patterns = ["*.so"]

[[toolchain.host]]
kind = "cxx-compiler"
path = "g++"
"#,
        );
        let env = Arc::new(
            Environment::new(MapEnv::new())
                .with_platforms(PlatformRegistry::discover(&[tmp.path()]))
                .with_sabi_api_version(14),
        );
        let info = env.platforms().get("raspi-2").unwrap().clone();
        let platform = PlatformConfiguration::from_info(&info, Arc::clone(&env));

        assert_eq!(platform.directory(), tmp.path().join("raspi/2"));
        assert_eq!(platform.search_path().as_slice(), &[tmp.path().join("raspi/2")]);
        assert!(platform.asan_enabled_by_default());
        assert_eq!(platform.deploy_path_patterns().unwrap(), vec!["*.so"]);
        assert_eq!(
            platform.host_toolchain().provided().unwrap()[0].kind,
            ToolKind::CxxCompiler
        );

        let vars = platform.variables(BuildConfig::Qa, false).unwrap();
        assert_eq!(
            vars.get("sabi_json_path").and_then(|v| v.as_str()),
            Some("starboard/sabi/arm/hardfp/sabi-v14.json")
        );
    }

    #[test]
    fn test_test_targets_append_optional() {
        let env = Arc::new(
            Environment::new(MapEnv::new())
                .with_optional_test_targets(vec!["nplb".to_string(), "extra_test".to_string()]),
        );
        let platform = PlatformConfiguration::new("stub", env);
        let targets = platform.test_targets();

        assert_eq!(targets.len(), BASE_TEST_TARGETS.len() + 2);
        assert_eq!(targets[0], "app_key_files_test");
        assert_eq!(&targets[BASE_TEST_TARGETS.len()..], &["nplb", "extra_test"]);
    }
}
