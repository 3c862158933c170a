//! Layered resolution of a platform + application build configuration.
//!
//! The platform layer is computed first; the application layer is applied
//! on top of it:
//! - includes: application pre-includes, platform includes, application
//!   post-includes;
//! - variables, generator variables, environment: merged key by key, the
//!   application wins;
//! - test filters: platform filters followed by application filters, limited
//!   to the requested build config;
//! - default target build file: the application's, else the platform's.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::toolchain::{is_clang_toolchain, toolchain_family, Capability, Tool};
use crate::core::build_config::BuildConfig;
use crate::core::platform::PlatformConfiguration;
use crate::core::resolver::check_sanitizers;
use crate::core::test_filter::TestFilter;
use crate::core::variables::VariableMapping;

/// Options for [`resolve_build`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub config: BuildConfig,

    /// Application whose overrides are layered on top (none = platform only)
    pub application: Option<String>,

    /// Whether the legacy toolchain is Clang; used only when the platform
    /// does not provide an abstract target toolchain
    pub legacy_clang: bool,
}

/// Where the application layer came from.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub name: String,
    pub kind: String,
    pub path: PathBuf,
}

/// Everything the generator needs for one platform/config/application.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBuild {
    pub platform: String,
    pub config: BuildConfig,
    pub application: Option<ApplicationSummary>,
    pub build_format: String,
    pub build_accelerator: String,
    pub clang: bool,

    /// `None` when the generator should use its legacy toolchain
    pub target_toolchain: Option<Vec<Tool>>,
    pub host_toolchain: Option<Vec<Tool>>,

    pub includes: Vec<PathBuf>,
    pub variables: VariableMapping,
    pub generator_variables: VariableMapping,
    pub environment_variables: BTreeMap<String, String>,
    pub default_target_build_file: PathBuf,
    pub test_targets: Vec<String>,
    pub test_filters: Vec<TestFilter>,
    pub test_env_variables: BTreeMap<String, String>,
}

/// Whether the platform builds with Clang.
///
/// Uses the abstract target toolchain when the platform provides one, and
/// `legacy_clang` otherwise.
///
/// A C compiler without a `family` annotation whose name does not give its
/// family away is run once with `--version` to identify it. Annotate the
/// family in `platform.toml` to keep resolution free of process spawns.
pub fn uses_clang(platform: &PlatformConfiguration, legacy_clang: bool) -> bool {
    match platform.target_toolchain() {
        Capability::Provided(tools) => {
            tracing::debug!(
                "Target toolchain family for {}: {:?}",
                platform.name(),
                toolchain_family(&tools)
            );
            is_clang_toolchain(&tools)
        }
        Capability::NotSupported => {
            tracing::debug!(
                "{} has no abstract toolchain, using legacy toolchain",
                platform.name()
            );
            legacy_clang
        }
    }
}

/// Resolve the full configuration for a platform.
pub fn resolve_build(platform: &PlatformConfiguration, opts: &ResolveOptions) -> Result<ResolvedBuild> {
    let config = opts.config;
    let clang = uses_clang(platform, opts.legacy_clang);

    let mut variables = platform
        .variables(config, clang)
        .with_context(|| format!("failed to resolve variables for {}", platform.name()))?;
    let mut generator_variables = platform.generator_variables(config);
    let mut environment_variables = platform.environment_variables();
    let mut test_filters = platform.test_filters();
    let mut test_env_variables = platform.test_env_variables();
    let mut default_target_build_file = platform.default_target_build_file();
    let mut includes = platform.includes();
    let mut application = None;

    if let Some(name) = &opts.application {
        let app = platform.application_configuration(name).with_context(|| {
            format!(
                "failed to load application configuration for {} on {}",
                name,
                platform.name()
            )
        })?;

        let mut layered = app.pre_includes();
        layered.append(&mut includes);
        layered.extend(app.post_includes());
        includes = layered;

        variables.merge(&app.variables(config));
        check_sanitizers(&variables).with_context(|| {
            format!(
                "application {} overrides conflict on {}",
                name,
                platform.name()
            )
        })?;
        generator_variables.merge(&app.generator_variables(config));
        environment_variables.extend(app.environment_variables());
        test_filters.extend(app.test_filters());
        test_env_variables.extend(app.test_env_variables());
        if let Some(file) = app.default_target_build_file() {
            default_target_build_file = file;
        }

        application = Some(ApplicationSummary {
            name: app.name().to_string(),
            kind: app.kind().to_string(),
            path: app.path().to_path_buf(),
        });
    }

    test_filters.retain(|f| f.applies_to(config));

    Ok(ResolvedBuild {
        platform: platform.name().to_string(),
        config,
        application,
        build_format: platform.build_format().to_string(),
        build_accelerator: platform.build_accelerator().to_string(),
        clang,
        target_toolchain: platform.target_toolchain().provided(),
        host_toolchain: platform.host_toolchain().provided(),
        includes,
        variables,
        generator_variables,
        environment_variables,
        default_target_build_file,
        test_targets: platform.test_targets(),
        test_filters,
        test_env_variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::MapEnv;
    use crate::test_support::SourceTreeFixture;

    #[test]
    fn test_platform_only() {
        let tree = SourceTreeFixture::standard();
        let platform = tree.platform("linux-x64x11", tree.environment(MapEnv::new()));

        let resolved = resolve_build(&platform, &ResolveOptions::default()).unwrap();
        assert!(resolved.clang);
        assert!(resolved.application.is_none());
        assert_eq!(resolved.variables.get_int("use_asan"), Some(1));
        assert_eq!(
            resolved.includes,
            vec![tree
                .starboard_root()
                .join("linux/x64x11/gyp_configuration.gypi")]
        );
        assert_eq!(resolved.environment_variables.get("CC").map(String::as_str), Some("clang"));
        assert_eq!(resolved.test_filters.len(), 1);
        assert!(resolved.target_toolchain.is_some());
        assert!(resolved.host_toolchain.is_none());
    }

    #[test]
    fn test_application_layer_overrides_platform() {
        let tree = SourceTreeFixture::standard().with_app_config(
            "starboard/linux/x64x11",
            "cobalt",
            r#"
[application]
pre_includes = ["pre.gypi"]
post_includes = ["post.gypi"]
default_target_build_file = "cobalt/build/all.gyp"
variables = { use_asan = 0, javascript_engine = "v8" }
environment = { CC = "clang-14" }

[[application.test_filters]]
target = "renderer_test"
test = "FILTER_ALL"
config = "gold"
"#,
        );
        let platform = tree.platform("linux-x64x11", tree.environment(MapEnv::new()));
        let opts = ResolveOptions {
            config: BuildConfig::Debug,
            application: Some("cobalt".to_string()),
            legacy_clang: false,
        };

        let resolved = resolve_build(&platform, &opts).unwrap();
        let app_dir = tree.starboard_root().join("linux/x64x11/cobalt");

        assert_eq!(resolved.application.as_ref().unwrap().kind, "file");
        assert_eq!(
            resolved.includes,
            vec![
                app_dir.join("pre.gypi"),
                tree.starboard_root().join("linux/x64x11/gyp_configuration.gypi"),
                app_dir.join("post.gypi"),
            ]
        );
        assert_eq!(resolved.variables.get_int("use_asan"), Some(0));
        assert!(resolved.variables.contains_key("javascript_engine"));
        assert_eq!(
            resolved.environment_variables.get("CC").map(String::as_str),
            Some("clang-14")
        );
        assert_eq!(resolved.default_target_build_file, app_dir.join("cobalt/build/all.gyp"));
        // The gold-only application filter does not apply to debug.
        assert_eq!(resolved.test_filters.len(), 1);
    }

    #[test]
    fn test_legacy_toolchain_uses_caller_flag() {
        let tree = SourceTreeFixture::standard();
        let env = tree.environment(MapEnv::new().with("USE_TSAN", "1"));
        let platform = tree.platform("raspi-2", env);

        let gcc = resolve_build(&platform, &ResolveOptions::default()).unwrap();
        assert!(!gcc.clang);
        assert_eq!(gcc.variables.get_int("use_tsan"), Some(0));

        let opts = ResolveOptions {
            legacy_clang: true,
            ..Default::default()
        };
        let clang = resolve_build(&platform, &opts).unwrap();
        assert!(clang.clang);
        assert_eq!(clang.variables.get_int("use_tsan"), Some(1));
        assert!(clang.target_toolchain.is_none());
    }

    #[test]
    fn test_conflict_stops_resolution() {
        let tree = SourceTreeFixture::standard();
        let env = tree.environment(MapEnv::new().with("USE_ASAN", "1").with("USE_TSAN", "1"));
        let platform = tree.platform("linux-x64x11", env);

        let err = resolve_build(&platform, &ResolveOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("mutually exclusive"));
    }

    #[test]
    fn test_application_cannot_enable_conflicting_sanitizers() {
        let tree = SourceTreeFixture::standard().with_app_config(
            "starboard/linux/x64x11",
            "cobalt",
            "[application]\nvariables = { use_tsan = 1 }\n",
        );
        let platform = tree.platform("linux-x64x11", tree.environment(MapEnv::new()));
        let opts = ResolveOptions {
            config: BuildConfig::Debug,
            application: Some("cobalt".to_string()),
            legacy_clang: false,
        };

        let err = resolve_build(&platform, &opts).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("application cobalt overrides conflict on linux-x64x11"));
        assert!(message.contains("mutually exclusive"));
    }

    #[test]
    fn test_application_can_swap_asan_for_tsan() {
        let tree = SourceTreeFixture::standard().with_app_config(
            "starboard/linux/x64x11",
            "cobalt",
            "[application]\nvariables = { use_asan = 0, use_tsan = 1 }\n",
        );
        let platform = tree.platform("linux-x64x11", tree.environment(MapEnv::new()));
        let opts = ResolveOptions {
            config: BuildConfig::Debug,
            application: Some("cobalt".to_string()),
            legacy_clang: false,
        };

        let resolved = resolve_build(&platform, &opts).unwrap();
        assert_eq!(resolved.variables.get_int("use_asan"), Some(0));
        assert_eq!(resolved.variables.get_int("use_tsan"), Some(1));
    }

    #[test]
    fn test_serializes_to_json() {
        let tree = SourceTreeFixture::standard();
        let platform = tree.platform("raspi-2", tree.environment(MapEnv::new()));
        let resolved = resolve_build(&platform, &ResolveOptions::default()).unwrap();

        let json: serde_json::Value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["platform"], "raspi-2");
        assert_eq!(json["config"], "debug");
        assert_eq!(json["variables"]["cobalt_config"], "debug");
        assert!(json["target_toolchain"].is_null());
    }
}
