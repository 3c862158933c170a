//! Build variable resolution.
//!
//! Computes the instrumentation flags (ASAN, TSAN, source-based code
//! coverage) from environment toggles and platform defaults, and assembles
//! the variable mapping handed to the generator.
//!
//! Policy:
//! - instrumentation is only considered for Clang-family toolchains; for any
//!   other toolchain the environment is not consulted at all;
//! - coverage wins over TSAN (TSAN is silently dropped);
//! - ASAN defaults to the platform default only for debug and devel builds
//!   without TSAN or coverage;
//! - ASAN together with TSAN is a configuration error.

use crate::core::build_config::BuildConfig;
use crate::core::environment::{read_toggle, EnvSource};
use crate::core::errors::{ConfigError, Result};
use crate::core::sabi::format_sabi_path;
use crate::core::variables::VariableMapping;

pub const USE_SOURCE_CODE_COVERAGE: &str = "USE_SOURCE_CODE_COVERAGE";
pub const USE_TSAN: &str = "USE_TSAN";
pub const USE_ASAN: &str = "USE_ASAN";

/// Inputs to [`resolve_variables`].
#[derive(Debug, Clone)]
pub struct ResolverInput {
    pub config: BuildConfig,

    /// Whether the toolchain is a flavor of Clang
    pub use_clang: bool,

    /// Platform's captured ASAN default
    pub asan_default: bool,

    /// ABI descriptor path, complete or templated
    pub sabi_json_path: String,

    /// Version substituted into a templated ABI path
    pub sabi_api_version: u32,
}

/// Resolved instrumentation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instrumentation {
    pub use_source_code_coverage: i64,
    pub use_asan: i64,
    pub use_tsan: i64,
}

/// Decide the instrumentation flags.
///
/// Fails before producing anything when ASAN and TSAN are both enabled.
pub fn resolve_instrumentation(input: &ResolverInput, env: &dyn EnvSource) -> Result<Instrumentation> {
    if !input.use_clang {
        return Ok(Instrumentation::default());
    }

    let use_source_code_coverage = read_toggle(env, USE_SOURCE_CODE_COVERAGE, 0)?;

    let use_tsan = if use_source_code_coverage == 0 {
        read_toggle(env, USE_TSAN, 0)?
    } else {
        0
    };

    let use_asan_default =
        if use_tsan == 0 && use_source_code_coverage == 0 && input.config.is_debugging() {
            i64::from(input.asan_default)
        } else {
            0
        };
    let use_asan = read_toggle(env, USE_ASAN, use_asan_default)?;

    if use_asan != 0 && use_tsan != 0 {
        return Err(ConfigError::MutuallyExclusive {
            first: "ASAN",
            second: "TSAN",
        });
    }

    Ok(Instrumentation {
        use_source_code_coverage,
        use_asan,
        use_tsan,
    })
}

/// Check a finished variable mapping for ASAN and TSAN enabled together.
///
/// Overrides layered after [`resolve_variables`] can turn either flag on, so
/// the final mapping is checked again.
pub fn check_sanitizers(vars: &VariableMapping) -> Result<()> {
    let enabled = |key: &str| vars.get_int(key).is_some_and(|v| v != 0);
    if enabled("use_asan") && enabled("use_tsan") {
        return Err(ConfigError::MutuallyExclusive {
            first: "ASAN",
            second: "TSAN",
        });
    }
    Ok(())
}

/// Produce the platform's variable mapping.
pub fn resolve_variables(input: &ResolverInput, env: &dyn EnvSource) -> Result<VariableMapping> {
    let flags = resolve_instrumentation(input, env)?;

    if flags.use_source_code_coverage != 0 {
        tracing::info!("Using Source-Based Code Coverage");
    }
    if flags.use_asan != 0 {
        tracing::info!("Using Address Sanitizer");
    }
    if flags.use_tsan != 0 {
        tracing::info!("Using Thread Sanitizer");
    }

    let sabi_json_path = format_sabi_path(&input.sabi_json_path, input.sabi_api_version)?;

    Ok(VariableMapping::new()
        .with("clang", input.use_clang)
        .with("use_source_code_coverage", flags.use_source_code_coverage)
        .with("use_asan", flags.use_asan)
        .with("use_tsan", flags.use_tsan)
        .with("sabi_json_path", sabi_json_path)
        // Compatibility variables still read by older build files.
        .with("cobalt_config", input.config.as_str())
        .with("cobalt_fastbuild", 0)
        .with("enable_vr", 0))
}
