//! sbconf - Starboard platform and application build configuration
//!
//! This crate resolves the variables, include files, toolchains and test
//! settings a build generator needs for a platform, a build config and an
//! optional application layered on top.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for sbconf unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    build_config::BuildConfig, environment::Environment, errors::ConfigError,
    platform::PlatformConfiguration, variables::VariableMapping,
};

pub use util::config::Config;
