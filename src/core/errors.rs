//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while resolving a platform configuration.
///
/// Soft fallbacks (no accelerator, no application override, unknown platform
/// for includes) never surface here; they are logged and resolved to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two instrumentation modes that cannot be combined were both enabled.
    #[error("{first} and {second} are mutually exclusive")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    /// A required platform operation was never supplied by the leaf platform.
    #[error("platform `{platform}` does not implement `{operation}`")]
    Unimplemented {
        platform: String,
        operation: &'static str,
    },

    /// An environment toggle did not hold an integer.
    #[error("environment variable {var} must be an integer, got `{value}`")]
    InvalidToggle { var: String, value: String },

    #[error("unknown build config `{0}` (expected one of: debug, devel, qa, gold)")]
    UnknownBuildConfig(String),

    #[error("invalid ABI descriptor path template `{template}`: {reason}")]
    SabiTemplate { template: String, reason: String },

    #[error("unknown platform `{0}`")]
    UnknownPlatform(String),

    /// A configuration source file exists but could not be parsed.
    #[error("failed to load configuration source {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration source referenced a factory nobody registered.
    #[error("{} names unregistered application factory `{name}`", path.display())]
    UnknownFactory { name: String, path: PathBuf },
}

impl ConfigError {
    /// Whether this error is a load failure of an on-disk source, as opposed
    /// to a configuration conflict.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Load { .. } | ConfigError::Io { .. } | ConfigError::UnknownFactory { .. }
        )
    }
}

/// Result type for configuration resolution.
pub type Result<T> = std::result::Result<T, ConfigError>;
