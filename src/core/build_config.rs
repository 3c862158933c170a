//! Build config names (debug, devel, qa, gold).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;

/// Build configuration kind passed through to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildConfig {
    /// Unoptimized, full debug info
    #[default]
    Debug,
    /// Optimized with debugging support
    Devel,
    /// Release-like build with logging kept for QA
    Qa,
    /// Shipping build
    Gold,
}

impl BuildConfig {
    /// All build configs, in increasing level of optimization.
    pub const ALL: [BuildConfig; 4] = [
        BuildConfig::Debug,
        BuildConfig::Devel,
        BuildConfig::Qa,
        BuildConfig::Gold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfig::Debug => "debug",
            BuildConfig::Devel => "devel",
            BuildConfig::Qa => "qa",
            BuildConfig::Gold => "gold",
        }
    }

    /// Whether this is one of the two debugging configs.
    ///
    /// Sanitizers default on only for these.
    pub fn is_debugging(&self) -> bool {
        matches!(self, BuildConfig::Debug | BuildConfig::Devel)
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BuildConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildConfig::Debug),
            "devel" => Ok(BuildConfig::Devel),
            "qa" => Ok(BuildConfig::Qa),
            "gold" => Ok(BuildConfig::Gold),
            _ => Err(ConfigError::UnknownBuildConfig(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("DEBUG".parse::<BuildConfig>().unwrap(), BuildConfig::Debug);
        assert_eq!("gold".parse::<BuildConfig>().unwrap(), BuildConfig::Gold);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "release".parse::<BuildConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBuildConfig(ref s) if s == "release"));
    }

    #[test]
    fn test_debugging_configs() {
        let debugging: Vec<_> = BuildConfig::ALL
            .iter()
            .filter(|c| c.is_debugging())
            .collect();
        assert_eq!(debugging, vec![&BuildConfig::Debug, &BuildConfig::Devel]);
    }
}
