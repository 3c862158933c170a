//! Unit test exclusion filters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::build_config::BuildConfig;

/// Test name that excludes every test of a target.
pub const FILTER_ALL: &str = "FILTER_ALL";

/// Excludes a test (or a whole target) from a unit test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFilter {
    /// Test target binary, e.g. `nplb`
    pub target: String,

    /// Test name, e.g. `SbSocketTest.Connect`, or [`FILTER_ALL`]
    pub test: String,

    /// Restrict the filter to one build config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BuildConfig>,
}

impl TestFilter {
    pub fn new(target: impl Into<String>, test: impl Into<String>) -> Self {
        TestFilter {
            target: target.into(),
            test: test.into(),
            config: None,
        }
    }

    pub fn for_config(mut self, config: BuildConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether the filter is in effect for `config`.
    pub fn applies_to(&self, config: BuildConfig) -> bool {
        self.config.map_or(true, |c| c == config)
    }

    pub fn filters_whole_target(&self) -> bool {
        self.test == FILTER_ALL
    }
}

impl fmt::Display for TestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.test)?;
        if let Some(config) = self.config {
            write!(f, " ({})", config)?;
        }
        Ok(())
    }
}
