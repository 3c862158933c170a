//! Build accelerator (compiler cache) selection.
//!
//! An accelerator is used when it is not switched off through its
//! `SB_USE_<NAME>` toggle and its binary can be found on `PATH`. A missing
//! tool is never an error; the build simply runs without acceleration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::environment::EnvSource;

/// Supported build accelerators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceleratorKind {
    #[default]
    Ccache,
    Sccache,
}

impl AcceleratorKind {
    /// Canonical name, which is also the binary name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceleratorKind::Ccache => "ccache",
            AcceleratorKind::Sccache => "sccache",
        }
    }

    /// Environment variable that can switch this accelerator off.
    pub fn toggle_var(&self) -> &'static str {
        match self {
            AcceleratorKind::Ccache => "SB_USE_CCACHE",
            AcceleratorKind::Sccache => "SB_USE_SCCACHE",
        }
    }

    /// Locate the accelerator binary on the `PATH` seen by `env`.
    pub fn find_binary(&self, env: &dyn EnvSource) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_default();
        match env.var("PATH") {
            Some(path) => which::which_in(self.as_str(), Some(path), cwd).ok(),
            None => None,
        }
    }

    /// Decide whether the accelerator can be used.
    pub fn availability(&self, env: &dyn EnvSource) -> AcceleratorAvailability {
        if env.var(self.toggle_var()).is_some_and(|v| v.trim() == "0") {
            return AcceleratorAvailability::Disabled {
                toggle: self.toggle_var(),
            };
        }
        match self.find_binary(env) {
            Some(path) => AcceleratorAvailability::Available { path },
            None => AcceleratorAvailability::NotInstalled,
        }
    }
}

impl fmt::Display for AcceleratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AcceleratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ccache" => Ok(AcceleratorKind::Ccache),
            "sccache" => Ok(AcceleratorKind::Sccache),
            other => Err(format!("unknown build accelerator `{}`", other)),
        }
    }
}

/// Outcome of probing an accelerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceleratorAvailability {
    /// Binary found and not disabled
    Available { path: PathBuf },
    /// Switched off through its environment toggle
    Disabled { toggle: &'static str },
    /// Binary not on `PATH`
    NotInstalled,
}

impl AcceleratorAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, AcceleratorAvailability::Available { .. })
    }
}

/// Return the accelerator's canonical name if usable, or an empty string.
pub fn select_build_accelerator(kind: AcceleratorKind, env: &dyn EnvSource) -> String {
    let availability = kind.availability(env);
    if availability.is_available() {
        tracing::info!("Using {} build accelerator.", kind);
        kind.as_str().to_string()
    } else {
        tracing::debug!("{} unavailable: {:?}", kind, availability);
        tracing::info!("Not using {} build accelerator.", kind);
        String::new()
    }
}
