//! Test utilities for sbconf unit tests.
//!
//! Helpers that lay out platform descriptors, application configuration
//! sources and fake tools inside temporary directories.

pub mod fixtures;

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::core::environment::Environment;
use crate::core::platform::PlatformConfiguration;

pub use fixtures::*;

/// Write `<root>/<application>/configuration.toml`.
pub fn write_app_config(root: &Path, application: &str, contents: &str) {
    let dir = root.join(application);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("configuration.toml"), contents).unwrap();
}

/// Write `<root>/<relative>/platform.toml`.
pub fn write_platform(root: &Path, relative: &str, contents: &str) {
    let dir = root.join(relative);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("platform.toml"), contents).unwrap();
}

/// Platform configuration rooted at `directory`.
pub fn test_platform(name: &str, directory: &Path, env: Environment) -> PlatformConfiguration {
    PlatformConfiguration::new(name, Arc::new(env)).with_directory(directory)
}

/// Directory containing empty executables with the given names.
#[cfg(unix)]
pub fn fake_tool_dir(names: &[&str]) -> TempDir {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    for name in names {
        let path = dir.path().join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    dir
}

/// Directory containing empty executables with the given names.
#[cfg(not(unix))]
pub fn fake_tool_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in names {
        std::fs::write(dir.path().join(format!("{}.exe", name)), b"").unwrap();
    }
    dir
}
