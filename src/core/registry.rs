//! Registry of known platforms.
//!
//! Platforms are discovered by walking platform roots for `platform.toml`
//! descriptors. The directory holding a descriptor is the platform's path: it
//! becomes the platform configuration's root directory and holds the
//! platform's `gyp_configuration.gypi` include.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::builder::descriptor::{PlatformDescriptor, PLATFORM_FILE};

/// Include file every platform directory provides to the generator.
pub const PLATFORM_INCLUDE_FILE: &str = "gyp_configuration.gypi";

/// A known platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub name: String,

    /// Directory containing the platform's descriptor
    pub path: PathBuf,

    pub descriptor: PlatformDescriptor,
}

impl PlatformInfo {
    pub fn new(path: impl Into<PathBuf>, descriptor: PlatformDescriptor) -> Self {
        PlatformInfo {
            name: descriptor.name.clone(),
            path: path.into(),
            descriptor,
        }
    }

    /// Absolute path of the platform's generator include file.
    pub fn include_file(&self) -> PathBuf {
        self.path.join(PLATFORM_INCLUDE_FILE)
    }
}

/// Platforms keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<String, PlatformInfo>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        PlatformRegistry {
            platforms: BTreeMap::new(),
        }
    }

    /// Discover platforms under each root, in order.
    ///
    /// Unreadable descriptors are skipped with a warning. When two descriptors
    /// declare the same name, the first one found wins.
    pub fn discover<P: AsRef<Path>>(roots: &[P]) -> Self {
        let mut registry = PlatformRegistry::new();

        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                tracing::debug!("Platform root {} does not exist", root.display());
                continue;
            }

            let mut descriptors: Vec<PathBuf> = WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && e.file_name() == PLATFORM_FILE)
                .map(|e| e.into_path())
                .collect();
            descriptors.sort();

            for path in descriptors {
                let descriptor = match PlatformDescriptor::load(&path) {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Skipping platform descriptor: {}", e);
                        continue;
                    }
                };
                let Some(dir) = path.parent() else {
                    continue;
                };
                if descriptor.name.is_empty() {
                    tracing::warn!("Platform descriptor {} has no name", path.display());
                    continue;
                }
                registry.register(PlatformInfo::new(dir, descriptor));
            }
        }

        registry
    }

    /// Register a platform. Returns `false` if the name was already taken.
    pub fn register(&mut self, info: PlatformInfo) -> bool {
        if let Some(existing) = self.platforms.get(&info.name) {
            tracing::warn!(
                "Platform {} at {} shadowed by {}",
                info.name,
                info.path.display(),
                existing.path.display()
            );
            return false;
        }
        tracing::debug!("Registered platform {} at {}", info.name, info.path.display());
        self.platforms.insert(info.name.clone(), info);
        true
    }

    pub fn get(&self, name: &str) -> Option<&PlatformInfo> {
        self.platforms.get(name)
    }

    /// Platform names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformInfo> {
        self.platforms.values()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
