//! Deployment file expansion.
//!
//! Platforms declare wildcard patterns, relative to the product directory,
//! naming every file needed to run target executables on a device.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::build_config::BuildConfig;
use crate::core::platform::PlatformConfiguration;

/// Product directory for a platform and build config: `<root>/out/<platform>_<config>`.
pub fn product_dir(source_root: &Path, platform: &str, config: BuildConfig) -> PathBuf {
    source_root
        .join("out")
        .join(format!("{}_{}", platform, config.as_str()))
}

/// Expand the platform's deploy patterns inside `product_dir`.
///
/// Returns the matching files relative to `product_dir`, sorted and without
/// duplicates. Fails if the platform declares no deploy patterns.
pub fn expand_deploy_patterns(
    platform: &PlatformConfiguration,
    product_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let patterns = platform.deploy_path_patterns()?;
    if !product_dir.is_dir() {
        anyhow::bail!("product directory {} does not exist", product_dir.display());
    }

    let base = glob::Pattern::escape(&product_dir.to_string_lossy());
    let mut files = BTreeSet::new();

    for pattern in &patterns {
        let full = format!("{}/{}", base, pattern);
        let mut matched = 0usize;
        for entry in glob::glob(&full).with_context(|| format!("invalid deploy pattern `{}`", pattern))? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(product_dir) {
                files.insert(relative.to_path_buf());
                matched += 1;
            }
        }
        tracing::debug!("Deploy pattern {} matched {} files", pattern, matched);
    }

    Ok(files.into_iter().collect())
}
