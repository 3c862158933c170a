//! Application configuration discovery.
//!
//! Resolution order for an application on a platform:
//! 1. Each search-path directory in order: `<dir>/<application>/configuration.toml`
//!    with an `[application]` table. First match wins.
//! 2. The default factory registered for the application name.
//! 3. [`BaseApplicationConfiguration`] (no overrides).
//!
//! A missing directory or file is skipped silently; a file that exists but
//! cannot be read or parsed is a load error and stops the search.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::core::application::{
    ApplicationConfiguration, ApplicationContext, ApplicationOverrides,
    BaseApplicationConfiguration, FileApplicationConfiguration,
};
use crate::core::errors::{ConfigError, Result};
use crate::core::platform::PlatformConfiguration;

/// File name of an application configuration source.
pub const CONFIGURATION_FILE: &str = "configuration.toml";

/// Constructs an application configuration.
pub type ApplicationFactory =
    Arc<dyn Fn(ApplicationContext) -> Box<dyn ApplicationConfiguration> + Send + Sync>;

/// Registry of application configuration factories.
///
/// Named factories are referenced from configuration sources
/// (`factory = "<name>"`); default factories are keyed by application name and
/// used when no search-path entry supplies a configuration.
#[derive(Clone, Default)]
pub struct ApplicationRegistry {
    named: HashMap<String, ApplicationFactory>,
    defaults: HashMap<String, ApplicationFactory>,
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        ApplicationRegistry {
            named: HashMap::new(),
            defaults: HashMap::new(),
        }
    }

    /// Register a factory that configuration sources can name.
    ///
    /// Registering the same name again replaces the earlier factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(ApplicationContext) -> Box<dyn ApplicationConfiguration> + Send + Sync + 'static,
    {
        self.named.insert(name.into(), Arc::new(factory));
    }

    /// Register the default factory for an application.
    pub fn register_default<F>(&mut self, application: impl Into<String>, factory: F)
    where
        F: Fn(ApplicationContext) -> Box<dyn ApplicationConfiguration> + Send + Sync + 'static,
    {
        self.defaults.insert(application.into(), Arc::new(factory));
    }

    pub fn named(&self, name: &str) -> Option<&ApplicationFactory> {
        self.named.get(name)
    }

    /// Default factory for an application, if any.
    pub fn default_for(&self, application: &str) -> Option<&ApplicationFactory> {
        self.defaults.get(application)
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.defaults.is_empty()
    }
}

impl fmt::Debug for ApplicationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut named: Vec<_> = self.named.keys().collect();
        named.sort();
        let mut defaults: Vec<_> = self.defaults.keys().collect();
        defaults.sort();
        f.debug_struct("ApplicationRegistry")
            .field("named", &named)
            .field("defaults", &defaults)
            .finish()
    }
}

/// On-disk shape of `configuration.toml`.
#[derive(Debug, Deserialize)]
struct ConfigurationSource {
    application: Option<ApplicationOverrides>,
}

/// Where the selected configuration came from.
enum Selection {
    Source {
        path: PathBuf,
        overrides: ApplicationOverrides,
    },
    Default(ApplicationFactory),
    Base,
}

/// Load the application configuration source in `dir`, if it supplies one.
///
/// Returns `Ok(None)` when the directory or file is missing, or when the file
/// has no `[application]` table.
pub fn load_configuration_source(dir: &Path) -> Result<Option<(PathBuf, ApplicationOverrides)>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let path = dir.join(CONFIGURATION_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let source: ConfigurationSource =
        toml::from_str(&contents).map_err(|source| ConfigError::Load {
            path: path.clone(),
            source,
        })?;

    match source.application {
        Some(overrides) => {
            tracing::debug!("Found application configuration in {}", path.display());
            Ok(Some((path, overrides)))
        }
        None => {
            tracing::debug!("No [application] table in {}", path.display());
            Ok(None)
        }
    }
}

/// Find and instantiate the most specific configuration for `application_name`.
pub fn locate_application(
    platform: &PlatformConfiguration,
    application_name: &str,
) -> Result<Box<dyn ApplicationConfiguration>> {
    let registry = platform.environment().applications();
    let mut selection = None;

    for directory in platform.search_path() {
        let candidate = directory.join(application_name);
        tracing::debug!(
            "Searching for application configuration in {}",
            candidate.display()
        );
        if let Some((path, overrides)) = load_configuration_source(&candidate)? {
            tracing::info!(
                "Using platform-specific application configuration for {}.",
                application_name
            );
            selection = Some(Selection::Source { path, overrides });
            break;
        }
    }

    let selection = match selection {
        Some(found) => found,
        None => match registry.default_for(application_name) {
            Some(factory) => {
                tracing::info!(
                    "Using default application configuration for {}.",
                    application_name
                );
                Selection::Default(Arc::clone(factory))
            }
            None => {
                tracing::info!("Using base application configuration.");
                Selection::Base
            }
        },
    };

    let mut context = ApplicationContext {
        platform_name: platform.name().to_string(),
        platform_directory: platform.directory().to_path_buf(),
        application_name: application_name.to_string(),
        application_path: platform.directory().join(application_name),
        source: None,
        overrides: ApplicationOverrides::default(),
    };

    let configuration = match selection {
        Selection::Source { path, overrides } => {
            let factory = match overrides.factory.as_deref() {
                Some(name) => Some(registry.named(name).cloned().ok_or_else(|| {
                    ConfigError::UnknownFactory {
                        name: name.to_string(),
                        path: path.clone(),
                    }
                })?),
                None => None,
            };
            context.source = Some(path);
            context.overrides = overrides;
            match factory {
                Some(factory) => factory(context),
                None => Box::new(FileApplicationConfiguration::new(context)),
            }
        }
        Selection::Default(factory) => factory(context),
        Selection::Base => Box::new(BaseApplicationConfiguration::new(context)),
    };

    Ok(configuration)
}
