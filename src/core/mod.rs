//! Core data structures for sbconf.
//!
//! This module contains the configuration model a build generator talks to:
//! - Platform configurations and their leaf definitions
//! - Application configurations and their discovery
//! - Variable resolution (instrumentation, ABI descriptor, build config)
//! - The environment every lookup reads from

pub mod application;
pub mod build_config;
pub mod environment;
pub mod errors;
pub mod locator;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod sabi;
pub mod search_path;
pub mod test_filter;
pub mod variables;

pub use application::{
    ApplicationConfiguration, ApplicationContext, ApplicationOverrides,
    BaseApplicationConfiguration, FileApplicationConfiguration,
};
pub use build_config::BuildConfig;
pub use environment::{EnvSource, Environment, MapEnv, ProcessEnv};
pub use errors::ConfigError;
pub use locator::{locate_application, ApplicationFactory, ApplicationRegistry};
pub use platform::{BasePlatform, PlatformConfiguration, PlatformDefinition};
pub use registry::{PlatformInfo, PlatformRegistry};
pub use search_path::SearchPath;
pub use test_filter::TestFilter;
pub use variables::{Variable, VariableMapping};
