//! High-level operations.
//!
//! This module contains the implementation of sbconf commands.

pub mod deploy;
pub mod resolve;

pub use deploy::{expand_deploy_patterns, product_dir};
pub use resolve::{resolve_build, uses_clang, ApplicationSummary, ResolveOptions, ResolvedBuild};
