//! Build tooling described by platforms.
//!
//! Toolchain descriptions, build accelerators and the on-disk platform
//! descriptors that supply them.

pub mod accelerator;
pub mod descriptor;
pub mod toolchain;

pub use accelerator::{select_build_accelerator, AcceleratorAvailability, AcceleratorKind};
pub use descriptor::{DescriptorPlatform, PlatformDescriptor};
pub use toolchain::{Capability, Tool, ToolKind, ToolchainFamily};
