//! Abstract toolchain model for target and host builds.
//!
//! A platform either supplies a list of tools or answers
//! [`Capability::NotSupported`], in which case the generator falls back to its
//! legacy toolchain handling. Only the compiler family matters for
//! configuration resolution: Clang-family compilers unlock the sanitizer and
//! coverage variables.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

/// Outcome of an optional platform capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability<T> {
    /// The platform provides the capability
    Provided(T),
    /// The platform does not; callers use their legacy path
    NotSupported,
}

impl<T> Capability<T> {
    pub fn is_provided(&self) -> bool {
        matches!(self, Capability::Provided(_))
    }

    pub fn as_ref(&self) -> Capability<&T> {
        match self {
            Capability::Provided(v) => Capability::Provided(v),
            Capability::NotSupported => Capability::NotSupported,
        }
    }

    pub fn provided(self) -> Option<T> {
        match self {
            Capability::Provided(v) => Some(v),
            Capability::NotSupported => None,
        }
    }
}

/// The family of a compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolchainFamily {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Apple Clang (macOS)
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainFamily::Gcc => "gcc",
            ToolchainFamily::Clang => "clang",
            ToolchainFamily::AppleClang => "apple-clang",
            ToolchainFamily::Msvc => "msvc",
        }
    }

    /// Whether this is a flavor of Clang.
    pub fn is_clang(&self) -> bool {
        matches!(self, ToolchainFamily::Clang | ToolchainFamily::AppleClang)
    }
}

/// Role a tool plays in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    CCompiler,
    CxxCompiler,
    Assembler,
    StaticLinker,
    ExecutableLinker,
    SharedLibraryLinker,
    Stamp,
    Copy,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::CCompiler => "c-compiler",
            ToolKind::CxxCompiler => "cxx-compiler",
            ToolKind::Assembler => "assembler",
            ToolKind::StaticLinker => "static-linker",
            ToolKind::ExecutableLinker => "executable-linker",
            ToolKind::SharedLibraryLinker => "shared-library-linker",
            ToolKind::Stamp => "stamp",
            ToolKind::Copy => "copy",
        }
    }
}

/// A single tool in a platform toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,

    /// Program to invoke
    pub path: PathBuf,

    /// Compiler family, when known up front
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<ToolchainFamily>,

    /// Extra flags always passed to this tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

impl Tool {
    pub fn new(kind: ToolKind, path: impl Into<PathBuf>) -> Self {
        Tool {
            kind,
            path: path.into(),
            family: None,
            flags: Vec::new(),
        }
    }

    pub fn with_family(mut self, family: ToolchainFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn with_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }
}

/// Family of the toolchain's C compiler (C++ compiler if there is no C one).
pub fn toolchain_family(tools: &[Tool]) -> Option<ToolchainFamily> {
    let compiler = tools
        .iter()
        .find(|t| t.kind == ToolKind::CCompiler)
        .or_else(|| tools.iter().find(|t| t.kind == ToolKind::CxxCompiler))?;

    Some(
        compiler
            .family
            .unwrap_or_else(|| detect_compiler_family(&compiler.path)),
    )
}

/// Whether the toolchain compiles with a flavor of Clang.
pub fn is_clang_toolchain(tools: &[Tool]) -> bool {
    toolchain_family(tools).is_some_and(|f| f.is_clang())
}

/// Detect a compiler's family from its name, then from `--version` output.
pub fn detect_compiler_family(cc: &Path) -> ToolchainFamily {
    let name = cc
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.contains("clang") {
        return detect_clang_variant(cc);
    } else if name.contains("gcc") || name.contains("g++") {
        return ToolchainFamily::Gcc;
    } else if name == "cl" || name == "cl.exe" {
        return ToolchainFamily::Msvc;
    }

    if let Some(stdout) = version_output(cc) {
        if stdout.contains("clang") {
            return if stdout.contains("apple") {
                ToolchainFamily::AppleClang
            } else {
                ToolchainFamily::Clang
            };
        } else if stdout.contains("gcc") {
            return ToolchainFamily::Gcc;
        }
    }

    tracing::debug!(
        "Could not identify compiler family of {}, assuming gcc",
        cc.display()
    );
    ToolchainFamily::Gcc
}

fn detect_clang_variant(cc: &Path) -> ToolchainFamily {
    match version_output(cc) {
        Some(stdout) if stdout.contains("apple") => ToolchainFamily::AppleClang,
        _ => ToolchainFamily::Clang,
    }
}

fn version_output(cc: &Path) -> Option<String> {
    tracing::debug!("Running {} --version to identify its compiler family", cc.display());
    let output = Command::new(cc).arg("--version").output().ok()?;
    Some(String::from_utf8_lossy(&output.stdout).to_lowercase())
}
