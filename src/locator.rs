#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::{debug, warn};
use which::which;

use crate::{
    constants::{JAVADOC_TOOL, JAVA_HOME_ENV},
    error::ReportError,
};

/// Finds the javadoc executable.
///
/// Resolution order: the explicit override, the configured toolchain home,
/// the installation root of the `java` runtime found on `PATH`, and finally
/// the `JAVA_HOME` environment variable. The first strategy that yields a
/// regular file wins; if all are exhausted the error distinguishes which
/// strategy failed.
pub fn locate_javadoc(
    explicit: Option<&Path>,
    toolchain_home: Option<&Path>,
) -> Result<PathBuf, ReportError> {
    if let Some(path) = explicit {
        if toolchain_home.is_some() {
            warn!(
                "Toolchain is ignored, javadoc executable is set to {}",
                path.display()
            );
        }
        return resolve_override(path);
    }

    if let Some(home) = toolchain_home {
        debug!("Using toolchain at {}", home.display());
        return resolve_override(&home.join("bin").join(JAVADOC_TOOL));
    }

    if let Some(candidate) = runtime_candidate()
        && candidate.is_file()
    {
        return canonical(candidate);
    }

    env_root_candidate()
}

/// Validates a user-supplied executable path, appending the conventional
/// file name when a directory is given and the platform extension when it is
/// missing.
fn resolve_override(path: &Path) -> Result<PathBuf, ReportError> {
    let mut exe = path.to_path_buf();

    if exe.is_dir() {
        exe.push(JAVADOC_TOOL);
    }
    exe = with_platform_extension(exe);

    if !exe.is_file() {
        return Err(ReportError::InvalidExecutableOverride { path: exe });
    }

    canonical(exe)
}

/// Candidate path under the installation root of whichever `java` runtime is
/// first on `PATH`, if any.
///
/// The offsets mirror the historical JDK layouts: AIX keeps the tool under a
/// separate `sh` directory, macOS bundles it next to `java`, and everything
/// else expects the runtime root to be the `jre` subdirectory of a JDK.
fn runtime_candidate() -> Option<PathBuf> {
    let home = runtime_java_home()?;
    let command = tool_file_name();

    let candidate = if cfg!(target_os = "aix") {
        home.join("..").join("sh").join(command)
    } else if cfg!(target_os = "macos") {
        home.join("bin").join(command)
    } else {
        home.join("..").join("bin").join(command)
    };

    debug!("Probing runtime candidate {}", candidate.display());
    Some(candidate)
}

/// Installation root of the `java` binary on `PATH`, symlinks resolved.
fn runtime_java_home() -> Option<PathBuf> {
    let java = which("java").ok()?;
    let java = java.canonicalize().ok()?;
    // <root>/bin/java
    Some(java.parent()?.parent()?.to_path_buf())
}

/// Last-resort resolution through the `JAVA_HOME` environment variable.
fn env_root_candidate() -> Result<PathBuf, ReportError> {
    let java_home = env::var_os(JAVA_HOME_ENV)
        .filter(|value| !value.is_empty())
        .ok_or(ReportError::JavaHomeNotSet)?;

    let root = PathBuf::from(java_home);
    if !root.is_dir() {
        return Err(ReportError::JavaHomeInvalid { path: root });
    }

    let exe = with_platform_extension(root.join("bin").join(JAVADOC_TOOL));
    if !exe.is_file() {
        return Err(ReportError::ExecutableNotFound { path: exe });
    }

    canonical(exe)
}

/// File name of the tool on the current platform.
fn tool_file_name() -> String {
    if cfg!(windows) {
        format!("{JAVADOC_TOOL}.exe")
    } else {
        JAVADOC_TOOL.to_string()
    }
}

/// Appends `.exe` on Windows when the file name carries no extension.
fn with_platform_extension(path: PathBuf) -> PathBuf {
    if cfg!(windows) && path.extension().is_none() {
        path.with_extension("exe")
    } else {
        path
    }
}

/// Returns the canonical absolute form of an existing path.
fn canonical(path: PathBuf) -> Result<PathBuf, ReportError> {
    let resolved = path
        .canonicalize()
        .with_context(|| format!("Could not canonicalize {}", path.display()))?;
    Ok(resolved)
}
