#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Errors that abort a report run. None of these are retried; they propagate
/// to the caller as-is.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The explicitly configured javadoc executable does not resolve to a
    /// regular file.
    #[error(
        "The javadoc executable '{}' doesn't exist or is not a file. Verify the javadoc \
         executable setting.",
        path.display()
    )]
    InvalidExecutableOverride {
        /// Path after directory and extension resolution.
        path: PathBuf,
    },
    /// `JAVA_HOME` is unset or empty and no other strategy produced an
    /// executable.
    #[error("The environment variable JAVA_HOME is not correctly set.")]
    JavaHomeNotSet,
    /// `JAVA_HOME` is set but does not name a directory.
    #[error(
        "The environment variable JAVA_HOME={} doesn't exist or is not a valid directory.",
        path.display()
    )]
    JavaHomeInvalid {
        /// The value `JAVA_HOME` held.
        path: PathBuf,
    },
    /// Every resolution strategy was exhausted without finding the tool.
    #[error(
        "The javadoc executable '{}' doesn't exist or is not a file. Verify the JAVA_HOME \
         environment variable.",
        path.display()
    )]
    ExecutableNotFound {
        /// Last candidate path that was probed.
        path: PathBuf,
    },
    /// The comparison version range could not be parsed.
    #[error("Invalid comparison version '{spec}': {reason}")]
    InvalidVersionConstraint {
        /// The range expression as given.
        spec:   String,
        /// What made it malformed.
        reason: String,
    },
    /// The project declares neither a primary nor a developer SCM connection.
    #[error("SCM Connection is not set in the project descriptor.")]
    MissingScmConnection,
    /// A declared SCM connection string could not be understood.
    #[error("Unsupported SCM connection '{connection}': {reason}")]
    InvalidScmConnection {
        /// The connection string as given.
        connection: String,
        /// What made it unusable.
        reason:     String,
    },
    /// The external tool could not be launched at all.
    #[error("Failed to launch '{program}'")]
    ProcessLaunch {
        /// Program that failed to start.
        program: String,
        /// Underlying launch error.
        #[source]
        source:  std::io::Error,
    },
    /// The external tool ran but reported failure through its exit status.
    #[error("'{program}' exited with {status}")]
    ProcessExit {
        /// Program that failed.
        program: String,
        /// The non-success exit status.
        status:  ExitStatus,
    },
    /// Checkout or update of a working copy failed.
    #[error("Failed to fetch sources into {}", dir.display())]
    Fetch {
        /// Target checkout directory.
        dir:    PathBuf,
        /// Underlying SCM or filesystem error.
        #[source]
        source: anyhow::Error,
    },
    /// The project descriptor could not be read or parsed.
    #[error("Could not read project descriptor {}", path.display())]
    Descriptor {
        /// Path of the descriptor file.
        path:   PathBuf,
        /// Underlying IO or parse error.
        #[source]
        source: anyhow::Error,
    },
    /// Unknown error.
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
