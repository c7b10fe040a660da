//! # apidiff
//!
//! Generates an API difference report between two versions of a Java
//! project by driving the `javadoc` tool with the JDiff doclet: once per
//! version in descriptor mode, then once in diff mode over both
//! descriptors. The historical version is selected by a version-range
//! constraint against the published versions of the project and fetched
//! through a source-control client.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Typed errors surfaced by a report run
pub mod error;
/// Ordered javadoc invocations and their execution
pub mod javadoc;
/// Resolution of the javadoc executable
pub mod locator;
/// The standalone project descriptor and package discovery
pub mod project;
/// The driver sequencing a report run
pub mod report;
/// SCM connections, clients, and the checkout/update policy
pub mod scm;
/// Artifact versions, version ranges, and comparison-version resolution
pub mod version;

pub use error::ReportError;
pub use project::ProjectDescriptor;
pub use report::{ReportConfig, ReportDriver, ReportOutcome};
pub use scm::{GitScm, ScmClient, ScmConnection};
pub use version::{LocalRepositoryMetadata, VersionMetadata};
