#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Name of the documentation tool this crate drives.
pub const JAVADOC_TOOL: &str = "javadoc";

/// Environment variable naming the JDK installation root, consulted when the
/// executable cannot be resolved any other way.
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

/// Doclet class used for both descriptor generation and diff generation.
pub const DIFF_DOCLET: &str = "jdiff.JDiff";

/// Default name of the destination directory for the rendered report.
pub const DEFAULT_DEST_DIR: &str = "apidocs";

/// Default working directory for checkouts and API descriptors, relative to
/// the project root.
pub const DEFAULT_WORKING_DIR: &str = "target/apidiff";

/// Default reporting directory the destination directory is nested under,
/// relative to the project root.
pub const DEFAULT_REPORTING_DIR: &str = "target/site";

/// File name of the project descriptor this tool reads in place of a build
/// tool's project model.
pub const PROJECT_DESCRIPTOR: &str = "apidiff.json";

/// Version qualifier marking unstable builds, excluded from comparison
/// candidates.
pub const SNAPSHOT_QUALIFIER: &str = "SNAPSHOT";

/// File name of the placeholder image copied next to the generated report.
pub const REPORT_ASSET_NAME: &str = "black.gif";

/// Bytes of the placeholder image, embedded in the binary.
pub const REPORT_ASSET: &[u8] = include_bytes!("assets/black.gif");
