#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use glob::glob;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::ReportError, version::Coordinates};

/// Source-control locations declared by a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScmInfo {
    /// Primary (read-only) connection string.
    #[serde(default)]
    pub connection:           Option<String>,
    /// Developer (read-write) connection string, used as a fallback.
    #[serde(default)]
    pub developer_connection: Option<String>,
}

/// Standalone project descriptor standing in for a build tool's project
/// model, read from `apidiff.json` at the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    /// Group identifier of the artifact.
    pub group_id:               String,
    /// Artifact identifier.
    pub artifact_id:            String,
    /// Version of the current checkout.
    pub version:                String,
    /// Packaging; `pom` projects have no sources to report on.
    #[serde(default = "default_packaging")]
    pub packaging:              String,
    /// Declared source-control locations.
    #[serde(default)]
    pub scm:                    Option<ScmInfo>,
    /// Directories holding Java sources, relative to the project root.
    #[serde(default = "default_source_roots")]
    pub source_roots:           Vec<PathBuf>,
    /// Compiled-classes directory, relative to the project root.
    #[serde(default)]
    pub build_output_directory: Option<PathBuf>,
    /// Additional classpath entries, relative to the project root.
    #[serde(default)]
    pub classpath_elements:     Vec<PathBuf>,
}

/// Default packaging when the descriptor omits it.
fn default_packaging() -> String {
    "jar".to_string()
}

/// Default source layout when the descriptor omits it.
fn default_source_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("src/main/java")]
}

impl ProjectDescriptor {
    /// Reads and parses a descriptor file.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = fs::read_to_string(path).map_err(|e| ReportError::Descriptor {
            path:   path.to_path_buf(),
            source: anyhow!(e),
        })?;
        serde_json::from_str(&contents).map_err(|e| ReportError::Descriptor {
            path:   path.to_path_buf(),
            source: anyhow!(e),
        })
    }

    /// Coordinates of the artifact this project publishes.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            group_id:    self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            packaging:   self.packaging.clone(),
        }
    }

    /// The SCM connection to fetch sources through, preferring the primary
    /// connection over the developer connection.
    pub fn connection(&self) -> Result<&str, ReportError> {
        let scm = self.scm.as_ref().ok_or(ReportError::MissingScmConnection)?;

        if let Some(connection) = scm.connection.as_deref()
            && !connection.is_empty()
        {
            return Ok(connection);
        }

        match scm.developer_connection.as_deref() {
            Some(connection) if !connection.is_empty() => Ok(connection),
            _ => Err(ReportError::MissingScmConnection),
        }
    }

    /// Source roots resolved against the tree the project lives in. Empty
    /// for `pom`-packaged projects, which carry no sources of their own.
    pub fn source_roots_in(&self, root: &Path) -> Vec<PathBuf> {
        if self.packaging.eq_ignore_ascii_case("pom") {
            return Vec::new();
        }
        self.source_roots.iter().map(|dir| root.join(dir)).collect()
    }

    /// Whether there is anything to report on.
    pub fn can_generate_report(&self) -> bool {
        !self.packaging.eq_ignore_ascii_case("pom") && !self.source_roots.is_empty()
    }
}

/// Collects the package names declared by the Java sources under the given
/// roots. Files in the unnamed package are skipped; unreadable files are
/// logged and skipped.
pub fn discover_packages(source_roots: &[PathBuf]) -> Result<BTreeSet<String>> {
    let mut packages = BTreeSet::new();

    for root in source_roots {
        if !root.is_dir() {
            continue;
        }
        for path in find_java_files(root)? {
            match fs::read_to_string(&path) {
                Ok(source) => {
                    if let Some(package) = package_declaration(&source) {
                        packages.insert(package);
                    }
                }
                Err(e) => warn!("Could not read {}: {e}", path.display()),
            }
        }
    }

    Ok(packages)
}

/// Splits a space-separated include-package list into the explicit set that
/// overrides discovery.
pub fn parse_include_packages(names: &str) -> BTreeSet<String> {
    names.split_whitespace().map(str::to_string).collect()
}

/// Finds `.java` files at any depth under `root`.
fn find_java_files(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = root.join("**").join("*.java");
    let pattern = pattern
        .to_str()
        .context("Could not convert source root to string")?
        .to_string();

    Ok(glob(&pattern)
        .context("Could not create glob")?
        .filter_map(std::result::Result::ok)
        .collect())
}

/// Extracts the package name from a Java source file, if it declares one
/// before any other code.
fn package_declaration(source: &str) -> Option<String> {
    let mut in_block_comment = false;

    for line in source.lines() {
        let line = line.trim();

        if in_block_comment {
            if line.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            if !line.contains("*/") {
                in_block_comment = true;
            }
            continue;
        }

        let rest = line.strip_prefix("package")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim().trim_end_matches(';').trim();
        return (!name.is_empty()).then(|| name.to_string());
    }

    None
}
