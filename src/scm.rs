#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt, fs, path::Path};

use anyhow::anyhow;
use git2::{Repository, build::RepoBuilder};
use tracing::info;

use crate::error::ReportError;

/// A parsed SCM connection string of the form `scm:<provider>:<url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmConnection {
    /// Provider name, e.g. `git`.
    provider: String,
    /// Provider-specific repository location.
    url:      String,
}

impl ScmConnection {
    /// Parses a connection string, failing on anything that does not follow
    /// the `scm:<provider>:<url>` shape.
    pub fn parse(connection: &str) -> Result<Self, ReportError> {
        let mut parts = connection.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("scm"), Some(provider), Some(url)) if !provider.is_empty() && !url.is_empty() => {
                Ok(Self {
                    provider: provider.to_string(),
                    url:      url.to_string(),
                })
            }
            _ => Err(ReportError::InvalidScmConnection {
                connection: connection.to_string(),
                reason:     "expected 'scm:<provider>:<url>'".to_string(),
            }),
        }
    }

    /// Provider part of the connection.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Repository location part of the connection.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ScmConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scm:{}:{}", self.provider, self.url)
    }
}

/// Client capable of materializing and refreshing a working checkout.
pub trait ScmClient {
    /// Performs a full checkout into `target`, which exists and is empty.
    fn checkout(&self, connection: &ScmConnection, target: &Path) -> Result<(), ReportError>;

    /// Incrementally updates the existing checkout at `target`.
    fn update(&self, connection: &ScmConnection, target: &Path) -> Result<(), ReportError>;
}

/// Ensures `checkout_dir` holds current sources for the given connection.
///
/// A forced refresh removes the directory first. A missing directory gets a
/// full checkout; an existing one is updated in place, since update
/// semantics rely on directory continuity.
pub fn fetch_sources(
    scm: &dyn ScmClient,
    connection: &ScmConnection,
    checkout_dir: &Path,
    force_checkout: bool,
) -> Result<(), ReportError> {
    if force_checkout && checkout_dir.exists() {
        fs::remove_dir_all(checkout_dir).map_err(|e| fetch_error(checkout_dir, e.into()))?;
    }

    if !checkout_dir.exists() {
        fs::create_dir_all(checkout_dir).map_err(|e| fetch_error(checkout_dir, e.into()))?;

        info!("Performing checkout to {}", checkout_dir.display());
        scm.checkout(connection, checkout_dir)
    } else {
        info!("Performing update to {}", checkout_dir.display());
        scm.update(connection, checkout_dir)
    }
}

/// Shorthand for the fetch-failure error.
fn fetch_error(dir: &Path, source: anyhow::Error) -> ReportError {
    ReportError::Fetch {
        dir: dir.to_path_buf(),
        source,
    }
}

/// Production SCM client backed by libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitScm;

impl GitScm {
    /// Rejects connections declared for a different provider.
    fn require_git(connection: &ScmConnection) -> Result<(), ReportError> {
        if connection.provider() == "git" {
            Ok(())
        } else {
            Err(ReportError::InvalidScmConnection {
                connection: connection.to_string(),
                reason:     format!("provider '{}' is not supported", connection.provider()),
            })
        }
    }

    /// Fetches from `origin` and hard-resets the working tree to the fetched
    /// head.
    fn update_inner(target: &Path) -> Result<(), git2::Error> {
        let repo = Repository::open(target)?;
        {
            let mut remote = repo.find_remote("origin")?;
            // empty refspec list means the remote's configured refspecs
            remote.fetch(&[] as &[&str], None, None)?;
        }
        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let commit = repo.reference_to_annotated_commit(&fetch_head)?;
        let object = repo.find_object(commit.id(), None)?;
        repo.reset(&object, git2::ResetType::Hard, None)?;
        Ok(())
    }
}

impl ScmClient for GitScm {
    fn checkout(&self, connection: &ScmConnection, target: &Path) -> Result<(), ReportError> {
        Self::require_git(connection)?;
        RepoBuilder::new()
            .clone(connection.url(), target)
            .map(|_| ())
            .map_err(|e| fetch_error(target, anyhow!(e)))
    }

    fn update(&self, connection: &ScmConnection, target: &Path) -> Result<(), ReportError> {
        Self::require_git(connection)?;
        Self::update_inner(target).map_err(|e| fetch_error(target, anyhow!(e)))
    }
}
