#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use itertools::Itertools;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::{
    constants::{DIFF_DOCLET, PROJECT_DESCRIPTOR, REPORT_ASSET, REPORT_ASSET_NAME},
    error::ReportError,
    javadoc::{JavadocCommand, quote_and_escape},
    locator::locate_javadoc,
    project::{ProjectDescriptor, discover_packages},
    scm::{ScmClient, ScmConnection, fetch_sources},
    version::{Resolution, VersionMetadata, resolve_comparison},
};

/// Configuration of a single report run.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ReportConfig {
    /// Version constraint for the left-hand side of the report. Defaults to
    /// the open range below the current project version.
    #[builder(default, setter(strip_option, into))]
    pub comparison_version: Option<String>,
    /// The base code version, the right-hand side of the report. Defaults
    /// to the current project version.
    #[builder(default, setter(strip_option, into))]
    pub base_version: Option<String>,
    /// Force a checkout instead of an update when the sources were already
    /// fetched during a previous run.
    #[builder(default)]
    pub force_checkout: bool,
    /// Explicit javadoc executable, overriding all discovery.
    #[builder(default, setter(strip_option))]
    pub javadoc_executable: Option<PathBuf>,
    /// JDK toolchain home whose `bin/javadoc` should be used.
    #[builder(default, setter(strip_option))]
    pub toolchain_home: Option<PathBuf>,
    /// Directory where the rendered report lands.
    pub report_output_directory: PathBuf,
    /// Working directory holding checkouts and API descriptors.
    pub working_directory: PathBuf,
    /// Path passed to `-docletpath`, locating the diff doclet.
    #[builder(setter(into))]
    pub doclet_path: String,
    /// Explicit packages to report on, overriding source-tree discovery.
    #[builder(default, setter(strip_option))]
    pub include_packages: Option<Vec<String>>,
    /// Report title, a plain configuration field.
    #[builder(default = String::from("API differences"), setter(into))]
    pub title: String,
    /// Report description, a plain configuration field.
    #[builder(default = String::from(
        "Report on the differences between the public API of two project versions."
    ), setter(into))]
    pub description: String,
}

/// Result of a completed run.
#[derive(Debug)]
pub enum ReportOutcome {
    /// A full report was written to the output directory.
    Generated {
        /// Where the report landed.
        output_directory: PathBuf,
        /// Tag of the old API side.
        old_api:          String,
        /// Tag of the new API side.
        new_api:          String,
        /// Packages both sides were reported on.
        packages:         BTreeSet<String>,
    },
    /// No published version satisfied the comparison constraint.
    SkippedNoPriorVersion,
    /// The project has no Java source roots to report on.
    SkippedNoSources,
}

/// One side of the comparison: the tag identifying its API descriptor plus
/// the tree it is generated from.
struct Side {
    /// Descriptor tag, also the `oldapi`/`newapi` identifier.
    tag:        String,
    /// Root of the source tree.
    root:       PathBuf,
    /// Project model describing the tree's layout.
    descriptor: ProjectDescriptor,
}

/// Sequences a report run: resolve both versions, fetch the historical
/// tree, generate one API descriptor per side, then generate the diff.
///
/// Collaborators are injected so hosts and tests can substitute them.
pub struct ReportDriver<'a> {
    /// Run configuration.
    config:       ReportConfig,
    /// The current project.
    project:      ProjectDescriptor,
    /// Root of the current checkout.
    project_root: PathBuf,
    /// Published-version lookup.
    metadata:     &'a dyn VersionMetadata,
    /// Source-control client.
    scm:          &'a dyn ScmClient,
}

impl<'a> ReportDriver<'a> {
    /// Creates a driver over the given project and collaborators.
    pub fn new(
        config: ReportConfig,
        project: ProjectDescriptor,
        project_root: PathBuf,
        metadata: &'a dyn VersionMetadata,
        scm: &'a dyn ScmClient,
    ) -> Self {
        Self {
            config,
            project,
            project_root,
            metadata,
            scm,
        }
    }

    /// Runs the report to completion.
    ///
    /// Any error in the resolve or generate phases aborts the run; only the
    /// final asset copy is allowed to fail without propagating.
    pub fn generate(&self) -> Result<ReportOutcome, ReportError> {
        info!("Generating {}", self.config.title);
        debug!("{}", self.config.description);

        if !self.project.can_generate_report() {
            info!("Project has no Java source roots, skipping report generation");
            return Ok(ReportOutcome::SkippedNoSources);
        }

        let comparison_spec = self
            .config
            .comparison_version
            .clone()
            .unwrap_or_else(|| format!("(,{})", self.project.version));
        let base_tag = self
            .config
            .base_version
            .clone()
            .unwrap_or_else(|| self.project.version.clone());

        let old_side = match resolve_comparison(
            &comparison_spec,
            &self.project.version,
            &self.project.coordinates(),
            self.metadata,
        )? {
            Resolution::CurrentTree => self.current_side(self.project.version.clone()),
            Resolution::Prior(resolved) => self.fetch_side(resolved.tag())?,
            Resolution::NoPriorVersion => {
                info!("Unable to find a previous version of the project in the repository");
                return Ok(ReportOutcome::SkippedNoPriorVersion);
            }
        };
        let new_side = self.current_side(base_tag);

        let working_dir = self.prepared_dir(&self.config.working_directory)?;
        let javadoc = locate_javadoc(
            self.config.javadoc_executable.as_deref(),
            self.config.toolchain_home.as_deref(),
        )?;

        let mut packages = BTreeSet::new();
        for side in [&old_side, &new_side] {
            packages.extend(self.generate_descriptor(&javadoc, side, &working_dir)?);
        }

        let output_dir = self.prepared_dir(&self.config.report_output_directory)?;
        self.generate_diff(&javadoc, &old_side, &new_side, &packages, &working_dir, &output_dir)?;

        // a missing placeholder image only degrades the rendered page
        if let Err(e) = fs::write(output_dir.join(REPORT_ASSET_NAME), REPORT_ASSET) {
            warn!("Could not copy {REPORT_ASSET_NAME}: {e}");
        }

        info!("API difference report written to {}", output_dir.display());
        Ok(ReportOutcome::Generated {
            output_directory: output_dir,
            old_api: old_side.tag,
            new_api: new_side.tag,
            packages,
        })
    }

    /// The current checkout as a comparison side with the given tag.
    fn current_side(&self, tag: String) -> Side {
        Side {
            tag,
            root: self.project_root.clone(),
            descriptor: self.project.clone(),
        }
    }

    /// Fetches the historical tree for `tag` into the working directory and
    /// describes it as a comparison side.
    ///
    /// The checkout reuses the current project's layout when it carries no
    /// descriptor of its own.
    fn fetch_side(&self, tag: String) -> Result<Side, ReportError> {
        let checkout_dir = self.config.working_directory.join(&tag);
        let connection = ScmConnection::parse(self.project.connection()?)?;

        fetch_sources(self.scm, &connection, &checkout_dir, self.config.force_checkout)?;

        let descriptor_path = checkout_dir.join(PROJECT_DESCRIPTOR);
        let descriptor = if descriptor_path.is_file() {
            ProjectDescriptor::load(&descriptor_path)?
        } else {
            debug!(
                "Checkout carries no {PROJECT_DESCRIPTOR}, assuming the current project layout"
            );
            let mut descriptor = self.project.clone();
            descriptor.version = tag.clone();
            descriptor
        };

        Ok(Side {
            tag,
            root: checkout_dir,
            descriptor,
        })
    }

    /// Generates the API descriptor for one side, returning the packages it
    /// was generated over.
    fn generate_descriptor(
        &self,
        javadoc: &Path,
        side: &Side,
        working_dir: &Path,
    ) -> Result<BTreeSet<String>, ReportError> {
        info!("Generating API descriptor for {}", side.tag);

        let packages = self.side_packages(side)?;

        let mut command = JavadocCommand::new(javadoc.to_path_buf());
        command.arg_pair("doclet", DIFF_DOCLET);
        command.arg_pair("docletpath", &self.config.doclet_path);
        command.arg_pair("apiname", &side.tag);
        command.arg_pair("apidir", working_dir.display().to_string());

        if let Some(classpath) = self.classpath_of(side) {
            command.arg_pair("classpath", quote_and_escape(&classpath, '\''));
        }
        command.arg_pair(
            "sourcepath",
            quote_and_escape(&join_paths(&side.descriptor.source_roots_in(&side.root)), '\''),
        );

        for package in &packages {
            command.arg(package);
        }

        command.run(working_dir)?;
        Ok(packages)
    }

    /// Generates the diff report over the two descriptors.
    fn generate_diff(
        &self,
        javadoc: &Path,
        old_side: &Side,
        new_side: &Side,
        packages: &BTreeSet<String>,
        working_dir: &Path,
        output_dir: &Path,
    ) -> Result<(), ReportError> {
        info!("Generating API difference report for {} vs {}", old_side.tag, new_side.tag);

        let mut command = JavadocCommand::new(javadoc.to_path_buf());
        command.arg("-private");
        command.arg_pair("d", output_dir.display().to_string());
        command.arg_pair(
            "sourcepath",
            join_paths(&new_side.descriptor.source_roots_in(&new_side.root)),
        );
        if let Some(classpath) = self.classpath_of(new_side) {
            command.arg_pair("classpath", quote_and_escape(&classpath, '\''));
        }
        command.arg_pair("doclet", DIFF_DOCLET);
        command.arg_pair("docletpath", &self.config.doclet_path);
        command.arg_pair("oldapi", &old_side.tag);
        command.arg_pair("newapi", &new_side.tag);
        command.arg("-stats");

        for package in packages {
            command.arg(package);
        }

        command.run(working_dir)
    }

    /// The packages a side's descriptor covers: the explicit include list
    /// when configured, discovery over the side's source roots otherwise.
    fn side_packages(&self, side: &Side) -> Result<BTreeSet<String>, ReportError> {
        if let Some(includes) = &self.config.include_packages {
            debug!("Included packages (overriding discovery): {includes:?}");
            return Ok(includes.iter().cloned().collect());
        }
        let roots = side.descriptor.source_roots_in(&side.root);
        Ok(discover_packages(&roots)?)
    }

    /// Classpath of a side: its build output directory plus any declared
    /// classpath elements, resolved against the side's root.
    fn classpath_of(&self, side: &Side) -> Option<String> {
        let mut elements: Vec<PathBuf> = Vec::new();
        if let Some(out) = &side.descriptor.build_output_directory {
            elements.push(side.root.join(out));
        }
        elements.extend(
            side.descriptor
                .classpath_elements
                .iter()
                .map(|element| side.root.join(element)),
        );

        (!elements.is_empty()).then(|| join_paths(&elements))
    }

    /// Creates a directory if needed and returns its canonical form.
    /// Creation is a no-op when the directory already exists.
    fn prepared_dir(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Could not canonicalize {}", dir.display()))?;
        Ok(dir)
    }
}

/// Joins paths with the platform classpath separator.
fn join_paths(elements: &[PathBuf]) -> String {
    let separator = if cfg!(windows) { ";" } else { ":" };
    elements.iter().map(|p| p.display().to_string()).join(separator)
}
