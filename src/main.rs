#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # apidiff
//!
//! Command-line front end for generating an API difference report between
//! two versions of a Java project. Reads the project descriptor
//! (`apidiff.json`), resolves the version to compare against, fetches its
//! sources, and drives javadoc with the JDiff doclet.

use std::path::PathBuf;

use anyhow::{Context, Result};
use apidiff::{
    GitScm, LocalRepositoryMetadata, ProjectDescriptor, ReportConfig, ReportDriver, ReportOutcome,
    constants::{DEFAULT_DEST_DIR, DEFAULT_REPORTING_DIR, DEFAULT_WORKING_DIR, PROJECT_DESCRIPTOR},
    project::parse_include_packages,
};
use bpaf::*;
use dotenvy::dotenv;
use tracing::{Level, info, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Parsed command-line options for a report run.
#[derive(Debug, Clone)]
struct Opts {
    /// Version constraint for the left-hand side of the report.
    comparison_version: Option<String>,
    /// The base code version labelling the right-hand side.
    base_version:       Option<String>,
    /// Force a checkout instead of an update of previously fetched sources.
    force_checkout:     bool,
    /// Explicit javadoc executable.
    javadoc_executable: Option<PathBuf>,
    /// JDK toolchain home whose `bin/javadoc` should be used.
    toolchain:          Option<PathBuf>,
    /// Destination directory for the rendered report.
    output_directory:   Option<PathBuf>,
    /// Working directory for checkouts and descriptors.
    working_directory:  Option<PathBuf>,
    /// Space-separated packages to include, overriding discovery.
    include_packages:   Option<String>,
    /// Path passed to `-docletpath`, locating the JDiff doclet.
    doclet_path:        String,
    /// Root of the local repository used for version metadata.
    local_repository:   Option<PathBuf>,
    /// Path of the project descriptor file.
    project:            Option<PathBuf>,
}

/// Parse the command line arguments and return an `Opts` struct.
fn options() -> Opts {
    let comparison_version = long("comparison-version")
        .help("Version to compare the base code against, e.g. '(,2.0)'")
        .argument::<String>("SPEC")
        .optional();

    let base_version = long("base-version")
        .help("The base code version, the right-hand side of the report")
        .argument::<String>("VERSION")
        .optional();

    let force_checkout = long("force-checkout")
        .help("Force a checkout instead of an update of previously fetched sources")
        .switch();

    let javadoc_executable = long("javadoc-executable")
        .help("Explicit javadoc executable or the directory holding it")
        .argument::<PathBuf>("PATH")
        .optional();

    let toolchain = long("toolchain")
        .help("JDK home whose bin/javadoc should be used")
        .argument::<PathBuf>("DIR")
        .optional();

    let output_directory = long("output-directory")
        .help("Destination directory for the rendered report")
        .argument::<PathBuf>("DIR")
        .optional();

    let working_directory = long("working-directory")
        .help("Working directory for checkouts and API descriptors")
        .argument::<PathBuf>("DIR")
        .optional();

    let include_packages = long("include-packages")
        .help("Space-separated packages to report on, overriding discovery")
        .argument::<String>("PACKAGES")
        .optional();

    let doclet_path = long("doclet-path")
        .help("Classpath locating the JDiff doclet jar(s)")
        .argument::<String>("PATH");

    let local_repository = long("local-repository")
        .help("Local repository root used to enumerate published versions")
        .argument::<PathBuf>("DIR")
        .optional();

    let project = long("project")
        .help("Path of the project descriptor (default: apidiff.json)")
        .argument::<PathBuf>("FILE")
        .optional();

    construct!(Opts {
        comparison_version,
        base_version,
        force_checkout,
        javadoc_executable,
        toolchain,
        output_directory,
        working_directory,
        include_packages,
        doclet_path,
        local_repository,
        project,
    })
    .to_options()
    .descr("Generates an API difference report between two versions of a Java project")
    .run()
}

fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let opts = options();

    let project_path = opts
        .project
        .unwrap_or_else(|| PathBuf::from(PROJECT_DESCRIPTOR));
    let project = ProjectDescriptor::load(&project_path)?;
    let project_root = match project_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    };

    let local_repository = opts.local_repository.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".m2")
            .join("repository")
    });

    let mut config = ReportConfig::builder()
        .force_checkout(opts.force_checkout)
        .report_output_directory(opts.output_directory.unwrap_or_else(|| {
            project_root.join(DEFAULT_REPORTING_DIR).join(DEFAULT_DEST_DIR)
        }))
        .working_directory(
            opts.working_directory
                .unwrap_or_else(|| project_root.join(DEFAULT_WORKING_DIR)),
        )
        .doclet_path(opts.doclet_path)
        .build();
    config.comparison_version = opts.comparison_version;
    config.base_version = opts.base_version;
    config.javadoc_executable = opts.javadoc_executable;
    config.toolchain_home = opts.toolchain;
    config.include_packages = opts
        .include_packages
        .as_deref()
        .map(|names| parse_include_packages(names).into_iter().collect());

    let metadata = LocalRepositoryMetadata::new(local_repository);
    let scm = GitScm;

    let driver = ReportDriver::new(config, project, project_root, &metadata, &scm);
    match driver
        .generate()
        .context("An error has occurred in API difference report generation")?
    {
        ReportOutcome::Generated {
            output_directory,
            old_api,
            new_api,
            ..
        } => info!(
            "Compared {old_api} against {new_api}, report at {}",
            output_directory.display()
        ),
        ReportOutcome::SkippedNoPriorVersion => {
            info!("No prior version to compare against, report skipped")
        }
        ReportOutcome::SkippedNoSources => info!("Nothing to report on, report skipped"),
    }

    Ok(())
}
