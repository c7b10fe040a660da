#![cfg(unix)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use apidiff::{
    ReportError,
    project::{ProjectDescriptor, ScmInfo},
    report::{ReportConfig, ReportDriver, ReportOutcome},
    scm::{ScmClient, ScmConnection},
    version::{ArtifactVersion, Coordinates, VersionMetadata},
};
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("apidiff-driver-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

/// Writes a stub javadoc that records each invocation's arguments, one line
/// per run, next to itself.
fn write_stub_javadoc(dir: &Path, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("javadoc");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$*\" >> \"$(dirname \"$0\")/argv.log\"\nexit {exit_code}\n"
    );
    fs::write(&path, script).expect("write stub javadoc");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("mark executable");
    path
}

fn write_java_file(root: &Path, relative: &str, package: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create source dirs");
    fs::write(&path, format!("package {package};\n\npublic class Placeholder {{}}\n"))
        .expect("write java file");
}

fn project(with_scm: bool) -> ProjectDescriptor {
    ProjectDescriptor {
        group_id:               "com.example".to_string(),
        artifact_id:            "widget".to_string(),
        version:                "2.0".to_string(),
        packaging:              "jar".to_string(),
        scm:                    with_scm.then(|| ScmInfo {
            connection:           Some("scm:git:https://example.org/widget.git".to_string()),
            developer_connection: None,
        }),
        source_roots:           vec![PathBuf::from("src/main/java")],
        build_output_directory: None,
        classpath_elements:     vec![],
    }
}

fn config(root: &Path, javadoc: PathBuf) -> ReportConfig {
    ReportConfig::builder()
        .comparison_version("(,2.0)")
        .javadoc_executable(javadoc)
        .report_output_directory(root.join("target/site/apidocs"))
        .working_directory(root.join("target/apidiff"))
        .doclet_path("jdiff.jar")
        .build()
}

/// Metadata source answering with a fixed version list.
struct FixedVersions(Vec<&'static str>);

impl VersionMetadata for FixedVersions {
    fn available_versions(&self, _: &Coordinates) -> anyhow::Result<Vec<ArtifactVersion>> {
        Ok(self.0.iter().map(|v| ArtifactVersion::new(v)).collect())
    }
}

/// SCM client that materializes a fixed historical tree on checkout.
struct TreeWritingScm;

impl ScmClient for TreeWritingScm {
    fn checkout(&self, _: &ScmConnection, target: &Path) -> Result<(), ReportError> {
        write_java_file(target, "src/main/java/com/example/legacy/Old.java", "com.example.legacy");
        Ok(())
    }

    fn update(&self, _: &ScmConnection, _: &Path) -> Result<(), ReportError> {
        Ok(())
    }
}

fn argv_lines(root: &Path) -> Vec<String> {
    let log = fs::read_to_string(root.join("argv.log")).expect("read argv log");
    log.lines().map(str::to_string).collect()
}

#[test]
fn full_run_generates_descriptors_then_diff() {
    let root = temp_root();
    write_java_file(&root, "src/main/java/com/example/Widget.java", "com.example");
    let javadoc = write_stub_javadoc(&root, 0);

    let metadata = FixedVersions(vec!["1.0", "1.1-SNAPSHOT"]);
    let driver = ReportDriver::new(
        config(&root, javadoc),
        project(true),
        root.clone(),
        &metadata,
        &TreeWritingScm,
    );

    let outcome = driver.generate().expect("generate report");
    match outcome {
        ReportOutcome::Generated {
            old_api,
            new_api,
            packages,
            output_directory,
        } => {
            assert_eq!(old_api, "1.0");
            assert_eq!(new_api, "2.0");
            assert_eq!(
                packages.into_iter().collect::<Vec<_>>(),
                vec!["com.example".to_string(), "com.example.legacy".to_string()]
            );
            assert!(output_directory.join("black.gif").is_file());
        }
        other => panic!("expected a generated report, got {other:?}"),
    }

    // the checkout landed under the working directory, named after the
    // resolved version
    assert!(root.join("target/apidiff/1.0/src/main/java").is_dir());

    let lines = argv_lines(&root);
    assert_eq!(lines.len(), 3, "two descriptor runs and one diff run");

    assert!(lines[0].contains("-apiname 1.0"));
    assert!(lines[0].contains("com.example.legacy"));
    assert!(lines[1].contains("-apiname 2.0"));
    assert!(lines[1].contains("com.example"));

    assert!(lines[2].contains("-private"));
    assert!(lines[2].contains("-oldapi 1.0"));
    assert!(lines[2].contains("-newapi 2.0"));
    assert!(lines[2].contains("-stats"));
    // the diff is told the union of packages discovered on both sides
    assert!(lines[2].contains("com.example"));
    assert!(lines[2].contains("com.example.legacy"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_scm_connection_fails_before_any_checkout() {
    let root = temp_root();
    write_java_file(&root, "src/main/java/com/example/Widget.java", "com.example");
    let javadoc = write_stub_javadoc(&root, 0);

    let metadata = FixedVersions(vec!["1.0"]);
    let driver = ReportDriver::new(
        config(&root, javadoc),
        project(false),
        root.clone(),
        &metadata,
        &TreeWritingScm,
    );

    let result = driver.generate();
    assert!(matches!(result, Err(ReportError::MissingScmConnection)));
    assert!(
        !root.join("target/apidiff/1.0").exists(),
        "no checkout directory may be created"
    );

    let _ = fs::remove_dir_all(root);
}

#[test]
fn no_prior_version_skips_the_report() {
    let root = temp_root();
    write_java_file(&root, "src/main/java/com/example/Widget.java", "com.example");
    let javadoc = write_stub_javadoc(&root, 0);

    let metadata = FixedVersions(vec![]);
    let driver = ReportDriver::new(
        config(&root, javadoc),
        project(true),
        root.clone(),
        &metadata,
        &TreeWritingScm,
    );

    let outcome = driver.generate().expect("generate");
    assert!(matches!(outcome, ReportOutcome::SkippedNoPriorVersion));
    assert!(!root.join("argv.log").exists(), "the tool must not run");

    let _ = fs::remove_dir_all(root);
}

#[test]
fn include_packages_override_discovery() {
    let root = temp_root();
    write_java_file(&root, "src/main/java/com/example/Widget.java", "com.example");
    write_java_file(&root, "src/main/java/com/example/extra/Gizmo.java", "com.example.extra");
    let javadoc = write_stub_javadoc(&root, 0);

    let mut config = config(&root, javadoc);
    config.include_packages = Some(vec!["com.example".to_string()]);

    let metadata = FixedVersions(vec!["1.0"]);
    let driver =
        ReportDriver::new(config, project(true), root.clone(), &metadata, &TreeWritingScm);

    driver.generate().expect("generate report");

    let lines = argv_lines(&root);
    for line in &lines {
        assert!(
            !line.contains("com.example.extra") && !line.contains("com.example.legacy"),
            "discovery must be bypassed: {line}"
        );
    }

    let _ = fs::remove_dir_all(root);
}

#[test]
fn failing_tool_aborts_the_run() {
    let root = temp_root();
    write_java_file(&root, "src/main/java/com/example/Widget.java", "com.example");
    let javadoc = write_stub_javadoc(&root, 1);

    let metadata = FixedVersions(vec!["1.0"]);
    let driver = ReportDriver::new(
        config(&root, javadoc),
        project(true),
        root.clone(),
        &metadata,
        &TreeWritingScm,
    );

    let result = driver.generate();
    assert!(matches!(result, Err(ReportError::ProcessExit { .. })));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn pom_projects_are_skipped() {
    let root = temp_root();
    let javadoc = write_stub_javadoc(&root, 0);

    let mut pom_project = project(true);
    pom_project.packaging = "pom".to_string();

    let metadata = FixedVersions(vec!["1.0"]);
    let driver = ReportDriver::new(
        config(&root, javadoc),
        pom_project,
        root.clone(),
        &metadata,
        &TreeWritingScm,
    );

    let outcome = driver.generate().expect("generate");
    assert!(matches!(outcome, ReportOutcome::SkippedNoSources));
    assert!(!root.join("argv.log").exists(), "the tool must not run");

    let _ = fs::remove_dir_all(root);
}
