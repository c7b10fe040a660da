#![cfg(unix)]

use std::{fs, path::PathBuf};

use apidiff::{ReportError, locator::locate_javadoc};
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("apidiff-locator-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

#[test]
fn explicit_file_override_returns_canonical_path() {
    let root = temp_root();
    let exe = root.join("javadoc");
    fs::write(&exe, b"#!/bin/sh\n").expect("write stub");

    let located = locate_javadoc(Some(exe.as_path()), None).expect("locate via override");
    assert_eq!(located, exe.canonicalize().expect("canonicalize"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn directory_override_appends_tool_name() {
    let root = temp_root();
    fs::write(root.join("javadoc"), b"#!/bin/sh\n").expect("write stub");

    let located = locate_javadoc(Some(root.as_path()), None).expect("locate via directory");
    assert_eq!(
        located,
        root.canonicalize().expect("canonicalize").join("javadoc")
    );

    let _ = fs::remove_dir_all(root);
}

#[test]
fn invalid_override_is_a_distinct_error() {
    let root = temp_root();
    let missing = root.join("no-such-javadoc");

    let result = locate_javadoc(Some(missing.as_path()), None);
    assert!(matches!(
        result,
        Err(ReportError::InvalidExecutableOverride { .. })
    ));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn toolchain_home_resolves_under_bin() {
    let root = temp_root();
    fs::create_dir_all(root.join("bin")).expect("create bin");
    fs::write(root.join("bin/javadoc"), b"#!/bin/sh\n").expect("write stub");

    let located = locate_javadoc(None, Some(root.as_path())).expect("locate via toolchain");
    assert_eq!(
        located,
        root.canonicalize()
            .expect("canonicalize")
            .join("bin")
            .join("javadoc")
    );

    let _ = fs::remove_dir_all(root);
}

#[test]
fn explicit_override_wins_over_toolchain() {
    let root = temp_root();
    let exe = root.join("javadoc");
    fs::write(&exe, b"#!/bin/sh\n").expect("write stub");
    fs::create_dir_all(root.join("toolchain/bin")).expect("create toolchain");
    fs::write(root.join("toolchain/bin/javadoc"), b"#!/bin/sh\n").expect("write stub");

    let toolchain = root.join("toolchain");
    let located =
        locate_javadoc(Some(exe.as_path()), Some(toolchain.as_path())).expect("locate via override");
    assert_eq!(located, exe.canonicalize().expect("canonicalize"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_toolchain_tool_is_an_invalid_override() {
    let root = temp_root();
    fs::create_dir_all(root.join("bin")).expect("create bin");

    let result = locate_javadoc(None, Some(root.as_path()));
    assert!(matches!(
        result,
        Err(ReportError::InvalidExecutableOverride { .. })
    ));

    let _ = fs::remove_dir_all(root);
}
