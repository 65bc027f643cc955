//! Conformance tests that run YAML fixtures against mongory
//!
//! Run with: cargo test -p mongory-test --test conformance

#![cfg(feature = "fixtures")]

use mongory_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the fixtures directory relative to the workspace root
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent() // ext
        .and_then(Path::parent) // workspace root
        .expect("Could not find workspace root")
        .join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    assert!(dir.exists(), "Fixtures directory does not exist: {}", dir.display());

    let engine = mongory_test::engine();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());
        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert(&engine);
        }
    }
}

#[test]
fn test_comparison() {
    run_fixtures_in_dir(&fixtures_dir().join("01_comparison"));
}

#[test]
fn test_logical() {
    run_fixtures_in_dir(&fixtures_dir().join("02_logical"));
}

#[test]
fn test_arrays() {
    run_fixtures_in_dir(&fixtures_dir().join("03_arrays"));
}

#[test]
fn test_semantics() {
    run_fixtures_in_dir(&fixtures_dir().join("04_semantics"));
}

#[test]
fn test_validation() {
    run_fixtures_in_dir(&fixtures_dir().join("05_validation"));
}

#[test]
fn test_extensions() {
    run_fixtures_in_dir(&fixtures_dir().join("06_extensions"));
}
