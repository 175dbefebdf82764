// SPDX-License-Identifier: MIT

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn parses_one_name_per_line() {
    let mut f = NamedTempFile::new().expect("tmp file");
    writeln!(f, "build-linux").expect("write");
    writeln!(f).expect("write");
    writeln!(f, "build-windows").expect("write");
    let names = parse_legacy_file(f.path()).expect("parse");
    assert_eq!(names, vec!["build-linux", "build-windows"]);
}

#[test]
fn empty_file_yields_empty_list() {
    let f = NamedTempFile::new().expect("tmp file");
    let names = parse_legacy_file(f.path()).expect("parse");
    assert!(names.is_empty());
}

#[test]
fn missing_file_errors() {
    let result = parse_legacy_file(std::path::Path::new("/nonexistent/legacy.txt"));
    assert!(result.is_err());
}
