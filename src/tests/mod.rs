// Copyright 2018-2022 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This module provides tests that drive `run` with full command lines for the
//! `intune-rbac role create` paths that never reach the role service: dry runs and input errors.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::{run, CliError};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).expect("Failed to create role file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write role file");
    path
}

/// Run `intune-rbac role create <path> Readers "Read only" <extra...>`.
fn create_role(path: &PathBuf, extra: &[&str]) -> Result<(), CliError> {
    let path = path.to_str().expect("Temp path is not valid UTF-8");
    let mut args = vec![
        "intune-rbac",
        "-q",
        "role",
        "create",
        path,
        "Readers",
        "Read only",
    ];
    args.extend_from_slice(extra);
    run(args)
}

/// Verify that a dry run of a delimited file and of a line-oriented file succeeds without
/// credentials.
#[test]
fn create_dry_run() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let csv = write_file(
        &dir,
        "role.csv",
        "ResourceAction,Allowed\nAndroidFota_Read,Yes\nAndroidFota_Assign,No\n",
    );
    create_role(&csv, &["--dry-run"]).expect("Dry run of csv file failed");

    let lines = write_file(&dir, "role.txt", "ManagedDevices_Read\n");
    create_role(&lines, &["--dry-run"]).expect("Dry run of line file failed");
}

/// Verify that a file that allows nothing still produces a role by default, and is refused only
/// when --require-actions is given.
#[test]
fn create_with_nothing_allowed() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(&dir, "role.csv", "ResourceAction,Allowed\nAndroidFota_Assign,No\n");

    create_role(&path, &["--dry-run"]).expect("Dry run of file allowing nothing failed");

    assert!(matches!(
        create_role(&path, &["--dry-run", "--require-actions"]),
        Err(CliError::ActionError(_))
    ));
}

/// Verify that input problems are reported before any credentials are needed:
/// 1. A missing file
/// 2. An empty file
/// 3. A delimited file without the Allowed column
/// 4. An unsupported extension
/// 5. An unsupported extension with an explicit --format
#[test]
fn create_input_errors() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let missing = dir.path().join("missing.csv");
    assert!(matches!(
        create_role(&missing, &[]),
        Err(CliError::InputNotFound(_))
    ));

    let empty = write_file(&dir, "empty.txt", "");
    assert!(matches!(
        create_role(&empty, &[]),
        Err(CliError::EmptyInput(_))
    ));

    let no_allowed = write_file(&dir, "role.csv", "ResourceAction\nAndroidFota_Read\n");
    assert!(matches!(
        create_role(&no_allowed, &[]),
        Err(CliError::SchemaMismatch(_))
    ));

    let json = write_file(&dir, "role.json", "[\"AndroidFota_Read\"]\n");
    match create_role(&json, &[]) {
        Err(CliError::UnsupportedFormat(msg)) => assert!(msg.contains(".json")),
        res => panic!("Expected UnsupportedFormat, got {:?}", res),
    }
    create_role(&json, &["--format", "lines", "--dry-run"])
        .expect("Dry run with explicit format failed");
}

/// Verify that clap rejects a create command without a description.
#[test]
fn create_requires_description() {
    let result = run(vec!["intune-rbac", "role", "create", "role.csv", "Readers"]);

    assert!(matches!(result, Err(CliError::ClapError(_))));
}
