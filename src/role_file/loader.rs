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

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::CliError;

use super::{InputFormat, ResourceActionRecord, RoleFile, ROLE_FILE_SCHEMA};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Loads and validates the role file at `path`.
///
/// If `format` is `None` the format is selected from the file extension.
pub fn load_role_file(path: &Path, format: Option<InputFormat>) -> Result<RoleFile, CliError> {
    if !path.is_file() {
        return Err(CliError::InputNotFound(path.to_path_buf()));
    }

    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(path)?,
    };

    let contents = fs::read_to_string(path).map_err(|err| {
        CliError::ActionError(format!("Unable to read {}: {}", path.display(), err))
    })?;
    let contents = contents.trim_start_matches(BYTE_ORDER_MARK);

    if contents.trim().is_empty() {
        return Err(CliError::EmptyInput(path.to_path_buf()));
    }

    let role_file = match format {
        InputFormat::Lines => RoleFile::Lines(parse_lines(contents)),
        InputFormat::Delimited => RoleFile::Records(parse_records(contents)?),
    };

    if role_file.is_empty() {
        return Err(CliError::EmptyInput(path.to_path_buf()));
    }

    debug!(
        "Loaded {} entries from {} ({:?})",
        role_file.len(),
        path.display(),
        format
    );

    Ok(role_file)
}

fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}

fn parse_records(contents: &str) -> Result<Vec<ResourceActionRecord>, CliError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(contents.as_bytes());

    let header = reader
        .headers()
        .map_err(|err| CliError::SchemaMismatch(format!("unable to read header: {}", err)))?
        .clone();
    let columns = ROLE_FILE_SCHEMA.validate_header(&header)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|err| CliError::SchemaMismatch(format!("unable to read record: {}", err)))?;
        records.push(columns.record(&record)?);
    }

    Ok(records)
}
