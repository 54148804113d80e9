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

//! Reads role permission files and turns them into Intune resource action identifiers.
//!
//! Two formats are understood:
//!
//! * a line-oriented list, one resource action per line and no header (`.txt`, `.lst`)
//! * a delimited file with a `ResourceAction,Allowed[,Description]` header (`.csv`)

mod loader;
mod mapper;
mod schema;

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use crate::error::CliError;

pub use loader::load_role_file;
pub use mapper::map_actions;
pub use schema::ROLE_FILE_SCHEMA;

/// Namespace prepended to every resource action to form the permission identifier.
pub const PROVIDER_PREFIX: &str = "Microsoft.Intune";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputFormat {
    /// One resource action per line.
    Lines,
    /// Header row plus `ResourceAction`/`Allowed` records.
    Delimited,
}

impl InputFormat {
    /// Selects the format from the file extension of the given path.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| {
                CliError::UnsupportedFormat(format!(
                    "{} has no file extension; expected .csv, .txt or .lst",
                    path.display()
                ))
            })?;

        match extension.as_str() {
            "csv" => Ok(InputFormat::Delimited),
            "txt" | "lst" => Ok(InputFormat::Lines),
            _ => Err(CliError::UnsupportedFormat(format!(
                "'.{}' is not a supported extension; expected .csv, .txt or .lst",
                extension
            ))),
        }
    }
}

impl FromStr for InputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(InputFormat::Delimited),
            "lines" => Ok(InputFormat::Lines),
            _ => Err(CliError::UnsupportedFormat(format!(
                "'{}' is not a supported format; expected csv or lines",
                s
            ))),
        }
    }
}

/// A single row of a delimited role file.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceActionRecord {
    pub resource_action: String,
    pub allowed: bool,
    pub description: Option<String>,
}

/// The parsed contents of a role file.
#[derive(Debug, PartialEq)]
pub enum RoleFile {
    Lines(Vec<String>),
    Records(Vec<ResourceActionRecord>),
}

impl RoleFile {
    pub fn len(&self) -> usize {
        match self {
            RoleFile::Lines(lines) => lines.len(),
            RoleFile::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the permission identifiers granted by this file.
    pub fn permissions(&self) -> BTreeSet<String> {
        map_actions(self)
    }
}
