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

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use clap::Error as ClapError;

#[derive(Debug)]
pub enum CliError {
    /// A subcommand requires one or more arguments, but none were provided.
    RequiresArgs,
    /// A non-existent subcommand was specified.
    InvalidSubcommand,
    /// An error was detected by `clap`.
    ClapError(ClapError),
    /// A general error encountered by a subcommand.
    ActionError(String),
    /// The environment is not in the correct state to execute the subcommand as requested.
    EnvironmentError(String),
    /// The role file path does not resolve to an existing file.
    InputNotFound(PathBuf),
    /// The role file produced no records.
    EmptyInput(PathBuf),
    /// A role file header or record does not match the expected columns.
    SchemaMismatch(String),
    /// The role file format could not be determined from its extension.
    UnsupportedFormat(String),
    /// Credentials could not be exchanged for an access token.
    Authentication(String),
    /// A role with the requested display name already exists and `--force` was not given.
    NameConflict(String),
    /// The role service answered a request with a non-success response.
    RemoteService {
        status: Option<u16>,
        message: String,
    },
}

impl Error for CliError {}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::RequiresArgs => write!(
                f,
                "The specified subcommand requires arguments, but none were provided"
            ),
            CliError::InvalidSubcommand => write!(f, "An invalid subcommand was specified"),
            CliError::ClapError(err) => f.write_str(&err.message),
            CliError::ActionError(msg) => write!(f, "Subcommand encountered an error: {}", msg),
            CliError::EnvironmentError(msg) => {
                write!(f, "Environment not valid for subcommand: {}", msg)
            }
            CliError::InputNotFound(path) => {
                write!(f, "Input file not found: {}", path.display())
            }
            CliError::EmptyInput(path) => {
                write!(f, "Input file contains no records: {}", path.display())
            }
            CliError::SchemaMismatch(msg) => write!(f, "Input file schema mismatch: {}", msg),
            CliError::UnsupportedFormat(msg) => write!(f, "Unsupported input format: {}", msg),
            CliError::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            CliError::NameConflict(name) => write!(
                f,
                "A role named '{}' already exists; use --force to replace it",
                name
            ),
            CliError::RemoteService {
                status: Some(status),
                message,
            } => write!(
                f,
                "Role service request failed with status code '{}': {}",
                status, message
            ),
            CliError::RemoteService {
                status: None,
                message,
            } => write!(f, "Role service request failed: {}", message),
        }
    }
}

impl From<ClapError> for CliError {
    fn from(err: ClapError) -> Self {
        Self::ClapError(err)
    }
}
