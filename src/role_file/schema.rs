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

use csv::StringRecord;

use crate::error::CliError;

use super::ResourceActionRecord;

const RESOURCE_ACTION_COLUMN: &str = "ResourceAction";
const ALLOWED_COLUMN: &str = "Allowed";
const DESCRIPTION_COLUMN: &str = "Description";

/// The columns a delimited role file is expected to carry.
pub struct RoleFileSchema {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

pub const ROLE_FILE_SCHEMA: RoleFileSchema = RoleFileSchema {
    required: &[RESOURCE_ACTION_COLUMN, ALLOWED_COLUMN],
    optional: &[DESCRIPTION_COLUMN],
};

/// Positions of the known columns within a validated header.
#[derive(Debug, PartialEq)]
pub struct Columns {
    width: usize,
    resource_action: usize,
    allowed: usize,
    description: Option<usize>,
}

impl RoleFileSchema {
    /// Checks the header against the schema and locates the known columns.
    ///
    /// Required columns must appear exactly once. Unknown columns are ignored.
    pub fn validate_header(&self, header: &StringRecord) -> Result<Columns, CliError> {
        for name in self.required.iter().chain(self.optional.iter()) {
            if header.iter().filter(|field| field == name).count() > 1 {
                return Err(CliError::SchemaMismatch(format!(
                    "column '{}' appears more than once in the header",
                    name
                )));
            }
        }

        let position = |name: &str| header.iter().position(|field| field == name);

        let resource_action = position(RESOURCE_ACTION_COLUMN)
            .ok_or_else(|| missing_column(RESOURCE_ACTION_COLUMN))?;
        let allowed = position(ALLOWED_COLUMN).ok_or_else(|| missing_column(ALLOWED_COLUMN))?;

        for field in header.iter() {
            if !self.required.contains(&field) && !self.optional.contains(&field) {
                debug!("Ignoring unexpected column '{}'", field);
            }
        }

        Ok(Columns {
            width: header.len(),
            resource_action,
            allowed,
            description: position(DESCRIPTION_COLUMN),
        })
    }
}

impl Columns {
    /// Converts one data record, failing if its field count differs from the header.
    pub fn record(&self, record: &StringRecord) -> Result<ResourceActionRecord, CliError> {
        let line = record
            .position()
            .map(|pos| pos.line().to_string())
            .unwrap_or_else(|| "?".into());

        if record.len() != self.width {
            return Err(CliError::SchemaMismatch(format!(
                "record on line {} has {} fields, but the header has {}",
                line,
                record.len(),
                self.width
            )));
        }

        // Indexes are below `width`, which was just checked
        let resource_action = record[self.resource_action].to_string();
        let allowed_token = &record[self.allowed];

        let allowed = allowed_token.eq_ignore_ascii_case("yes");
        if !allowed && !allowed_token.eq_ignore_ascii_case("no") {
            warn!(
                "Line {}: '{}' is not Yes or No; {} will not be allowed",
                line, allowed_token, resource_action
            );
        }

        Ok(ResourceActionRecord {
            resource_action,
            allowed,
            description: self
                .description
                .map(|index| record[index].to_string())
                .filter(|desc| !desc.is_empty()),
        })
    }
}

fn missing_column(name: &str) -> CliError {
    CliError::SchemaMismatch(format!("required column '{}' is missing", name))
}
