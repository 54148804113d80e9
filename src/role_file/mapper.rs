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

use std::collections::BTreeSet;

use super::{RoleFile, PROVIDER_PREFIX};

/// Qualifies a resource action with the provider prefix, e.g.
/// `ManagedDevices_Read` becomes `Microsoft.Intune_ManagedDevices_Read`.
pub fn permission_identifier(resource_action: &str) -> String {
    format!("{}_{}", PROVIDER_PREFIX, resource_action)
}

/// Collects the permission identifiers granted by a role file.
///
/// Every line of a line-oriented file is granted; only records marked as allowed are granted from
/// a delimited file. The result may be empty.
pub fn map_actions(role_file: &RoleFile) -> BTreeSet<String> {
    match role_file {
        RoleFile::Lines(lines) => lines
            .iter()
            .map(|line| permission_identifier(line))
            .collect(),
        RoleFile::Records(records) => records
            .iter()
            .filter(|record| record.allowed)
            .map(|record| permission_identifier(&record.resource_action))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::role_file::ResourceActionRecord;

    fn record(resource_action: &str, allowed: bool) -> ResourceActionRecord {
        ResourceActionRecord {
            resource_action: resource_action.into(),
            allowed,
            description: None,
        }
    }

    /// Verify that only allowed records are mapped, each exactly once.
    #[test]
    fn map_allowed_records() {
        let role_file = RoleFile::Records(vec![
            record("AndroidFota_Read", true),
            record("AndroidFota_Assign", false),
            record("ManagedApps_Read", true),
        ]);

        let expected: BTreeSet<String> = vec![
            "Microsoft.Intune_AndroidFota_Read".to_string(),
            "Microsoft.Intune_ManagedApps_Read".to_string(),
        ]
        .into_iter()
        .collect();

        assert_eq!(map_actions(&role_file), expected);
    }

    /// Verify that a file with nothing allowed maps to an empty set rather than an error.
    #[test]
    fn map_nothing_allowed() {
        let role_file = RoleFile::Records(vec![record("AndroidFota_Assign", false)]);

        assert!(map_actions(&role_file).is_empty());
    }

    /// Verify that line order does not matter and duplicate lines collapse.
    #[test]
    fn map_lines() {
        let forward = RoleFile::Lines(vec![
            "ManagedDevices_Read".into(),
            "ManagedDevices_Delete".into(),
            "ManagedDevices_Read".into(),
        ]);
        let reverse = RoleFile::Lines(vec![
            "ManagedDevices_Delete".into(),
            "ManagedDevices_Read".into(),
        ]);

        let mapped = map_actions(&forward);
        assert_eq!(mapped.len(), 2);
        assert!(mapped.contains("Microsoft.Intune_ManagedDevices_Read"));
        assert_eq!(mapped, map_actions(&reverse));
    }

    /// Verify that resource actions are not normalized.
    #[test]
    fn identifier_is_not_normalized() {
        assert_eq!(
            permission_identifier("managedDevices_read "),
            "Microsoft.Intune_managedDevices_read "
        );
    }
}
