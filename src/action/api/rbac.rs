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

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CliError;

use super::{remote_service_error, Session};

const ROLE_DEFINITIONS_PATH: &str = "/deviceManagement/roleDefinitions";
const ROLE_DEFINITION_ODATA_TYPE: &str = "#microsoft.graph.deviceAndAppManagementRoleDefinition";

/// A role definition as returned by the service.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_built_in: bool,
    #[serde(default)]
    pub role_permissions: Vec<RolePermission>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    #[serde(default)]
    pub resource_actions: Vec<ResourceActions>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceActions {
    #[serde(default)]
    pub allowed_resource_actions: Vec<String>,
    #[serde(default)]
    pub not_allowed_resource_actions: Vec<String>,
}

impl RoleDefinition {
    /// Returns every allowed resource action across all of the role's permissions.
    pub fn allowed_resource_actions(&self) -> BTreeSet<&str> {
        self.role_permissions
            .iter()
            .flat_map(|permission| permission.resource_actions.iter())
            .flat_map(|actions| actions.allowed_resource_actions.iter())
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Display for RoleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Id: {}", self.id)?;
        write!(f, "\n    Display Name: {}", self.display_name)?;
        if let Some(description) = &self.description {
            write!(f, "\n    Description: {}", description)?;
        }
        write!(f, "\n    Built In: {}", self.is_built_in)?;

        f.write_str("\n    Allowed Resource Actions:")?;
        for action in self.allowed_resource_actions() {
            write!(f, "\n        {}", action)?;
        }

        Ok(())
    }
}

/// The payload submitted to create a custom role definition.
#[derive(Debug, PartialEq)]
pub struct RoleDefinitionRequest {
    display_name: String,
    description: String,
    allowed_resource_actions: BTreeSet<String>,
    not_allowed_resource_actions: BTreeSet<String>,
    is_built_in: bool,
}

impl RoleDefinitionRequest {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn allowed_resource_actions(&self) -> &BTreeSet<String> {
        &self.allowed_resource_actions
    }

    pub fn not_allowed_resource_actions(&self) -> &BTreeSet<String> {
        &self.not_allowed_resource_actions
    }

    pub fn is_built_in(&self) -> bool {
        self.is_built_in
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleDefinitionPayload<'a> {
    #[serde(rename = "@odata.type")]
    odata_type: &'a str,
    display_name: &'a str,
    description: &'a str,
    role_permissions: Vec<RolePermissionPayload<'a>>,
    is_built_in: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RolePermissionPayload<'a> {
    resource_actions: Vec<ResourceActionsPayload<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceActionsPayload<'a> {
    allowed_resource_actions: &'a BTreeSet<String>,
    not_allowed_resource_actions: &'a BTreeSet<String>,
}

impl Serialize for RoleDefinitionRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RoleDefinitionPayload {
            odata_type: ROLE_DEFINITION_ODATA_TYPE,
            display_name: &self.display_name,
            description: &self.description,
            role_permissions: vec![RolePermissionPayload {
                resource_actions: vec![ResourceActionsPayload {
                    allowed_resource_actions: &self.allowed_resource_actions,
                    not_allowed_resource_actions: &self.not_allowed_resource_actions,
                }],
            }],
            is_built_in: self.is_built_in,
        }
        .serialize(serializer)
    }
}

#[derive(Default)]
pub struct RoleDefinitionRequestBuilder {
    display_name: Option<String>,
    description: Option<String>,
    allowed_resource_actions: BTreeSet<String>,
}

impl RoleDefinitionRequestBuilder {
    pub fn with_display_name(mut self, display_name: String) -> Self {
        self.display_name = Some(display_name);
        self
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_allowed_resource_actions(mut self, actions: BTreeSet<String>) -> Self {
        self.allowed_resource_actions = actions;
        self
    }

    pub fn build(self) -> Result<RoleDefinitionRequest, CliError> {
        let RoleDefinitionRequestBuilder {
            display_name,
            description,
            allowed_resource_actions,
        } = self;

        let display_name = display_name
            .ok_or_else(|| CliError::ActionError("A role must have a display name".into()))?;
        let description = description
            .ok_or_else(|| CliError::ActionError("A role must have a description".into()))?;

        Ok(RoleDefinitionRequest {
            display_name,
            description,
            allowed_resource_actions,
            not_allowed_resource_actions: BTreeSet::new(),
            is_built_in: false,
        })
    }
}

#[derive(Deserialize)]
struct Page<T> {
    value: VecDeque<T>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

pub struct RoleIter<'a> {
    client: &'a Client,
    session: &'a Session,
    current_page: Option<Result<Page<RoleDefinition>, CliError>>,
    consumed: bool,
}

impl<'a> RoleIter<'a> {
    pub fn new(client: &'a Client, base_url: &str, session: &'a Session) -> Self {
        Self {
            client,
            session,
            current_page: Some(load_page(
                client,
                session,
                &format!("{}{}", base_url, ROLE_DEFINITIONS_PATH),
            )),
            consumed: false,
        }
    }
}

impl<'a> Iterator for RoleIter<'a> {
    type Item = Result<RoleDefinition, CliError>;

    fn next(&mut self) -> Option<Self::Item> {
        // At most two passes: one to load the next page, one to pop from it.
        loop {
            if self.consumed {
                break None;
            }

            // A failed page load is returned once, then iteration ends.
            if self.current_page.as_ref()?.is_err() {
                if let Some(Err(err)) = self.current_page.take() {
                    self.consumed = true;
                    break Some(Err(err));
                }
            }

            if let Ok(current_page) = self.current_page.as_ref()?.as_ref() {
                if current_page.value.is_empty() {
                    match &current_page.next_link {
                        Some(next_link) => {
                            self.current_page =
                                Some(load_page(self.client, self.session, next_link));
                        }
                        None => self.consumed = true,
                    }
                    continue;
                }
            }

            break self
                .current_page
                .as_mut()?
                .as_mut()
                .map(|page| page.value.pop_front())
                // The error case was handled above
                .map_err(|_| unreachable!())
                .transpose();
        }
    }
}

fn load_page(
    client: &Client,
    session: &Session,
    link: &str,
) -> Result<Page<RoleDefinition>, CliError> {
    client
        .get(link)
        .bearer_auth(session.access_token())
        .send()
        .map_err(|err| CliError::RemoteService {
            status: None,
            message: format!("Failed to fetch role definition page: {}", err),
        })
        .and_then(|res| {
            if res.status().is_success() {
                res.json::<Page<RoleDefinition>>().map_err(|_| {
                    CliError::ActionError(
                        "Request was successful, but received an invalid response".into(),
                    )
                })
            } else {
                Err(remote_service_error(res, "fetch role definition page"))
            }
        })
}

/// Escapes a value for use inside a single-quoted OData string literal.
fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn find_role_by_display_name(
    client: &Client,
    base_url: &str,
    session: &Session,
    display_name: &str,
) -> Result<Option<RoleDefinition>, CliError> {
    let filter = format!("displayName eq {}", odata_string(display_name));

    client
        .get(&format!("{}{}", base_url, ROLE_DEFINITIONS_PATH))
        .query(&[("$filter", filter.as_str())])
        .bearer_auth(session.access_token())
        .send()
        .map_err(|err| CliError::RemoteService {
            status: None,
            message: format!("Failed to look up role '{}': {}", display_name, err),
        })
        .and_then(|res| {
            if res.status().is_success() {
                res.json::<Page<RoleDefinition>>()
                    .map(|mut page| {
                        if page.value.len() > 1 {
                            warn!(
                                "{} roles are named '{}'; using the first",
                                page.value.len(),
                                display_name
                            );
                        }
                        page.value.pop_front()
                    })
                    .map_err(|_| {
                        CliError::ActionError(
                            "Request was successful, but received an invalid response".into(),
                        )
                    })
            } else {
                Err(remote_service_error(res, "look up role"))
            }
        })
}

pub fn delete_role(
    client: &Client,
    base_url: &str,
    session: &Session,
    role: &RoleDefinition,
) -> Result<(), CliError> {
    if role.is_built_in {
        return Err(CliError::ActionError(format!(
            "Role '{}' is a built-in role and cannot be deleted",
            role.display_name
        )));
    }

    client
        .delete(&format!("{}{}/{}", base_url, ROLE_DEFINITIONS_PATH, role.id))
        .bearer_auth(session.access_token())
        .send()
        .map_err(|err| CliError::RemoteService {
            status: None,
            message: format!("Failed to delete role '{}': {}", role.display_name, err),
        })
        .and_then(|res| {
            let status = res.status();
            if status.is_success() {
                Ok(())
            } else if status == StatusCode::NOT_FOUND {
                debug!("Role {} was already removed", role.id);
                Ok(())
            } else {
                Err(remote_service_error(res, "delete role"))
            }
        })
}

pub fn create_role(
    client: &Client,
    base_url: &str,
    session: &Session,
    request: RoleDefinitionRequest,
) -> Result<RoleDefinition, CliError> {
    client
        .post(&format!("{}{}", base_url, ROLE_DEFINITIONS_PATH))
        .bearer_auth(session.access_token())
        .json(&request)
        .send()
        .map_err(|err| CliError::RemoteService {
            status: None,
            message: format!("Failed to create role: {}", err),
        })
        .and_then(|res| {
            let status = res.status();
            if status.is_success() {
                res.json::<RoleDefinition>().map_err(|_| {
                    CliError::ActionError(
                        "Request was successful, but received an invalid response".into(),
                    )
                })
            } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                Err(CliError::RemoteService {
                    status: Some(status.as_u16()),
                    message: "Not authorized to create role definitions; the app registration \
                              requires DeviceManagementRBAC.ReadWrite.All"
                        .into(),
                })
            } else {
                Err(remote_service_error(res, "create role"))
            }
        })
}
