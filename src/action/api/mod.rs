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

//! Provides convenient functions for sending Microsoft Graph requests that manage Intune role
//! definitions.

mod auth;
#[cfg(test)]
mod mock_server;
mod rbac;

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use super::CliError;

pub use auth::{authenticate, Credentials, Session, GRAPH_DEFAULT_SCOPE};
pub use rbac::{RoleDefinition, RoleDefinitionRequest, RoleDefinitionRequestBuilder, RoleIter};

/// The operations the role provisioning flow needs from the role service.
pub trait RoleService {
    /// Looks up a role definition by its display name. Matching follows the service's `$filter`
    /// semantics.
    fn find_role_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<RoleDefinition>, CliError>;

    /// Removes the given role definition. Removing a role that no longer exists succeeds.
    fn delete_role(&self, role: &RoleDefinition) -> Result<(), CliError>;

    /// Submits a new role definition and returns the created resource.
    fn create_role(&self, request: RoleDefinitionRequest) -> Result<RoleDefinition, CliError>;
}

/// Builds the blocking HTTP client shared by authentication and role requests.
pub fn new_http_client(timeout: Duration) -> Result<Client, CliError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| CliError::ActionError(format!("Failed to build HTTP client: {}", err)))
}

#[derive(Default)]
pub struct GraphRestClientBuilder {
    pub url: Option<String>,
    pub session: Option<Session>,
    pub client: Option<Client>,
}

impl GraphRestClientBuilder {
    pub fn new() -> Self {
        GraphRestClientBuilder::default()
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<GraphRestClient, CliError> {
        Ok(GraphRestClient {
            url: self
                .url
                .ok_or_else(|| {
                    CliError::ActionError("Failed to build client, url not provided".to_string())
                })?
                .trim_end_matches('/')
                .to_string(),
            session: self.session.ok_or_else(|| {
                CliError::ActionError(
                    "Failed to build client, authenticated session not provided".to_string(),
                )
            })?,
            client: self.client.unwrap_or_else(Client::new),
        })
    }
}

/// A wrapper around the Microsoft Graph device management REST API.
pub struct GraphRestClient {
    pub url: String,
    session: Session,
    client: Client,
}

impl GraphRestClient {
    pub fn list_roles(&self) -> RoleIter<'_> {
        RoleIter::new(&self.client, &self.url, &self.session)
    }
}

impl RoleService for GraphRestClient {
    fn find_role_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<RoleDefinition>, CliError> {
        rbac::find_role_by_display_name(&self.client, &self.url, &self.session, display_name)
    }

    fn delete_role(&self, role: &RoleDefinition) -> Result<(), CliError> {
        rbac::delete_role(&self.client, &self.url, &self.session, role)
    }

    fn create_role(&self, request: RoleDefinitionRequest) -> Result<RoleDefinition, CliError> {
        rbac::create_role(&self.client, &self.url, &self.session, request)
    }
}

/// The error body returned by Microsoft Graph.
#[derive(Deserialize)]
pub struct ServerError {
    pub error: ServerErrorDetail,
}

#[derive(Deserialize)]
pub struct ServerErrorDetail {
    pub code: String,
    pub message: String,
}

/// Converts a non-success response into a `RemoteService` error, using the Graph error message
/// when the body carries one.
fn remote_service_error(res: Response, label: &str) -> CliError {
    let status = res.status();
    let message = match res.json::<ServerError>() {
        Ok(server_error) => format!(
            "Failed to {}: {} ({})",
            label, server_error.error.message, server_error.error.code
        ),
        Err(_) => format!(
            "{} request failed with status code '{}', but error response was not valid",
            label, status
        ),
    };

    CliError::RemoteService {
        status: Some(status.as_u16()),
        message,
    }
}
