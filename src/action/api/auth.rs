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

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::CliError;

/// Application permission scope covering every Graph permission granted to the app registration,
/// which must include `DeviceManagementRBAC.ReadWrite.All`.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// The means of obtaining an access token for Microsoft Graph.
pub enum Credentials {
    /// A bearer token that was acquired out of band.
    AccessToken(String),
    /// An app registration secret, exchanged through the OAuth2 client credentials grant.
    ClientSecret {
        authority: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Credentials::AccessToken(_) => f
                .debug_tuple("AccessToken")
                .field(&"<Redacted>".to_string())
                .finish(),
            Credentials::ClientSecret {
                authority,
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("authority", authority)
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<Redacted>".to_string())
                .finish(),
        }
    }
}

/// An authenticated session with Microsoft Graph.
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: String) -> Self {
        Session { access_token }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<Redacted>".to_string())
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Establishes a session with the given scopes.
pub fn authenticate(
    client: &Client,
    credentials: Credentials,
    scopes: &[&str],
) -> Result<Session, CliError> {
    match credentials {
        Credentials::AccessToken(token) => {
            if token.trim().is_empty() {
                return Err(CliError::Authentication(
                    "the provided access token is empty".into(),
                ));
            }
            debug!("Using provided access token");
            Ok(Session::new(token))
        }
        Credentials::ClientSecret {
            authority,
            tenant_id,
            client_id,
            client_secret,
        } => {
            let token_url = format!(
                "{}/{}/oauth2/v2.0/token",
                authority.trim_end_matches('/'),
                tenant_id
            );
            debug!(
                "Requesting access token for client {} from {}",
                client_id, token_url
            );

            let scope = scopes.join(" ");
            let params = [
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ];

            client
                .post(&token_url)
                .form(&params)
                .send()
                .map_err(|err| {
                    CliError::Authentication(format!("Failed to request access token: {}", err))
                })
                .and_then(|res| {
                    let status = res.status();
                    if status.is_success() {
                        res.json::<TokenResponse>()
                            .map(|token| Session::new(token.access_token))
                            .map_err(|_| {
                                CliError::Authentication(
                                    "Token request was successful, but received an invalid \
                                     response"
                                        .into(),
                                )
                            })
                    } else {
                        let message = res
                            .json::<TokenErrorResponse>()
                            .map(|err| match err.error_description {
                                Some(description) => format!("{}: {}", err.error, description),
                                None => err.error,
                            })
                            .map_err(|_| {
                                CliError::Authentication(format!(
                                    "Token request failed with status code '{}', but error \
                                     response was not valid",
                                    status
                                ))
                            })?;

                        Err(CliError::Authentication(message))
                    }
                })
        }
    }
}
