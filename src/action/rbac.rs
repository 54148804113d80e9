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

mod provision;
pub mod roles;

use std::time::Duration;

use clap::ArgMatches;

use crate::error::CliError;

use super::{
    api::{
        authenticate, new_http_client, Credentials, GraphRestClient, GraphRestClientBuilder,
        GRAPH_DEFAULT_SCOPE,
    },
    arg_or_env, AUTHORITY_HOST_ENV, CLIENT_ID_ENV, CLIENT_SECRET_ENV, DEFAULT_AUTHORITY_HOST,
    DEFAULT_GRAPH_API_URL, DEFAULT_TIMEOUT_SECS, GRAPH_ACCESS_TOKEN_ENV, GRAPH_API_URL_ENV,
    TENANT_ID_ENV,
};

pub use provision::provision_role;

/// Authenticates and returns a client for the role definitions API.
fn new_client(arg_matches: &Option<&ArgMatches<'_>>) -> Result<GraphRestClient, CliError> {
    let url = arg_or_env(arg_matches, "url", GRAPH_API_URL_ENV)
        .unwrap_or_else(|| DEFAULT_GRAPH_API_URL.to_string());

    let http_client = new_http_client(timeout_arg(arg_matches)?)?;
    let credentials = credentials_from_args(arg_matches)?;
    debug!("Authenticating with {:?}", credentials);
    let session = authenticate(&http_client, credentials, &[GRAPH_DEFAULT_SCOPE])?;

    GraphRestClientBuilder::new()
        .with_url(url)
        .with_session(session)
        .with_client(http_client)
        .build()
}

fn timeout_arg(arg_matches: &Option<&ArgMatches<'_>>) -> Result<Duration, CliError> {
    match arg_matches.and_then(|args| args.value_of("timeout")) {
        Some(value) => value.parse::<u64>().map(Duration::from_secs).map_err(|_| {
            CliError::ActionError(format!(
                "Timeout must be a whole number of seconds, got '{}'",
                value
            ))
        }),
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}

/// Resolves credentials from arguments or the environment. A provided access token takes
/// precedence over app registration credentials.
fn credentials_from_args(arg_matches: &Option<&ArgMatches<'_>>) -> Result<Credentials, CliError> {
    if let Some(token) = arg_or_env(arg_matches, "token", GRAPH_ACCESS_TOKEN_ENV) {
        return Ok(Credentials::AccessToken(token));
    }

    let tenant_id = arg_or_env(arg_matches, "tenant_id", TENANT_ID_ENV);
    let client_id = arg_or_env(arg_matches, "client_id", CLIENT_ID_ENV);
    let client_secret = arg_or_env(arg_matches, "client_secret", CLIENT_SECRET_ENV);

    match (tenant_id, client_id, client_secret) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => Ok(Credentials::ClientSecret {
            authority: arg_or_env(arg_matches, "authority", AUTHORITY_HOST_ENV)
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            tenant_id,
            client_id,
            client_secret,
        }),
        (tenant_id, client_id, client_secret) => {
            let missing = [
                (tenant_id.is_none(), "--tenant-id/", TENANT_ID_ENV),
                (client_id.is_none(), "--client-id/", CLIENT_ID_ENV),
                (client_secret.is_none(), "--client-secret/", CLIENT_SECRET_ENV),
            ]
            .iter()
            .filter(|(is_missing, _, _)| *is_missing)
            .map(|(_, arg, env)| format!("{}{}", arg, env))
            .collect::<Vec<_>>();

            Err(CliError::EnvironmentError(format!(
                "No credentials provided; pass --token/{} or set {}",
                GRAPH_ACCESS_TOKEN_ENV,
                missing.join(", ")
            )))
        }
    }
}
