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

use std::path::Path;

use clap::ArgMatches;

use crate::action::{
    api::{RoleDefinitionRequest, RoleDefinitionRequestBuilder, RoleService},
    print_table, Action,
};
use crate::error::CliError;
use crate::role_file::{load_role_file, InputFormat};

use super::{new_client, provision_role};

pub struct CreateRoleAction;

impl Action for CreateRoleAction {
    fn run<'a>(&mut self, arg_matches: Option<&ArgMatches<'a>>) -> Result<(), CliError> {
        let path = arg_matches
            .and_then(|args| args.value_of("file"))
            .ok_or_else(|| CliError::ActionError("A role file must be specified".into()))?;

        let display_name = arg_matches
            .and_then(|args| args.value_of("display_name"))
            .ok_or_else(|| CliError::ActionError("A role must have a display name".into()))?;

        let description = arg_matches
            .and_then(|args| args.value_of("description"))
            .ok_or_else(|| CliError::ActionError("A role must have a description".into()))?;

        let format = arg_matches
            .and_then(|args| args.value_of("format"))
            .map(|format| format.parse::<InputFormat>())
            .transpose()?;

        let flag = |name: &str| arg_matches.map(|args| args.is_present(name)).unwrap_or(false);
        let force = flag("force");
        let dry_run = flag("dry_run");
        let require_actions = flag("require_actions");

        let role_file = load_role_file(Path::new(path), format)?;
        let permissions = role_file.permissions();
        info!(
            "{} resource actions allowed by {} entries in {}",
            permissions.len(),
            role_file.len(),
            path
        );

        if permissions.is_empty() {
            if require_actions {
                return Err(CliError::ActionError(format!(
                    "{} does not allow any resource actions and --require-actions was given",
                    path
                )));
            }
            warn!("Role '{}' will not allow any resource actions", display_name);
        }

        let request = RoleDefinitionRequestBuilder::default()
            .with_display_name(display_name.into())
            .with_description(description.into())
            .with_allowed_resource_actions(permissions)
            .build()?;

        if dry_run {
            println!("{}", render_request(&request)?);
            return Ok(());
        }

        let client = new_client(&arg_matches)?;
        let role = provision_role(&client, request, force)?;

        info!("Created role '{}' with ID {}", role.display_name, role.id);

        Ok(())
    }
}

fn render_request(request: &RoleDefinitionRequest) -> Result<String, CliError> {
    serde_json::to_string_pretty(request).map_err(|err| {
        CliError::ActionError(format!("Cannot format role definition into json: {}", err))
    })
}

pub struct ListRolesAction;

impl Action for ListRolesAction {
    fn run<'a>(&mut self, arg_matches: Option<&ArgMatches<'a>>) -> Result<(), CliError> {
        let format = arg_matches
            .and_then(|args| args.value_of("format"))
            .unwrap_or("human");

        let client = new_client(&arg_matches)?;
        let roles = client.list_roles();

        let header = vec![
            "ID".to_string(),
            "DISPLAY NAME".to_string(),
            "BUILT IN".to_string(),
        ];

        if format == "csv" {
            println!("{}", header.join(","));
            for role_res in roles {
                let role = role_res?;
                println!("{},{},{}", role.id, role.display_name, role.is_built_in);
            }
        } else {
            let mut rows = vec![header];
            for role_res in roles {
                let role = role_res?;
                rows.push(vec![
                    role.id,
                    role.display_name,
                    role.is_built_in.to_string(),
                ]);
            }
            print_table(rows);
        }

        Ok(())
    }
}

pub struct ShowRoleAction;

impl Action for ShowRoleAction {
    fn run<'a>(&mut self, arg_matches: Option<&ArgMatches<'a>>) -> Result<(), CliError> {
        let format = arg_matches
            .and_then(|args| args.value_of("format"))
            .unwrap_or("human");

        let display_name = arg_matches
            .and_then(|args| args.value_of("display_name"))
            .ok_or_else(|| CliError::ActionError("A role display name must be specified".into()))?;

        let role = new_client(&arg_matches)?
            .find_role_by_display_name(display_name)?
            .ok_or_else(|| {
                CliError::ActionError(format!("Role '{}' does not exist", display_name))
            })?;

        match format {
            "json" => println!(
                "\n {}",
                serde_json::to_string(&role).map_err(|err| CliError::ActionError(format!(
                    "Cannot format role into json: {}",
                    err
                )))?
            ),
            "yaml" => println!(
                "{}",
                serde_yaml::to_string(&role).map_err(|err| CliError::ActionError(format!(
                    "Cannot format role into yaml: {}",
                    err
                )))?
            ),
            _ => println!("{}", role),
        }

        Ok(())
    }
}

pub struct DeleteRoleAction;

impl Action for DeleteRoleAction {
    fn run<'a>(&mut self, arg_matches: Option<&ArgMatches<'a>>) -> Result<(), CliError> {
        let display_name = arg_matches
            .and_then(|args| args.value_of("display_name"))
            .ok_or_else(|| CliError::ActionError("A role display name must be specified".into()))?;

        let client = new_client(&arg_matches)?;
        let role = client
            .find_role_by_display_name(display_name)?
            .ok_or_else(|| {
                CliError::ActionError(format!("Role '{}' does not exist", display_name))
            })?;

        client.delete_role(&role)?;
        info!("Deleted role '{}' ({})", role.display_name, role.id);

        Ok(())
    }
}
