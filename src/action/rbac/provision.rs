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

use crate::action::api::{RoleDefinition, RoleDefinitionRequest, RoleService};
use crate::error::CliError;

/// Creates the requested role, first checking for a role with the same display name.
///
/// If one exists it is deleted when `force` is set; otherwise `NameConflict` is returned and
/// nothing is deleted or created. A completed deletion is not undone if creation then fails.
pub fn provision_role<S>(
    service: &S,
    request: RoleDefinitionRequest,
    force: bool,
) -> Result<RoleDefinition, CliError>
where
    S: RoleService + ?Sized,
{
    let display_name = request.display_name().to_string();

    if let Some(existing) = service.find_role_by_display_name(&display_name)? {
        if !force {
            return Err(CliError::NameConflict(display_name));
        }

        info!(
            "Deleting existing role '{}' ({})",
            existing.display_name, existing.id
        );
        service.delete_role(&existing)?;
    }

    debug!(
        "Creating role '{}' ({}) with {} allowed and {} not allowed resource actions, \
         built-in: {}",
        display_name,
        request.description(),
        request.allowed_resource_actions().len(),
        request.not_allowed_resource_actions().len(),
        request.is_built_in()
    );
    service.create_role(request)
}
