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

#[macro_use]
extern crate log;

mod action;
mod error;
mod role_file;
#[cfg(test)]
mod tests;

use std::ffi::OsString;

use clap::{clap_app, App, AppSettings, Arg, SubCommand};
#[cfg(test)]
use flexi_logger::FlexiLoggerError;
use flexi_logger::{DeferredNow, LogSpecBuilder, Logger};
use log::Record;

use action::{rbac, Action, SubcommandActions};
use error::CliError;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

const ROLE_CREATE_AFTER_HELP: &str = r"DETAILS:
    The role file format is selected by extension unless --format is given:

    .csv         A header row with ResourceAction and Allowed columns, plus an optional
                 Description column. Only rows whose Allowed value is Yes (any case) are
                 granted. Other columns are ignored. Example:
                     ResourceAction,Allowed,Description
                     ManagedDevices_Read,Yes,Read managed devices
                     ManagedDevices_Delete,No,Delete managed devices

    .txt, .lst   One resource action per line, no header. Every line is granted.

    Each granted resource action is prefixed with 'Microsoft.Intune_'. A file that grants
    nothing creates a role with no permissions, unless --require-actions is given.

    Credentials are read from --token or INTUNE_GRAPH_TOKEN, or else from the
    AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET environment variables (or
    the matching options). The app registration must be granted
    DeviceManagementRBAC.ReadWrite.All.";

// log format for cli that will only show the log message
pub fn log_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(w, "{}", record.args(),)
}

/// Adds the options used to reach and authenticate with the role service.
fn with_connection_args<'a, 'b>(command: App<'a, 'b>) -> App<'a, 'b> {
    command
        .arg(
            Arg::with_name("url")
                .short("U")
                .long("url")
                .takes_value(true)
                .help("URL of the Microsoft Graph API; defaults to https://graph.microsoft.com/beta"),
        )
        .arg(
            Arg::with_name("token")
                .long("token")
                .takes_value(true)
                .help("Pre-acquired Microsoft Graph access token"),
        )
        .arg(
            Arg::with_name("tenant_id")
                .long("tenant-id")
                .takes_value(true)
                .help("Azure AD tenant ID used for the client credentials grant"),
        )
        .arg(
            Arg::with_name("client_id")
                .long("client-id")
                .takes_value(true)
                .help("Application (client) ID of the app registration"),
        )
        .arg(
            Arg::with_name("client_secret")
                .long("client-secret")
                .takes_value(true)
                .help("Client secret of the app registration"),
        )
        .arg(
            Arg::with_name("authority")
                .long("authority")
                .takes_value(true)
                .help("Identity platform host; defaults to https://login.microsoftonline.com"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .takes_value(true)
                .help("Request timeout in seconds; defaults to 30"),
        )
}

fn run<I: IntoIterator<Item = T>, T: Into<OsString> + Clone>(args: I) -> Result<(), CliError> {
    let mut app = clap_app!(myapp =>
        (name: APP_NAME)
        (version: VERSION)
        (author: "Cargill")
        (about: "Command line for provisioning Intune RBAC role definitions")
        (@arg verbose: -v +multiple +global "Log verbosely")
        (@arg quiet: -q --quiet +global "Do not display output")
        (@setting SubcommandRequiredElseHelp)
    );

    let create_role = SubCommand::with_name("create")
        .about("Create a custom role from a role file")
        .arg(
            Arg::with_name("file")
                .value_name("file")
                .takes_value(true)
                .required(true)
                .help("Path to the role file (.csv, .txt or .lst)"),
        )
        .arg(
            Arg::with_name("display_name")
                .value_name("display-name")
                .takes_value(true)
                .required(true)
                .help("Display name of the role"),
        )
        .arg(
            Arg::with_name("description")
                .value_name("description")
                .takes_value(true)
                .required(true)
                .help("Description of the role"),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .takes_value(true)
                .possible_values(&["csv", "lines"])
                .help("Role file format; detected from the file extension by default"),
        )
        .arg(
            Arg::with_name("force")
                .short("f")
                .long("force")
                .help("Delete an existing role with the same display name before creating"),
        )
        .arg(
            Arg::with_name("require_actions")
                .long("require-actions")
                .help("Fail if the file allows no resource actions"),
        )
        .arg(
            Arg::with_name("dry_run")
                .long("dry-run")
                .short("n")
                .help("Print the role definition without contacting the service"),
        )
        .after_help(ROLE_CREATE_AFTER_HELP);

    let role_command = SubCommand::with_name("role")
        .about("Provides Intune role definition management functionality")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(with_connection_args(create_role))
        .subcommand(with_connection_args(
            SubCommand::with_name("list")
                .about("List the role definitions")
                .arg(
                    Arg::with_name("format")
                        .short("F")
                        .long("format")
                        .help("Output format")
                        .possible_values(&["human", "csv"])
                        .default_value("human")
                        .takes_value(true),
                ),
        ))
        .subcommand(with_connection_args(
            SubCommand::with_name("show")
                .about("Show a role definition")
                .arg(
                    Arg::with_name("display_name")
                        .value_name("display-name")
                        .takes_value(true)
                        .required(true)
                        .help("Display name of the role"),
                )
                .arg(
                    Arg::with_name("format")
                        .short("F")
                        .long("format")
                        .help("Output format")
                        .possible_values(&["human", "json", "yaml"])
                        .default_value("human")
                        .takes_value(true),
                ),
        ))
        .subcommand(with_connection_args(
            SubCommand::with_name("delete")
                .about("Delete a custom role definition")
                .arg(
                    Arg::with_name("display_name")
                        .value_name("display-name")
                        .takes_value(true)
                        .required(true)
                        .help("Display name of the role"),
                ),
        ));

    app = app.subcommand(role_command);

    let matches = app.get_matches_from_safe(args)?;

    // set default to info
    let log_level = if matches.is_present("quiet") {
        log::LevelFilter::Error
    } else {
        match matches.occurrences_of("verbose") {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    let mut log_spec_builder = LogSpecBuilder::new();
    log_spec_builder.default(log_level);
    log_spec_builder.module("reqwest", log::LevelFilter::Warn);
    log_spec_builder.module("hyper", log::LevelFilter::Warn);
    log_spec_builder.module("mio", log::LevelFilter::Warn);
    log_spec_builder.module("want", log::LevelFilter::Warn);

    // flexi_logger writes to stderr unless told otherwise
    match Logger::with(log_spec_builder.build())
        .format(log_format)
        .start()
    {
        Ok(_) => {}
        #[cfg(test)]
        // `FlexiLoggerError::Log` means the logger has already been initialized; this will happen
        // when `run` is called more than once in the tests.
        Err(FlexiLoggerError::Log(_)) => {}
        Err(err) => panic!("Failed to start logger: {}", err),
    }

    let mut subcommands = SubcommandActions::new().with_command(
        "role",
        SubcommandActions::new()
            .with_command("create", rbac::roles::CreateRoleAction)
            .with_command("list", rbac::roles::ListRolesAction)
            .with_command("show", rbac::roles::ShowRoleAction)
            .with_command("delete", rbac::roles::DeleteRoleAction),
    );

    subcommands.run(Some(&matches))
}

fn main() {
    match run(std::env::args_os()) {
        Ok(_) => {}
        Err(CliError::ClapError(err)) => err.exit(),
        Err(e) => {
            error!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}
