//! Admin subcommands and the route check.

use crate::features::admin::UserStatus;
use clap::{builder::ValueParser, Arg, Command};

pub const ARG_USER_ID: &str = "user-id";
pub const ARG_STATUS: &str = "status";
pub const ARG_PATH: &str = "path";

#[must_use]
pub fn validator_status() -> ValueParser {
    ValueParser::from(move |raw: &str| raw.parse::<UserStatus>())
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("admin")
            .about("User administration (admins only)")
            .subcommand_required(true)
            .subcommand(Command::new("users").about("List users"))
            .subcommand(
                Command::new("status")
                    .about("Change a user's status")
                    .arg(Arg::new(ARG_USER_ID).help("User id").required(true))
                    .arg(
                        Arg::new(ARG_STATUS)
                            .help("ACTIVE, SUSPENDED or BANNED")
                            .required(true)
                            .value_parser(validator_status()),
                    ),
            ),
        Command::new("open")
            .about("Check whether the signed-in user may open a route")
            .arg(Arg::new(ARG_PATH).help("Route path, e.g. /admin").required(true)),
    ]
}
