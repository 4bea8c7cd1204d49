//! Sign-in and account subcommands.

use crate::features::auth::state::valid_email;
use clap::{builder::ValueParser, Arg, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_ROLE: &str = "role";
pub const ENV_PASSWORD: &str = "COURSEMART_PASSWORD";

#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        let email = email.trim();
        if valid_email(email) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .required(true)
        .value_parser(validator_email())
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env(ENV_PASSWORD)
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("login")
            .about("Sign in and store the session")
            .arg(email_arg())
            .arg(password_arg()),
        Command::new("register")
            .about("Create an account and sign in")
            .arg(
                Arg::new(ARG_FIRST_NAME)
                    .long(ARG_FIRST_NAME)
                    .help("First name")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_LAST_NAME)
                    .long(ARG_LAST_NAME)
                    .help("Last name")
                    .required(true),
            )
            .arg(email_arg())
            .arg(password_arg())
            .arg(
                Arg::new(ARG_ROLE)
                    .long(ARG_ROLE)
                    .help("Requested role")
                    .value_parser(["student", "teacher"]),
            ),
        Command::new("logout").about("Sign out and clear the stored session"),
        Command::new("whoami").about("Show the signed-in identity"),
        Command::new("refresh").about("Exchange the refresh token for a new session"),
    ]
}
