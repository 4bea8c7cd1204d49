//! Command-line argument dispatch.
//!
//! This module maps validated CLI matches to an [`Action`]. It performs no I/O;
//! sessions and network access are set up when the action executes.

use crate::cli::actions::{admin, catalog, session, Action};
use crate::cli::commands::{
    admin::{ARG_PATH, ARG_STATUS, ARG_USER_ID},
    api,
    catalog::{
        ARG_CATEGORY, ARG_COURSE_ID, ARG_DESCRIPTION, ARG_ID, ARG_PAGE, ARG_POST, ARG_PRICE,
        ARG_SEARCH, ARG_SIZE, ARG_TITLE,
    },
    session::{ARG_EMAIL, ARG_FIRST_NAME, ARG_LAST_NAME, ARG_PASSWORD, ARG_ROLE},
};
use crate::cli::globals::GlobalArgs;
use crate::features::admin::UserStatus;
use crate::features::auth::{RegisterRequest, Role};
use crate::features::courses::{CourseQuery, NewCourse};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: {name}"))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let options = api::Options::parse(matches)?;
    let globals = GlobalArgs {
        api_url: options.api_url,
        timeout: options.timeout,
        state_file: options.state_file,
    };

    let Some((name, sub)) = matches.subcommand() else {
        return Err(anyhow!("missing subcommand"));
    };

    let action = match name {
        "login" => Action::Session(
            globals,
            session::Command::Login {
                email: required(sub, ARG_EMAIL)?,
                password: SecretString::from(required(sub, ARG_PASSWORD)?),
            },
        ),
        "register" => Action::Session(
            globals,
            session::Command::Register(RegisterRequest {
                first_name: required(sub, ARG_FIRST_NAME)?,
                last_name: required(sub, ARG_LAST_NAME)?,
                email: required(sub, ARG_EMAIL)?,
                password: SecretString::from(required(sub, ARG_PASSWORD)?),
                role: optional(sub, ARG_ROLE)
                    .map(|role| role.parse::<Role>())
                    .transpose()
                    .map_err(|err| anyhow!(err))?,
            }),
        ),
        "logout" => Action::Session(globals, session::Command::Logout),
        "whoami" => Action::Session(globals, session::Command::WhoAmI),
        "refresh" => Action::Session(globals, session::Command::Refresh),
        "open" => Action::Session(
            globals,
            session::Command::Open {
                path: required(sub, ARG_PATH)?,
            },
        ),
        "courses" => Action::Catalog(
            globals,
            catalog::Command::Courses(CourseQuery {
                search: optional(sub, ARG_SEARCH),
                category: optional(sub, ARG_CATEGORY),
                page: sub.get_one::<u32>(ARG_PAGE).copied(),
                size: sub.get_one::<u32>(ARG_SIZE).copied(),
            }),
        ),
        "course" => Action::Catalog(
            globals,
            catalog::Command::Course {
                id: required(sub, ARG_ID)?,
            },
        ),
        "enroll" => Action::Catalog(
            globals,
            catalog::Command::Enroll {
                id: required(sub, ARG_ID)?,
            },
        ),
        "enrollments" => Action::Catalog(globals, catalog::Command::Enrollments),
        "lessons" => Action::Catalog(
            globals,
            catalog::Command::Lessons {
                course_id: required(sub, ARG_COURSE_ID)?,
            },
        ),
        "comments" => Action::Catalog(
            globals,
            catalog::Command::Comments {
                course_id: required(sub, ARG_COURSE_ID)?,
                post: optional(sub, ARG_POST),
            },
        ),
        "wishlist" => {
            let op = match sub.subcommand() {
                Some(("add", op)) => catalog::WishlistOp::Add(required(op, ARG_COURSE_ID)?),
                Some(("remove", op)) => {
                    catalog::WishlistOp::Remove(required(op, ARG_COURSE_ID)?)
                }
                _ => catalog::WishlistOp::Show,
            };
            Action::Catalog(globals, catalog::Command::Wishlist(op))
        }
        "payments" => Action::Catalog(
            globals,
            catalog::Command::Payments {
                id: optional(sub, ARG_ID),
            },
        ),
        "checkout" => Action::Catalog(
            globals,
            catalog::Command::Checkout {
                course_id: required(sub, ARG_COURSE_ID)?,
            },
        ),
        "teacher" => Action::Catalog(
            globals,
            catalog::Command::Teacher {
                ids: sub
                    .get_many::<String>(ARG_ID)
                    .map(|ids| ids.cloned().collect())
                    .unwrap_or_default(),
            },
        ),
        "teaching" => Action::Catalog(globals, catalog::Command::Teaching),
        "publish" => Action::Catalog(
            globals,
            catalog::Command::Publish(NewCourse {
                title: required(sub, ARG_TITLE)?,
                description: optional(sub, ARG_DESCRIPTION),
                price: sub.get_one::<f64>(ARG_PRICE).copied(),
                category: optional(sub, ARG_CATEGORY),
            }),
        ),
        "admin" => {
            let command = match sub.subcommand() {
                Some(("users", _)) => admin::Command::Users,
                Some(("status", args)) => admin::Command::SetStatus {
                    user_id: required(args, ARG_USER_ID)?,
                    status: args
                        .get_one::<UserStatus>(ARG_STATUS)
                        .copied()
                        .context("missing required argument: status")?,
                },
                _ => return Err(anyhow!("missing admin subcommand")),
            };
            Action::Admin(globals, command)
        }
        other => return Err(anyhow!("unknown command: {other}")),
    };

    Ok(action)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args).unwrap();
        handler(&matches)
    }

    #[test]
    fn login_maps_to_session_action() {
        temp_env::with_vars(
            [(commands::session::ENV_PASSWORD, None::<&str>)],
            || {
                let action = dispatch(&[
                    "coursemart",
                    "login",
                    "-e",
                    "ada@example.test",
                    "-p",
                    "secret-pass",
                ])
                .unwrap();

                match action {
                    Action::Session(_, session::Command::Login { email, password }) => {
                        assert_eq!(email, "ada@example.test");
                        assert_eq!(password.expose_secret(), "secret-pass");
                    }
                    other => panic!("unexpected action: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn register_parses_role() {
        let action = dispatch(&[
            "coursemart",
            "register",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.test",
            "--password",
            "pw",
            "--role",
            "teacher",
        ])
        .unwrap();

        match action {
            Action::Session(_, session::Command::Register(request)) => {
                assert_eq!(request.role, Some(Role::Teacher));
                assert_eq!(request.first_name, "Ada");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn courses_builds_query_and_globals() {
        temp_env::with_vars(
            [
                (crate::api::config::ENV_API_BASE_URL, None::<&str>),
                (crate::api::config::ENV_REQUEST_TIMEOUT_SECS, Some("4")),
            ],
            || {
                let action = dispatch(&[
                    "coursemart",
                    "courses",
                    "--search",
                    "rust",
                    "--size",
                    "20",
                ])
                .unwrap();

                match action {
                    Action::Catalog(globals, catalog::Command::Courses(query)) => {
                        assert_eq!(globals.timeout, std::time::Duration::from_secs(4));
                        assert_eq!(query.search.as_deref(), Some("rust"));
                        assert_eq!(query.size, Some(20));
                        assert_eq!(query.page, None);
                    }
                    other => panic!("unexpected action: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn wishlist_ops() {
        assert!(matches!(
            dispatch(&["coursemart", "wishlist"]).unwrap(),
            Action::Catalog(_, catalog::Command::Wishlist(catalog::WishlistOp::Show))
        ));
        match dispatch(&["coursemart", "wishlist", "add", "12"]).unwrap() {
            Action::Catalog(_, catalog::Command::Wishlist(catalog::WishlistOp::Add(id))) => {
                assert_eq!(id, "12");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn teacher_accepts_many_ids() {
        match dispatch(&["coursemart", "teacher", "3", "4", "3"]).unwrap() {
            Action::Catalog(_, catalog::Command::Teacher { ids }) => {
                assert_eq!(ids, ["3", "4", "3"]);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn admin_and_open() {
        assert!(matches!(
            dispatch(&["coursemart", "admin", "users"]).unwrap(),
            Action::Admin(_, admin::Command::Users)
        ));
        match dispatch(&["coursemart", "open", "/admin/users"]).unwrap() {
            Action::Session(_, session::Command::Open { path }) => assert_eq!(path, "/admin/users"),
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
