use crate::cli::commands::{self, logging::LogSettings};
use crate::cli::{actions::Action, dispatch, telemetry};
use anyhow::Result;

/// Parses the command line, sets up logging, and resolves the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be initialized or the arguments do not
/// describe a runnable action.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(&LogSettings::from_matches(&matches))?;

    dispatch::handler(&matches)
}
