pub mod admin;
pub mod catalog;
pub mod context;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Session(GlobalArgs, session::Command),
    Catalog(GlobalArgs, catalog::Command),
    Admin(GlobalArgs, admin::Command),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
