use crate::api::ApiError;
use crate::cli::actions::{admin, catalog, context::Context, session, Action};
use crate::features::auth::AuthError;
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions. The context is
// closed on every path so the validation task never outlives the command.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Session(globals, command) => {
            let context = Context::open(&globals)?;
            let result = session::execute(&context, command).await;
            context.close();
            result
        }
        Action::Catalog(globals, command) => {
            let context = Context::open(&globals)?;
            let result = catalog::execute(&context, command).await;
            context.close();
            result
        }
        Action::Admin(globals, command) => {
            let context = Context::open(&globals)?;
            let result = admin::execute(&context, command).await;
            context.close();
            result
        }
    };

    result.map_err(with_sign_in_hint)
}

/// Points the user at `login` when the API rejected the stored session.
fn with_sign_in_hint(err: anyhow::Error) -> anyhow::Error {
    let rejected = err.chain().any(|cause| {
        cause
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_auth_failure)
            || cause
                .downcast_ref::<AuthError>()
                .is_some_and(AuthError::is_auth_failure)
    });

    if rejected {
        err.context("session rejected by the server; sign in again with `coursemart login`")
    } else {
        err
    }
}
