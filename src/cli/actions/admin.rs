use crate::cli::actions::context::Context;
use crate::features::admin::{self, UserStatus};
use crate::features::auth::{Role, RoleSet};
use anyhow::{Context as _, Result};

#[derive(Debug)]
pub enum Command {
    Users,
    SetStatus { user_id: String, status: UserStatus },
}

/// # Errors
/// Returns an error if the caller is not an admin or the request fails.
pub async fn execute(context: &Context, command: Command) -> Result<()> {
    context.require(Role::Admin).await?;
    let api = context.api();

    match command {
        Command::Users => {
            let users = admin::list_users(api).await.context("failed to list users")?;
            for user in users {
                let roles = RoleSet::resolve(&user.role_fields, None);
                println!(
                    "{:>6}  {:<32}  {:<10}  {}",
                    user.id,
                    user.email,
                    user.status.as_deref().unwrap_or("-"),
                    roles.tags().join(",")
                );
            }
        }
        Command::SetStatus { user_id, status } => {
            let user = admin::set_user_status(api, &user_id, status)
                .await
                .with_context(|| format!("failed to update user {user_id}"))?;
            println!(
                "{} is now {}",
                user.email,
                user.status.as_deref().unwrap_or(status.as_str())
            );
        }
    }

    Ok(())
}
