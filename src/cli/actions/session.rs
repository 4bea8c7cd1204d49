//! Sign-in, account and route-check actions.

use crate::cli::actions::context::Context;
use crate::features::auth::{
    guards::{self, Access},
    token, AuthState, RegisterRequest,
};
use anyhow::{Context as _, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

#[derive(Debug)]
pub enum Command {
    Login { email: String, password: SecretString },
    Register(RegisterRequest),
    Logout,
    WhoAmI,
    Refresh,
    Open { path: String },
}

/// # Errors
/// Returns an error if the underlying operation fails.
#[instrument(skip_all)]
pub async fn execute(context: &Context, command: Command) -> Result<()> {
    let session = &context.session;

    match command {
        Command::Login { email, password } => {
            let identity = session
                .login(&email, &password)
                .await
                .context("login failed")?;
            println!("Signed in as {} <{}>", identity.display_name(), identity.email());
        }
        Command::Register(request) => {
            let identity = session
                .register(&request)
                .await
                .context("registration failed")?;
            println!(
                "Account created; signed in as {} <{}>",
                identity.display_name(),
                identity.email()
            );
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Command::WhoAmI => match session.init().await {
            AuthState::Authenticated(identity) => {
                println!("{} <{}>", identity.display_name(), identity.email());
                println!("id:    {}", identity.id());
                println!("roles: {}", identity.roles().tags().join(", "));
                if let Some(role) = identity.roles().primary() {
                    println!("acting as: {}", role.as_str());
                }
                if let Some(expires) = session
                    .api()
                    .session()
                    .token()
                    .and_then(|token| token::expiration_time(token.expose_secret()))
                {
                    println!("session expires: {}", expires.to_rfc3339());
                }
            }
            _ => println!("Not signed in"),
        },
        Command::Refresh => {
            if session.refresh_token().await {
                println!("Session refreshed");
            } else {
                anyhow::bail!("refresh failed; signed out");
            }
        }
        Command::Open { path } => {
            let state = session.init().await;
            match guards::authorize(state.identity(), &path) {
                Access::Granted => println!("{path}: granted"),
                Access::Redirect(target) => println!("{path}: redirect to {target}"),
            }
        }
    }

    Ok(())
}
