//! Profile command handlers.

use anyhow::{Context, Result};
use gatehouse_core::backend::types::{ProfilePatch, Session};
use gatehouse_core::backend::{AuthClient, ProfilesClient};
use gatehouse_core::config::Config;
use gatehouse_core::session::SessionHub;

async fn restore_session(config: &Config) -> Result<Session> {
    let auth = AuthClient::new(config.backend()?, SessionHub::new())?;
    auth.bootstrap()
        .await
        .context("Not signed in. Run `gatehouse login` first.")
}

pub async fn show(config: &Config) -> Result<()> {
    let session = restore_session(config).await?;
    let profiles = ProfilesClient::new(config.backend()?)?;

    let profile = profiles
        .get_profile(&session.access_token, session.user.id)
        .await
        .context("fetch profile")?;

    match profile {
        Some(profile) => {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        None => println!("No profile yet for {}.", session.user.email),
    }
    Ok(())
}

pub async fn set(
    config: &Config,
    firstname: Option<String>,
    lastname: Option<String>,
) -> Result<()> {
    let patch = ProfilePatch {
        firstname,
        lastname,
        ..ProfilePatch::default()
    };
    if patch.is_empty() {
        anyhow::bail!("Nothing to set. Pass --firstname and/or --lastname.");
    }

    let session = restore_session(config).await?;
    let profiles = ProfilesClient::new(config.backend()?)?;

    profiles
        .update_profile(&session.access_token, session.user.id, &patch)
        .await
        .context("update profile")?;
    println!("Profile updated.");
    Ok(())
}
