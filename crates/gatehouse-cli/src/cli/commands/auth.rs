//! Auth command handlers (headless sign-in, sign-out, whoami, recovery).

use anyhow::{Context, Result};
use gatehouse_core::backend::AuthClient;
use gatehouse_core::config::Config;
use gatehouse_core::session::SessionHub;

fn auth_client(config: &Config) -> Result<AuthClient> {
    let backend = config.backend()?;
    AuthClient::new(backend, SessionHub::new())
}

pub async fn login(config: &Config, email: &str, password: &str) -> Result<()> {
    let auth = auth_client(config)?;
    let session = auth.sign_in(email, password).await.context("sign in")?;
    println!("Signed in as {}", session.user.email);
    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    let auth = auth_client(config)?;
    // Restore the persisted session so the revocation carries its token.
    auth.bootstrap().await;
    auth.sign_out().await.context("sign out")?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let auth = auth_client(config)?;
    match auth.bootstrap().await {
        Some(session) => {
            println!("{} ({})", session.user.email, session.user.id);
            Ok(())
        }
        None => anyhow::bail!("Not signed in. Run `gatehouse login` first."),
    }
}

pub async fn recover(config: &Config, email: &str) -> Result<()> {
    let auth = auth_client(config)?;
    auth.send_reset_link(email)
        .await
        .context("send recovery link")?;
    println!("Recovery link sent to {email}.");
    Ok(())
}
