use anyhow::{Context, Result};
use daybook_core::remote::{AuthApi, UserProfile};
use daybook_core::sync::AuthResolver;
use owo_colors::OwoColorize;

use crate::app::open_session;

/// Record the user on the server, then remember them locally.
pub async fn login(
    user_id: &str,
    email: String,
    name: Option<String>,
    photo_url: Option<String>,
) -> Result<()> {
    let (config, session) = open_session()?;
    let auth = AuthApi::new(reqwest::Client::new(), &config.api_url);

    let profile = UserProfile {
        email,
        name,
        photo_url,
    };
    let user = auth
        .create_or_get_user(user_id, &profile)
        .await
        .with_context(|| format!("Could not sign in at {}", config.api_url))?;
    session.sign_in(&user.id)?;

    println!(
        "Signed in as {} {}",
        user.name.as_deref().unwrap_or(&user.email),
        format!("<{}>", user.email).dimmed()
    );
    println!("{}", "Calendars and schedules are now saved to the server.".dimmed());
    Ok(())
}

pub fn logout() -> Result<()> {
    let (_, session) = open_session()?;

    if session.authenticated_user().is_none() {
        println!("{}", "Not signed in".dimmed());
        return Ok(());
    }
    session.sign_out()?;
    println!("Signed out. Changes are stored on this machine only.");
    Ok(())
}

pub async fn whoami() -> Result<()> {
    let (config, session) = open_session()?;

    let Some(user_id) = session.authenticated_user() else {
        println!("{}", "Not signed in (local only)".dimmed());
        return Ok(());
    };

    let auth = AuthApi::new(reqwest::Client::new(), &config.api_url);
    match auth.me(&user_id).await {
        Ok(user) => {
            println!("{}", user.name.as_deref().unwrap_or(&user.email).bold());
            println!("  Email:  {}", user.email);
            println!("  Id:     {}", user.id);
            println!("  Since:  {}", user.created_at.format("%Y-%m-%d"));
        }
        Err(e) => {
            println!("{user_id}");
            println!("   {}", e.to_string().red());
        }
    }
    Ok(())
}
