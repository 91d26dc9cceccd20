use anyhow::Result;
use daybook_core::ClientConfig;
use owo_colors::OwoColorize;

use crate::app::open_session;

pub fn run() -> Result<()> {
    let config_path = ClientConfig::config_path()?;
    let (config, session) = open_session()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", config.data_path()?.display());

    println!("\n{}", "Settings".bold());
    println!("  Server:     {}", config.api_url);
    println!("  Namespace:  {}", config.namespace);

    let ctx = session.context();
    let storage = match ctx.user_id() {
        Some(user_id) => format!("cloud (signed in as {user_id})"),
        None => "local only".to_string(),
    };
    println!("  Storage:    {storage}");

    Ok(())
}
