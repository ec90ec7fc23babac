//! The `doctor` command: check credential sources

use crate::config::UserConfig;
use anyhow::Result;

pub fn run() -> Result<()> {
    let config_path = UserConfig::user_config_path();
    let config = UserConfig::load()?;

    println!("\nVibes environment check");
    println!("───────────────────────");

    match &config_path {
        Some(path) if path.exists() => println!("  [ok] config file: {}", path.display()),
        Some(path) => println!("  [--] config file not found (expected {})", path.display()),
        None => println!("  [--] could not determine config directory"),
    }

    check("SPOTIFY_ACCESS_TOKEN env", std::env::var("SPOTIFY_ACCESS_TOKEN").is_ok());
    check("access token", config.access_token().is_some());
    check("client id", config.client_id().is_some());
    check("client secret", config.client_secret().is_some());
    check("refresh token", config.refresh_token().is_some());

    if config.has_credentials() {
        println!("\nCredentials look usable. Try `vibes recent`.");
    } else {
        println!("\nNo usable credential combination. Run `vibes init` and fill in the config.");
    }
    println!();

    Ok(())
}

fn check(label: &str, present: bool) {
    let tag = if present { "[ok]" } else { "[--]" };
    println!("  {tag} {label}");
}
