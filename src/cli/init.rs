//! The `init` command: scaffold the user config file

use crate::config::UserConfig;
use anyhow::Result;

pub fn run() -> Result<()> {
    let path = UserConfig::init_user_config()?;
    println!("Config file: {}", path.display());
    println!("Fill in your Spotify credentials, then run `vibes doctor` to verify.");
    Ok(())
}
