use anyhow::Result;

use crate::cli::{Cli, ConfigCommand};
use crate::settings::Settings;

pub fn run(_cli: &Cli, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init { path, force } => {
            Settings::default().save(path, *force)?;
            println!("Wrote default settings to {}", path.display());
        }
        ConfigCommand::Show { path } => {
            println!("{}", Settings::load(path)?.to_json_pretty()?);
        }
    }
    Ok(())
}
