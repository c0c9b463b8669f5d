//! Config command implementation.

use anyhow::Result;
use barfi_core::config::{Config, CONFIG_KEYS};

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub fn run(args: ConfigArgs) -> Result<()> {
    let mut config = Config::load()?;

    match args.action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(v) => println!("{key}: {v}"),
            None => println!("Unknown configuration key: {key}"),
        },

        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            if key == "token" {
                println!("Set token");
            } else {
                println!("Set {key} = {value}");
            }
        }

        ConfigAction::Show => {
            println!();
            println!("Barfi Configuration");
            println!("{}", "─".repeat(50));
            println!();
            for key in CONFIG_KEYS {
                if let Some(value) = config.get(key) {
                    println!("  {key} = {value}");
                }
            }
            println!();
        }

        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }

        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults.");
        }
    }

    Ok(())
}
