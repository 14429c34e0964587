//! Configuration view and validation commands: `stockboard config`.

use anyhow::Result;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use stockboard::config::{CONFIG_DIR, CONFIG_FILE, StockboardConfig, StockboardToml};

    let config_dir = project_dir.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Stockboard Configuration");
            println!("========================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                StockboardToml::load(&config_path)?
            } else {
                println!("No stockboard.toml found at {}", config_path.display());
                println!("Using default configuration.");
                StockboardToml::default()
            };
            println!();

            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!(
                "  token = {}",
                if toml.api.token.is_some() { "(set)" } else { "(none)" }
            );
            println!();

            if !toml.board.terminal_columns.is_empty() {
                println!("[board.terminal_columns]");
                for (board_type, column) in &toml.board.terminal_columns {
                    println!("  {} = \"{}\"", board_type, column);
                }
                println!();
            }

            println!("[logging]");
            println!("  format = \"{}\"", toml.logging.format);
            println!();

            if !toml.presets.is_empty() {
                println!("Presets: {}", toml.presets.keys().cloned().collect::<Vec<_>>().join(", "));
                println!();
            }

            if config_path.exists() {
                let config = StockboardConfig::new(project_dir.to_path_buf())?;
                println!("Effective values (with env overrides):");
                println!("  base_url = \"{}\"", config.base_url());
                println!(
                    "  token = {}",
                    if config.token().is_some() { "(set)" } else { "(none)" }
                );
                println!();
            } else {
                println!("Run 'stockboard config init' to create a stockboard.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No stockboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = StockboardToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("stockboard.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            StockboardToml::default().save(&config_path)?;

            println!("Created stockboard.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs, token");
            println!("  - [board] terminal_columns per board type");
            println!("  - [presets.<name>] saved filters for 'stockboard board --preset'");
            println!();
        }
    }

    Ok(())
}
