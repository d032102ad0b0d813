use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    println!(
        "  defaults.theme      {}",
        config.theme().unwrap_or("light")
    );
    println!("  defaults.presenter  {}", config.presenter());
    println!("  defaults.windowed   {}", config.windowed());
    match config.state_root() {
        Ok(dir) => println!("  state_dir           {}", dir.display()),
        Err(e) => println!("  state_dir           {}", format!("{e}").red()),
    }
    if let Some(log) = crate::logging::log_path() {
        println!();
        println!("{} {}", "Log file:".bold(), log.display());
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    log::info!("Config {key} set to {value}");
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
