use crate::errors::CliError;
use crate::utils::config::{self, AppConfig};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

pub fn show_config() -> Result<()> {
    let cfg = config::load_config();
    let config_path = config::default_config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    println!();
    println!("  {} {}", "config_file:".bright_white(), config_path);

    match cfg.default_stack.as_ref() {
        Some(p) => {
            let status = if p.is_file() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", "default_stack:".bright_white(), p, status);
        }
        None => {
            println!(
                "  {} {}",
                "default_stack:".bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }

    println!();
    Ok(())
}

pub fn set_default_stack(path: String) -> Result<()> {
    let path = Utf8PathBuf::from(&path);
    if !path.is_file() {
        return Err(CliError::stack_not_found(path).into());
    }
    let path = path.canonicalize_utf8().unwrap_or(path);

    let mut cfg = config::load_config();
    cfg.default_stack = Some(path.clone());
    config::save_config(&cfg).map_err(CliError::config_save_failed)?;

    println!(
        "{}",
        "✓ Default stack set successfully!".bright_green().bold()
    );
    println!();
    println!(
        "  {} {}",
        "Path:".bright_white().bold(),
        path.as_str().bright_green()
    );

    Ok(())
}

pub fn reset_config() -> Result<()> {
    let config_path = config::default_config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    config::save_config(&AppConfig::default()).map_err(CliError::config_save_failed)?;

    println!(
        "{}",
        "✓ Configuration reset to defaults".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), config_path);

    Ok(())
}
