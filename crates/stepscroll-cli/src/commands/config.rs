use anyhow::Result;

use stepscroll_core::AppConfig;

/// Print the effective configuration (or the built-in defaults) as TOML
pub fn show(config: &AppConfig, defaults: bool) -> Result<()> {
    let text = if defaults {
        AppConfig::default().to_toml()?
    } else {
        config.to_toml()?
    };
    print!("{}", text);
    Ok(())
}

/// Print where the configuration file is read from
pub fn path() -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

/// Write the built-in defaults to the configuration file
pub fn init(force: bool) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\nUse --force to overwrite it.",
            path.display()
        );
    }
    AppConfig::default().save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
