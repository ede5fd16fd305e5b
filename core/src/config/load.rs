use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default syncflow data directory: ~/.syncflow
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".syncflow"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<AppConfig>(&s)?)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.syncflow/config.toml (highest)
    let data_config = get_data_dir()?.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    if data_config.exists() {
        load_from_path(&data_config)
    } else if local_config.exists() {
        load_from_path(local_config)
    } else {
        Ok(AppConfig::default())
    }
}
