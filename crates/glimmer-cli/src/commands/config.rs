//! Config command

use crate::config::SceneConfig;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = SceneConfig::load(config_path).context("Failed to load config")?;
    let text = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    println!("{}", text);
    Ok(())
}
