use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::RepeatPolicy;

pub const DEFAULT_CORPUS_PATH: &str = "grc.json";
pub const DEFAULT_LANGUAGE_TAG: &str = "passage";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub corpus_path: Option<PathBuf>,
    pub language_tag: Option<String>,
    pub repeat_policy: Option<RepeatPolicy>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.corpus_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH))
    }

    pub fn language_tag(&self) -> &str {
        self.language_tag.as_deref().unwrap_or(DEFAULT_LANGUAGE_TAG)
    }

    pub fn repeat_policy(&self) -> RepeatPolicy {
        self.repeat_policy.unwrap_or_default()
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("interlinear").join("config.json"))
    }
}
