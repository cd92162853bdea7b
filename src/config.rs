// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_DATA_PATH: &str = "world_population.csv";
pub const DEFAULT_COUNTRY: &str = "Kenya";
pub const DEFAULT_TOP_N: usize = 10;

/// Dashboard defaults. Every field may be omitted from a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,
    /// Country preselected by the single-country view.
    pub default_country: String,
    /// Countries preselected by the comparison view.
    pub default_comparison: Vec<String>,
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_country: DEFAULT_COUNTRY.to_string(),
            default_comparison: vec![DEFAULT_COUNTRY.to_string(), crate::types::WORLD.to_string()],
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading settings {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("parsing settings {:?}", path))
    }

    /// Settings from `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
