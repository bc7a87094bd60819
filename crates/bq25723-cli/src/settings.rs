use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bq25723_core::{DriverConfig, ValueFormat, DEFAULT_ADDRESS};
use serde::{Deserialize, Serialize};

/// Persisted defaults, overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub address: u8,
    pub clock_hz: u32,
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        let cfg = DriverConfig::default();
        Self {
            address: cfg.address,
            clock_hz: cfg.clock_hz,
            format: ValueFormat::default().as_str().to_string(),
        }
    }
}

impl Settings {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bq25723").join("settings.json"))
    }

    /// Settings from disk, or defaults when there is no file yet.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        if settings.format.parse::<ValueFormat>().is_err() {
            bail!("`{}` is not a value format (hex, bin, dec)", settings.format);
        }
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path().context("no configuration directory on this system")?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            address: self.address,
            clock_hz: self.clock_hz,
        }
    }

    pub fn value_format(&self) -> ValueFormat {
        self.format.parse().unwrap_or_else(|()| {
            log::warn!("unknown value format `{}`, using hex", self.format);
            ValueFormat::default()
        })
    }
}
