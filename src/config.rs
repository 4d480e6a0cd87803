use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveTime;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".glow";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_API_PORT: u16 = 7891;

/// Machine-level settings. User preferences live in the database instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub api_port: u16,
    pub heatmap_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        let root = default_root_dir();

        Self {
            db_path: root.join("db").join("glow.db"),
            export_dir: default_export_dir(),
            api_port: DEFAULT_API_PORT,
            heatmap_days: 28,
        }
    }
}

impl Config {
    pub fn root_dir() -> PathBuf {
        default_root_dir()
    }

    pub fn config_path() -> PathBuf {
        default_root_dir().join(CONFIG_FILE)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the config, writing defaults only when no file exists yet.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load_from(config_path);
        }

        let config = Self::default();
        config.save_to(config_path)?;
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(config_path)?;

        Ok(())
    }

    pub fn ensure_bootstrap_files(&self) -> Result<()> {
        let root = Self::root_dir();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create root directory: {}", root.display()))?;

        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        fs::create_dir_all(&self.export_dir).with_context(|| {
            format!(
                "Failed to create export directory: {}",
                self.export_dir.display()
            )
        })?;

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "db_path" => {
                self.db_path = expand_home(value);
            }
            "export_dir" => {
                self.export_dir = expand_home(value);
            }
            "api_port" => {
                self.api_port = value
                    .parse::<u16>()
                    .map_err(|_| anyhow!("api_port must be a number"))?;
            }
            "heatmap_days" => {
                let days = value
                    .parse::<u32>()
                    .map_err(|_| anyhow!("heatmap_days must be a number"))?;
                if !(7..=366).contains(&days) {
                    bail!("heatmap_days must be between 7 and 366");
                }
                self.heatmap_days = days;
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: db_path|db.path, export_dir|export.dir, api_port|api.port, heatmap_days|heatmap.days"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "db_path" => Some(self.db_path.display().to_string()),
            "export_dir" => Some(self.export_dir.display().to_string()),
            "api_port" => Some(self.api_port.to_string()),
            "heatmap_days" => Some(self.heatmap_days.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "db_path" | "db.path" => "db_path",
        "export_dir" | "export.dir" => "export_dir",
        "api_port" | "api.port" => "api_port",
        "heatmap_days" | "heatmap.days" => "heatmap_days",
        _ => key,
    }
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .with_context(|| format!("Invalid time format: {value}. Example: 21:00 (24-hour format)",))
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

pub fn default_export_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("Glow")
        .join("exports")
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}
