use crate::core::access::CapabilityTable;
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::window::StatsSpans;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Role used when `--role` is not given on the command line.
    #[serde(default = "default_role")]
    pub default_role: String,
    #[serde(default)]
    pub stats: StatsSpans,
    /// Cells here override the built-in capability table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilityTable>,
}

fn default_log_level() -> String {
    "loomstat=warn".to_string()
}
fn default_role() -> String {
    "supervisor".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            log_level: default_log_level(),
            default_role: default_role(),
            stats: StatsSpans::default(),
            capabilities: None,
        }
    }
}

impl Config {
    /// Return the standard configuration directory (`~/.loomstat`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".loomstat")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("loomstat.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("loomstat.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Built-in table with the configured overrides applied.
    pub fn capability_table(&self) -> CapabilityTable {
        match &self.capabilities {
            Some(overrides) => CapabilityTable::default().merged(overrides),
            None => CapabilityTable::default(),
        }
    }

    pub fn fallback_role(&self) -> AppResult<Role> {
        self.default_role
            .parse()
            .map_err(|_| AppError::Config(format!("invalid default_role '{}'", self.default_role)))
    }

    /// Initialize configuration and database files.
    /// Returns the database path that was configured.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<String> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() || is_test {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            fs::write(Self::config_file(), config.to_yaml()?)?;
        }

        Ok(config.database)
    }
}
