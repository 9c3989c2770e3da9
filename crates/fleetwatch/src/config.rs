//! Configuration loading for the monitored fleet.
//!
//! The configuration is a TOML file describing the database target, the
//! printers and the hosts checked for network reachability. It is read once
//! at process start and turned into a [`crate::DeviceRegistry`].

use std::{env, fmt, fs, path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: std::io::Error },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: std::io::Error },

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("No config directory available (neither XDG_CONFIG_HOME nor HOME is set)")]
    ConfigPathUnavailable,

    #[error("Duplicate device id: {0}")]
    DuplicateDevice(String),

    #[error("Duplicate network host: {0}")]
    DuplicateHost(String),

    #[error("Invalid target {id}: {reason}")]
    InvalidTarget { id: String, reason: &'static str },

    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub printers: Vec<PrinterConfig>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub id: String,
    pub host: String,
    #[serde(default = "default_database_port")]
    pub port: u16,
    /// Catalog name used by query executors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub id: String,
    /// Human readable label, defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub host: String,
    #[serde(default = "default_printer_port")]
    pub port: u16,
    /// Port of the embedded HTTP status page, if the printer has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Probe deadlines in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    #[serde(default = "default_command_ms")]
    pub command_ms: u64,
    #[serde(default = "default_ping_ms")]
    pub ping_ms: u64,
    #[serde(default = "default_ping_attempts")]
    pub ping_attempts: u16,
    #[serde(default = "default_web_ms")]
    pub web_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Interval of the background quick check, 0 disables it
    #[serde(default = "default_quick_check_secs")]
    pub quick_check_secs: u64,
}

fn default_database_port() -> u16 {
    1433
}

fn default_printer_port() -> u16 {
    9100
}

fn default_connect_ms() -> u64 {
    5_000
}

fn default_command_ms() -> u64 {
    10_000
}

fn default_ping_ms() -> u64 {
    5_000
}

fn default_ping_attempts() -> u16 {
    3
}

fn default_web_ms() -> u64 {
    5_000
}

fn default_quick_check_secs() -> u64 {
    300
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            command_ms: default_command_ms(),
            ping_ms: default_ping_ms(),
            ping_attempts: default_ping_attempts(),
            web_ms: default_web_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn command(&self) -> Duration {
        Duration::from_millis(self.command_ms)
    }

    pub fn ping(&self) -> Duration {
        Duration::from_millis(self.ping_ms)
    }

    pub fn web(&self) -> Duration {
        Duration::from_millis(self.web_ms)
    }

    /// Every deadline and the ping attempt count must be non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("timeouts.connect_ms", self.connect_ms),
            ("timeouts.command_ms", self.command_ms),
            ("timeouts.ping_ms", self.ping_ms),
            ("timeouts.ping_attempts", u64::from(self.ping_attempts)),
            ("timeouts.web_ms", self.web_ms),
        ];

        match fields.into_iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::InvalidSetting { field, reason: "must be greater than zero" }),
            None => Ok(()),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { quick_check_secs: default_quick_check_secs() }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            database: Some(DatabaseConfig {
                id: "wapromag".into(),
                host: "mssql-wapromag".into(),
                port: default_database_port(),
                name: Some("WAPROMAG_TEST".into()),
            }),
            printers: vec![
                PrinterConfig {
                    id: "zebra-1".into(),
                    name: Some("ZEBRA-001".into()),
                    host: "zebra-printer-1".into(),
                    port: default_printer_port(),
                    web_port: Some(8080),
                },
                PrinterConfig {
                    id: "zebra-2".into(),
                    name: Some("ZEBRA-002".into()),
                    host: "zebra-printer-2".into(),
                    port: default_printer_port(),
                    web_port: Some(8080),
                },
            ],
            network: NetworkConfig {
                hosts: vec![
                    "mssql-wapromag".into(),
                    "zebra-printer-1".into(),
                    "zebra-printer-2".into(),
                ],
            },
            timeouts: TimeoutConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/fleetwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("fleetwatch/config.toml"))
}

impl fmt::Display for FleetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Fleet Configuration:")?;
        write_title_1(f, "Database")?;
        match &self.database {
            Some(db) => {
                write_1(f, "Id", &db.id)?;
                write_1(f, "Address", &format_args!("{}:{}", db.host, db.port))?;
            }
            None => write_1(f, "Id", &"<none>")?,
        }
        write_title_1(f, "Printers")?;
        for printer in &self.printers {
            write_1(f, "Id", &printer.id)?;
            write_2(f, "Address", &format_args!("{}:{}", printer.host, printer.port))?;
            if let Some(web_port) = printer.web_port {
                write_2(f, "Web Port", &web_port)?;
            }
        }
        write_title_1(f, "Network")?;
        write_1(f, "Hosts", &self.network.hosts.join(", "))?;
        write_title_1(f, "Timeouts")?;
        write_1(f, "Connect (ms)", &self.timeouts.connect_ms)?;
        write_1(f, "Command (ms)", &self.timeouts.command_ms)?;
        write_1(f, "Ping (ms)", &self.timeouts.ping_ms)?;

        Ok(())
    }
}

impl FleetConfig {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/fleetwatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```no_run
    /// let cfg = fleetwatch::FleetConfig::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), fleetwatch::config::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            debug!(path = %config_path.display(), "Reading fleet configuration");
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            warn!(path = %config_path.display(), "No configuration found, writing defaults");
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Apply `FLEETWATCH_DB_HOST` / `FLEETWATCH_DB_PORT` from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|name| env::var(name).ok());
        self
    }

    /// Apply database overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let host = lookup("FLEETWATCH_DB_HOST");
        let port = lookup("FLEETWATCH_DB_PORT");
        if host.is_none() && port.is_none() {
            return;
        }

        let Some(database) = self.database.as_mut() else {
            warn!("Database overrides present but no database is configured");
            return;
        };

        if let Some(host) = host {
            database.host = host;
        }
        if let Some(port) = port {
            match port.parse() {
                Ok(port) => database.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid FLEETWATCH_DB_PORT"),
            }
        }
    }
}
