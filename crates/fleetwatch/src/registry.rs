//! Static catalog of monitored targets.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::{ConfigError, FleetConfig};
use crate::error::FleetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Database,
    Printer,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Database => write!(f, "database"),
            DeviceKind::Printer => write!(f, "printer"),
        }
    }
}

/// Last known reachability of a device, for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// A configured device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTarget {
    pub id: String,
    pub kind: DeviceKind,
    pub display_name: String,
    pub host: String,
    pub port: u16,
    /// Auxiliary port, the embedded web status page on printers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux_port: Option<u16>,
}

impl DeviceTarget {
    pub fn database(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self::new(id.into(), DeviceKind::Database, host.into(), port)
    }

    pub fn printer(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self::new(id.into(), DeviceKind::Printer, host.into(), port)
    }

    fn new(id: String, kind: DeviceKind, host: String, port: u16) -> Self {
        Self { display_name: id.clone(), id, kind, host, port, aux_port: None }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_aux_port(mut self, port: u16) -> Self {
        self.aux_port = Some(port);
        self
    }

    /// `host:port` of the primary service
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self, expected: DeviceKind) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidTarget { id: self.id.clone(), reason };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.kind != expected {
            return Err(invalid("device kind does not match its section"));
        }
        if self.host.trim().is_empty() {
            return Err(invalid("host must not be empty"));
        }
        if self.port == 0 || self.aux_port == Some(0) {
            return Err(invalid("port must not be 0"));
        }
        Ok(())
    }
}

/// Process-wide catalog of the database target, printers and network hosts.
///
/// Built once at start-up and never mutated afterwards, except for the
/// display-only [`LinkState`] of each device.
#[derive(Debug)]
pub struct DeviceRegistry {
    database: Option<DeviceTarget>,
    printers: Vec<DeviceTarget>,
    network_hosts: Vec<String>,
    link_states: RwLock<HashMap<String, LinkState>>,
}

impl DeviceRegistry {
    /// Build a registry, rejecting duplicate ids or hosts and malformed targets.
    pub fn new(
        database: Option<DeviceTarget>,
        printers: Vec<DeviceTarget>,
        network_hosts: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let mut ids = HashSet::new();

        if let Some(db) = &database {
            db.validate(DeviceKind::Database)?;
            ids.insert(db.id.clone());
        }
        for printer in &printers {
            printer.validate(DeviceKind::Printer)?;
            if !ids.insert(printer.id.clone()) {
                return Err(ConfigError::DuplicateDevice(printer.id.clone()));
            }
        }

        let mut hosts = HashSet::new();
        for host in &network_hosts {
            if host.trim().is_empty() {
                return Err(ConfigError::InvalidTarget {
                    id: host.clone(),
                    reason: "network host must not be empty",
                });
            }
            if !hosts.insert(host.as_str()) {
                return Err(ConfigError::DuplicateHost(host.clone()));
            }
        }

        let link_states = ids.into_iter().map(|id| (id, LinkState::Unknown)).collect();

        Ok(Self { database, printers, network_hosts, link_states: RwLock::new(link_states) })
    }

    pub fn from_config(config: &FleetConfig) -> Result<Self, ConfigError> {
        let database = config.database.as_ref().map(|db| DeviceTarget::database(&db.id, &db.host, db.port));

        let printers = config
            .printers
            .iter()
            .map(|p| {
                let mut target = DeviceTarget::printer(&p.id, &p.host, p.port);
                if let Some(name) = &p.name {
                    target = target.with_display_name(name);
                }
                if let Some(web_port) = p.web_port {
                    target = target.with_aux_port(web_port);
                }
                target
            })
            .collect();

        Self::new(database, printers, config.network.hosts.clone())
    }

    pub fn empty() -> Self {
        Self {
            database: None,
            printers: Vec::new(),
            network_hosts: Vec::new(),
            link_states: RwLock::new(HashMap::new()),
        }
    }

    pub fn database(&self) -> Option<&DeviceTarget> {
        self.database.as_ref()
    }

    /// Printers in registry order
    pub fn printers(&self) -> &[DeviceTarget] {
        &self.printers
    }

    pub fn network_hosts(&self) -> &[String] {
        &self.network_hosts
    }

    pub fn printer(&self, id: &str) -> Result<&DeviceTarget, FleetError> {
        self.printers
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| FleetError::UnknownDevice(id.to_string()))
    }

    pub fn database_by_id(&self, id: &str) -> Result<&DeviceTarget, FleetError> {
        self.database
            .as_ref()
            .filter(|db| db.id == id)
            .ok_or_else(|| FleetError::UnknownDevice(id.to_string()))
    }

    /// Outcome of the latest connection probe, reported on each `PrinterStatus`
    pub async fn link_state(&self, id: &str) -> LinkState {
        self.link_states.read().await.get(id).copied().unwrap_or_default()
    }

    pub(crate) async fn set_link_state(&self, id: &str, state: LinkState) {
        if let Some(slot) = self.link_states.write().await.get_mut(id) {
            *slot = state;
        }
    }
}
