//! Loading configuration files and building contexts from them

use std::fs;

use fleetwatch::config::ConfigError;
use fleetwatch::{DeviceKind, DiagnosticsContext, FleetConfig};

#[test]
fn test_missing_file_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.toml");

    let config = FleetConfig::from_config(Some(&path)).unwrap();

    assert_eq!(config, FleetConfig::default());
    assert!(path.exists());

    let reloaded = FleetConfig::from_config(Some(&path)).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_extension_is_normalized() {
    let dir = tempfile::tempdir().unwrap();

    FleetConfig::from_config(Some(dir.path().join("fleet"))).unwrap();

    assert!(dir.path().join("fleet.toml").exists());
}

#[test]
fn test_custom_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[database]
id = "inventory"
host = "db.local"

[[printers]]
id = "zebra-7"
name = "Dock printer"
host = "10.0.0.7"
web_port = 80

[network]
hosts = ["10.0.0.1"]

[timeouts]
connect_ms = 1500
"#,
    )
    .unwrap();

    let config = FleetConfig::from_config(Some(&path)).unwrap();

    let database = config.database.as_ref().unwrap();
    assert_eq!(database.port, 1433);
    assert_eq!(config.printers[0].port, 9100);
    assert_eq!(config.printers[0].web_port, Some(80));
    assert_eq!(config.timeouts.connect_ms, 1500);
    assert_eq!(config.timeouts.command_ms, 10_000);

    let ctx = DiagnosticsContext::from_config(&config).unwrap();
    let printer = ctx.registry().printer("zebra-7").unwrap();
    assert_eq!(printer.kind, DeviceKind::Printer);
    assert_eq!(printer.display_name, "Dock printer");
    assert_eq!(ctx.registry().network_hosts(), ["10.0.0.1"]);
}

#[test]
fn test_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[[printers]\nid = ").unwrap();

    assert!(matches!(FleetConfig::from_config(Some(&path)), Err(ConfigError::ParseFailed(_))));
}

#[test]
fn test_duplicate_printer_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[[printers]]
id = "zebra-1"
host = "10.0.0.1"

[[printers]]
id = "zebra-1"
host = "10.0.0.2"
"#,
    )
    .unwrap();

    let config = FleetConfig::from_config(Some(&path)).unwrap();

    assert!(matches!(
        DiagnosticsContext::from_config(&config),
        Err(ConfigError::DuplicateDevice(id)) if id == "zebra-1"
    ));
}

#[test]
fn test_zero_ping_attempts_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[timeouts]\nping_attempts = 0\n").unwrap();

    let config = FleetConfig::from_config(Some(&path)).unwrap();

    assert!(matches!(
        DiagnosticsContext::from_config(&config),
        Err(ConfigError::InvalidSetting { field: "timeouts.ping_attempts", .. })
    ));
}
