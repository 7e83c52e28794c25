//! Daemon configuration.
//!
//! A single JSON file, read once at startup. Every field has a default
//! so an empty object is a valid config; the allow-list defaults to
//! empty, which rejects every card.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use latchkey_core::constants::{DEFAULT_NFC_INIT_RETRIES, DEFAULT_UDP_PORT};

/// Environment variable consulted when no config path argument is given.
pub const CONFIG_ENV: &str = "LATCHKEY_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Remote command/audit endpoint.
    pub server_addr: SocketAddr,

    /// Local port for the datagram command channel.
    pub udp_port: u16,

    /// Authorized card identifiers, validated at startup.
    pub allowed_cards: Vec<String>,

    /// Reader bring-up attempts before running without NFC.
    pub nfc_init_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:4200".parse().expect("valid literal address"),
            udp_port: DEFAULT_UDP_PORT,
            allowed_cards: Vec::new(),
            nfc_init_retries: DEFAULT_NFC_INIT_RETRIES,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the config: explicit path argument first, then the
    /// `LATCHKEY_CONFIG` environment variable, then built-in defaults.
    pub fn resolve(path_arg: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = path_arg {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(path);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_object_uses_defaults() {
        let file = write_config("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.udp_port, DEFAULT_UDP_PORT);
        assert_eq!(config.nfc_init_retries, DEFAULT_NFC_INIT_RETRIES);
        assert!(config.allowed_cards.is_empty());
    }

    #[test]
    fn full_config_round_trips() {
        let file = write_config(
            r#"{
                "server_addr": "10.0.0.5:4200",
                "udp_port": 4211,
                "allowed_cards": ["0411223344556677"],
                "nfc_init_retries": 5
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server_addr.port(), 4200);
        assert_eq!(config.udp_port, 4211);
        assert_eq!(config.allowed_cards, vec!["0411223344556677"]);
        assert_eq!(config.nfc_init_retries, 5);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let file = write_config(r#"{"allow_list": []}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/latchkey.json").is_err());
    }
}
