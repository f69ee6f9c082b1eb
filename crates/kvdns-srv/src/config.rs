//! Server configuration for kvdns.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a kvdns node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// UDP/TCP listen address (default: 127.0.0.1:5353).
    pub listen: SocketAddr,

    /// Record database file.
    pub database: PathBuf,

    /// Do not start the TCP listener.
    pub disable_tcp: bool,

    /// Do not start the UDP listener.
    pub disable_udp: bool,

    /// TTL stamped on every answer, in seconds.
    pub ttl: u32,

    /// Idle timeout for TCP connections (seconds).
    pub tcp_timeout_secs: u64,

    /// HTTP management API listen address (default: 127.0.0.1:5380).
    pub api_listen: SocketAddr,

    /// Do not start the management API.
    pub disable_api: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, 5353)),
            database: default_database_path(),
            disable_tcp: false,
            disable_udp: false,
            ttl: 0,
            tcp_timeout_secs: default_tcp_timeout(),
            api_listen: SocketAddr::from((Ipv4Addr::LOCALHOST, 5380)),
            disable_api: false,
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::SrvError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Reject configurations that cannot serve anything.
    pub fn validate(&self) -> crate::Result<()> {
        if self.disable_tcp && self.disable_udp {
            return Err(crate::SrvError::Config(
                "both TCP and UDP listeners are disabled".into(),
            ));
        }
        if !self.disable_tcp
            && !self.disable_api
            && self.api_listen == self.listen
            && self.listen.port() != 0
        {
            return Err(crate::SrvError::Config(format!(
                "api_listen and listen are both {}",
                self.listen
            )));
        }
        if self.tcp_timeout_secs == 0 {
            return Err(crate::SrvError::Config(
                "tcp_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn tcp_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_timeout_secs)
    }
}

/// `<data dir>/kvdns/records.redb`, or `./records.redb` without one.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("records.redb"),
        |dir| dir.join("kvdns").join("records.redb"),
    )
}

const fn default_tcp_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen.port(), 5353);
        assert!(config.listen.ip().is_loopback());
        assert_eq!(config.ttl, 0);
        assert_eq!(config.tcp_timeout(), Duration::from_secs(30));
        assert!(config.database.ends_with("records.redb"));
        assert_eq!(config.api_listen.port(), 5380);
        assert!(!config.disable_api);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            listen = "0.0.0.0:53"
            ttl = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.listen.port(), 53);
        assert_eq!(config.ttl, 300);
        assert!(!config.disable_udp);
        assert_eq!(config.tcp_timeout_secs, 30);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kvdns.toml");
        std::fs::write(&path, "listen = 5").unwrap();
        assert!(matches!(
            ServerConfig::load(&path),
            Err(crate::SrvError::Config(_))
        ));
    }

    #[test]
    fn test_both_transports_disabled_is_invalid() {
        let config = ServerConfig {
            disable_tcp: true,
            disable_udp: true,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_cannot_share_the_dns_tcp_address() {
        let mut config = ServerConfig {
            api_listen: ServerConfig::default().listen,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        config.disable_api = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
