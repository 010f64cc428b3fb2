//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3000                 # HTTP port number
//! watch = true                # Rebuild on source changes (dev only)
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    pub port: u16,

    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            watch: true,
        }
    }
}

impl ServeConfig {
    pub const PORT: FieldPath = FieldPath::new("serve.port");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port must not be 0");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_serve_interfaces() {
        for (toml, expected) in [
            ("", "127.0.0.1"),
            ("[serve]\ninterface = \"0.0.0.0\"", "0.0.0.0"),
            ("[serve]\ninterface = \"::1\"", "::1"),
        ] {
            let config = test_parse_config(toml);
            assert_eq!(config.serve.interface.to_string(), expected);
        }
    }

    #[test]
    fn test_serve_port_and_watch() {
        let config = test_parse_config("[serve]\nport = 8080\nwatch = false");
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.watch);
        assert!(ServeConfig::default().watch);
    }

    #[test]
    fn test_serve_port_zero() {
        let config = test_parse_config("[serve]\nport = 0");
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, ServeConfig::PORT);
    }
}
