use std::fs::read_to_string;
use std::path::PathBuf;

use log::warn;
use serde::Deserialize;

/// Session-wide tunables. Loaded once when a [`crate::session::Session`] is
/// constructed and reused verbatim across restarts (the replacement adapter
/// process gets the same config as the one it replaces).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// How long a read waits for bytes from the adapter before failing with
    /// [`crate::error::Error::Timeout`].
    #[serde(with = "seconds")]
    pub read_timeout: std::time::Duration,
    /// Number of stack frames fetched (and cached) after a `stopped` event.
    pub stack_trace_levels: i64,
    /// Optional path to a raw wire trace log (see [`crate::trace::FileTracer`]).
    pub trace_log: Option<PathBuf>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            read_timeout: std::time::Duration::from_secs(30),
            stack_trace_levels: 20,
            trace_log: None,
        }
    }
}

impl ProxyConfig {
    const DEFAULT_PATH: &'static str = ".config/dap-proxy/config.toml";

    /// Parse a config from a TOML document. Unspecified fields keep their
    /// [`Default`] values.
    pub fn from_str(data: &str) -> Option<Self> {
        match toml::de::from_str(data) {
            Ok(cfg) => Some(cfg),
            Err(err) => {
                warn!(target: "dap_proxy", "invalid config: {err}");
                None
            }
        }
    }

    /// Load from an explicit path, or fall back to `~/.config/dap-proxy/config.toml`.
    /// Any I/O or parse error is logged and yields [`ProxyConfig::default`] —
    /// a host must always be able to start a session with no config file.
    pub fn load(path: Option<&str>) -> Self {
        let data = match path {
            Some(path) => match read_to_string(path) {
                Ok(data) => data,
                Err(err) => {
                    warn!(target: "dap_proxy", "could not read config {path}: {err}");
                    return Self::default();
                }
            },
            None => {
                let Some(home) = home::home_dir() else {
                    return Self::default();
                };
                match read_to_string(home.join(Self::DEFAULT_PATH)) {
                    Ok(data) => data,
                    Err(_) => return Self::default(),
                }
            }
        };

        Self::from_str(&data).unwrap_or_default()
    }
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = ProxyConfig::from_str("").unwrap();
        assert_eq!(cfg.read_timeout, std::time::Duration::from_secs(30));
        assert_eq!(cfg.stack_trace_levels, 20);
        assert!(cfg.trace_log.is_none());
    }

    #[test]
    fn partial_override() {
        let cfg = ProxyConfig::from_str("read_timeout = 5\n").unwrap();
        assert_eq!(cfg.read_timeout, std::time::Duration::from_secs(5));
        assert_eq!(cfg.stack_trace_levels, 20);
    }

    #[test]
    fn invalid_toml_returns_none() {
        assert!(ProxyConfig::from_str("not valid [[[ toml").is_none());
    }
}
