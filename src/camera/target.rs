//! Camera addresses
//!
//! Targets come from `PTZ_CAMS` entries (`[tcp|udp:]host[:port]`) or from
//! `[[cameras]]` in the config. Bad entries are reported and skipped; the
//! resulting [`CameraTargets`] list is never empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Address used when no valid camera is configured
pub const DEFAULT_HOST: &str = "192.168.1.150";

/// Network transport for one camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Tcp,
    Udp,
}

impl Transport {
    /// Port the camera listens on when none is given
    pub fn default_port(self) -> u16 {
        match self {
            Transport::Tcp => 5678,
            Transport::Udp => 1259,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "tcp" => Some(Transport::Tcp),
            "udp" => Some(Transport::Udp),
            _ => None,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Tcp => write!(f, "tcp"),
            Transport::Udp => write!(f, "udp"),
        }
    }
}

/// One camera endpoint, fixed after parsing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraTarget {
    pub host: String,
    pub transport: Transport,
    pub port: u16,
}

impl CameraTarget {
    /// `port` defaults to the transport's usual VISCA port
    pub fn new(host: impl Into<String>, transport: Transport, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            transport,
            port: port.unwrap_or_else(|| transport.default_port()),
        }
    }
}

impl Default for CameraTarget {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, Transport::Tcp, None)
    }
}

impl fmt::Display for CameraTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.transport, self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("Missing host in camera entry '{0}'")]
    MissingHost(String),

    #[error("Invalid port in camera entry '{entry}': {port}")]
    InvalidPort { entry: String, port: String },
}

/// Parses one `[tcp|udp:]host[:port]` entry.
pub fn parse_target(entry: &str) -> Result<CameraTarget, TargetError> {
    let entry = entry.trim();
    let mut parts: Vec<&str> = entry.split(':').collect();

    let mut transport = Transport::Tcp;
    if let Some(parsed) = parts.first().and_then(|prefix| Transport::from_prefix(prefix)) {
        transport = parsed;
        parts.remove(0);
    }

    let host = parts.first().map(|host| host.trim()).unwrap_or_default();
    if host.is_empty() {
        return Err(TargetError::MissingHost(entry.to_string()));
    }

    let port = match parts.get(1).map(|port| port.trim()) {
        Some(port) if !port.is_empty() => match port.parse::<u16>() {
            Ok(port) if port != 0 => Some(port),
            _ => {
                return Err(TargetError::InvalidPort {
                    entry: entry.to_string(),
                    port: port.to_string(),
                })
            }
        },
        _ => None,
    };

    Ok(CameraTarget::new(host, transport, port))
}

/// Parses a comma separated target list, collecting bad entries instead of failing.
pub fn parse_target_list(raw: &str) -> (Vec<CameraTarget>, Vec<TargetError>) {
    let mut targets = Vec::new();
    let mut errors = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        match parse_target(entry) {
            Ok(target) => {
                debug!("Parsed camera target: {}", target);
                targets.push(target);
            }
            Err(e) => {
                warn!("Skipping camera entry: {}", e);
                errors.push(e);
            }
        }
    }

    (targets, errors)
}

/// Ordered, never empty list of cameras addressed by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraTargets {
    targets: Vec<CameraTarget>,
}

impl CameraTargets {
    /// Builds the list, substituting the default camera when `targets` is empty.
    ///
    /// The flag is true when the fallback was used.
    pub fn with_fallback(targets: Vec<CameraTarget>) -> (Self, bool) {
        if targets.is_empty() {
            let fallback = CameraTarget::default();
            warn!("No valid camera configured, using default {}", fallback);
            (
                Self {
                    targets: vec![fallback],
                },
                true,
            )
        } else {
            (Self { targets }, false)
        }
    }

    /// Number of cameras, never zero
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Target at `index`, wrapping around the list
    pub fn get(&self, index: usize) -> &CameraTarget {
        &self.targets[index % self.targets.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CameraTarget> {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_tcp() {
        let target = parse_target("10.0.0.5").unwrap();
        assert_eq!(target, CameraTarget::new("10.0.0.5", Transport::Tcp, Some(5678)));
    }

    #[test]
    fn transport_prefix_picks_default_port() {
        let target = parse_target("UDP:10.0.0.6").unwrap();
        assert_eq!(target.transport, Transport::Udp);
        assert_eq!(target.port, 1259);
    }

    #[test]
    fn explicit_port_wins() {
        let target = parse_target("udp:cam.local:52381").unwrap();
        assert_eq!(target.host, "cam.local");
        assert_eq!(target.port, 52381);

        let target = parse_target("10.0.0.7:9000").unwrap();
        assert_eq!(target.transport, Transport::Tcp);
        assert_eq!(target.port, 9000);
    }

    #[test]
    fn empty_port_falls_back_to_default() {
        let target = parse_target("tcp:10.0.0.8:").unwrap();
        assert_eq!(target.port, 5678);
    }

    #[test]
    fn bad_entries_are_reported() {
        assert!(matches!(
            parse_target("10.0.0.9:abc"),
            Err(TargetError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_target("10.0.0.9:70000"),
            Err(TargetError::InvalidPort { .. })
        ));
        assert!(matches!(parse_target("udp:"), Err(TargetError::MissingHost(_))));
    }

    #[test]
    fn list_skips_invalid_and_blank_entries() {
        let (targets, errors) = parse_target_list("10.0.0.1, ,udp:10.0.0.2,10.0.0.3:x,");
        assert_eq!(targets.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(targets[1].transport, Transport::Udp);
    }

    #[test]
    fn empty_list_uses_default_camera() {
        let (targets, used_fallback) = CameraTargets::with_fallback(Vec::new());
        assert!(used_fallback);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.get(0), &CameraTarget::default());
    }

    #[test]
    fn lookup_wraps_around_the_list() {
        let (targets, _) = CameraTargets::with_fallback(vec![
            CameraTarget::new("a", Transport::Tcp, None),
            CameraTarget::new("b", Transport::Tcp, None),
            CameraTarget::new("c", Transport::Udp, None),
        ]);
        assert_eq!(targets.get(2).host, "c");
        assert_eq!(targets.get(3).host, "a");
    }

    #[test]
    fn display_includes_transport() {
        let target = CameraTarget::new("10.0.0.1", Transport::Udp, None);
        assert_eq!(target.to_string(), "udp://10.0.0.1:1259");
    }
}
