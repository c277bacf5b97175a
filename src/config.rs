//! Application configuration
//!
//! Read once at startup from a TOML file. Every section and field has a default,
//! so a missing file (or a partial one) still yields a working bridge. The
//! `PTZ_CAMS` environment variable, when set, replaces the `[[cameras]]` list.
//!
//! ```toml
//! [control]
//! max_speed = 24
//! initial_deadzone = 0.15
//! tick_ms = 50
//!
//! [[cameras]]
//! host = "192.168.1.150"
//! transport = "tcp"
//!
//! [[cameras]]
//! host = "192.168.1.151"
//! transport = "udp"
//! port = 52381
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::camera::{parse_target_list, CameraTarget, CameraTargets, TargetError, Transport};
use crate::controller::ControlLayout;
use crate::visca::{MAX_PAN_TILT_SPEED, MAX_ZOOM_SPEED};

pub const CONFIG_PATH_ENV: &str = "PTZPAD_CONFIG";
pub const CAMERAS_ENV: &str = "PTZ_CAMS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("Invalid control setting: {0}")]
    InvalidControl(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub control: ControlConfig,
    pub layout: ControlLayout,
    pub cameras: Vec<CameraEntry>,
    pub display: DisplayConfig,
    pub network: NetworkConfig,
}

/// Tunables of the control loop
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    /// Ceiling for the pan/tilt speed; also the startup speed
    pub max_speed: u8,
    /// Pan/tilt deadzone at startup, within `deadzone_min..=deadzone_max`
    pub initial_deadzone: f32,
    pub deadzone_min: f32,
    pub deadzone_max: f32,
    /// Deadzone change per D-pad left/right press
    pub deadzone_step: f32,
    /// Fixed deadzone of the focus axis
    pub focus_deadzone: f32,
    /// Ceiling for the zoom speed; also the startup speed
    pub max_zoom_speed: u8,
    /// Combined trigger value above which zoom starts
    pub zoom_start_threshold: f32,
    /// Combined trigger value below which the stop streak counts
    pub zoom_stop_threshold: f32,
    /// Resend interval for a held zoom
    pub zoom_repeat_ms: u64,
    /// Consecutive ticks below the stop threshold before zoom stops
    pub zoom_stop_ticks: u32,
    /// Control loop period
    pub tick_ms: u64,
    /// Cooldown between two firings of the same discrete control
    pub debounce_ms: u64,
    /// Rescan interval while no gamepad is connected
    pub device_poll_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_PAN_TILT_SPEED,
            initial_deadzone: 0.15,
            deadzone_min: 0.0,
            deadzone_max: 0.5,
            deadzone_step: 0.01,
            focus_deadzone: 0.20,
            max_zoom_speed: MAX_ZOOM_SPEED,
            zoom_start_threshold: 0.10,
            zoom_stop_threshold: 0.05,
            zoom_repeat_ms: 200,
            zoom_stop_ticks: 3,
            tick_ms: 50,
            debounce_ms: 250,
            device_poll_ms: 1000,
        }
    }
}

impl ControlConfig {
    /// Checks ranges and relations between fields; the first problem is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::InvalidControl(msg));

        if self.max_speed == 0 || self.max_speed > MAX_PAN_TILT_SPEED {
            return invalid(format!(
                "max_speed {:#04x} outside 0x01..=0x18",
                self.max_speed
            ));
        }
        if self.max_zoom_speed > MAX_ZOOM_SPEED {
            return invalid(format!(
                "max_zoom_speed {:#04x} above 0x07",
                self.max_zoom_speed
            ));
        }
        if !(0.0..=0.5).contains(&self.deadzone_min)
            || !(0.0..=0.5).contains(&self.deadzone_max)
            || self.deadzone_min > self.deadzone_max
        {
            return invalid(format!(
                "deadzone bounds {}..{} must lie within 0.0..=0.5",
                self.deadzone_min, self.deadzone_max
            ));
        }
        if !(self.deadzone_min..=self.deadzone_max).contains(&self.initial_deadzone) {
            return invalid(format!(
                "initial_deadzone {} outside bounds",
                self.initial_deadzone
            ));
        }
        if !(0.0..1.0).contains(&self.focus_deadzone) {
            return invalid(format!("focus_deadzone {}", self.focus_deadzone));
        }
        if self.zoom_stop_threshold > self.zoom_start_threshold {
            return invalid(format!(
                "zoom_stop_threshold {} above zoom_start_threshold {}",
                self.zoom_stop_threshold, self.zoom_start_threshold
            ));
        }
        if !self.deadzone_step.is_finite() || self.deadzone_step <= 0.0 || self.deadzone_step > 0.5
        {
            return invalid(format!(
                "deadzone_step {} outside 0.0..=0.5 (exclusive of 0)",
                self.deadzone_step
            ));
        }
        if self.tick_ms == 0 || self.zoom_stop_ticks == 0 || self.device_poll_ms == 0 {
            return invalid(
                "tick_ms, zoom_stop_ticks and device_poll_ms must be non-zero".to_string(),
            );
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn zoom_repeat(&self) -> Duration {
        Duration::from_millis(self.zoom_repeat_ms)
    }

    pub fn device_poll(&self) -> Duration {
        Duration::from_millis(self.device_poll_ms)
    }
}

/// One `[[cameras]]` entry
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CameraEntry {
    pub host: String,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub port: Option<u16>,
}

impl CameraEntry {
    /// Rejects a blank host or port 0, fills in the transport's default port
    pub fn to_target(&self) -> Result<CameraTarget, TargetError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(TargetError::MissingHost(format!("{:?}", self)));
        }
        if self.port == Some(0) {
            return Err(TargetError::InvalidPort {
                entry: host.to_string(),
                port: "0".to_string(),
            });
        }
        Ok(CameraTarget::new(host, self.transport, self.port))
    }
}

/// Status OLED settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    /// Linux I2C bus number (`/dev/i2c-N`)
    pub i2c_bus: u8,
    pub i2c_address: u16,
    /// Minimum time between two different screens
    pub min_interval_ms: u64,
    /// Redraw interval for an unchanged screen
    pub keepalive_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            i2c_bus: 3,
            i2c_address: 0x3C,
            min_interval_ms: 200,
            keepalive_secs: 30,
        }
    }
}

/// Camera connection settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Budget for connecting and writing one command
    pub send_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: 300,
        }
    }
}

impl NetworkConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Resolved camera list plus what went wrong while building it
#[derive(Debug)]
pub struct CameraSetup {
    pub targets: CameraTargets,
    /// One entry per skipped camera, in input order
    pub errors: Vec<ConfigError>,
    /// True when nothing valid was configured and the default camera is used
    pub used_fallback: bool,
    /// Whether the list came from `PTZ_CAMS` rather than `[[cameras]]`
    pub from_env: bool,
}

impl CameraSetup {
    /// Short operator-facing text for one of `errors`, sized for the status display
    pub fn status_message(&self, error: &ConfigError) -> &'static str {
        match (error, self.from_env) {
            (ConfigError::Target(TargetError::InvalidPort { .. }), true) => "Bad PTZ_CAMS port",
            (ConfigError::Target(TargetError::MissingHost(_)), true) => "Bad PTZ_CAMS entry",
            (ConfigError::Target(TargetError::InvalidPort { .. }), false) => "Bad camera port",
            (ConfigError::Target(TargetError::MissingHost(_)), false) => "Bad camera entry",
            _ => "Config error",
        }
    }

    /// Status text shown when the default camera replaced an empty list
    pub fn fallback_message(&self) -> &'static str {
        if self.from_env {
            "PTZ_CAMS invalid; using default"
        } else {
            "No cameras; using default"
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// `$PTZPAD_CONFIG`, else `<config dir>/ptzpad/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("ptzpad").join("config.toml"))
    }

    /// Loads the config, degrading to defaults on any problem.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        let mut config = match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                error!("{}; using defaults", e);
                return Self::default();
            }
        };

        if let Err(e) = config.control.validate() {
            error!("{}; using default control settings", e);
            config.control = ControlConfig::default();
        }
        debug!("Effective config: {:?}", config);
        config
    }

    /// Builds the camera list from `cameras_env` when given, else from `[[cameras]]`.
    pub fn camera_setup(&self, cameras_env: Option<&str>) -> CameraSetup {
        let (targets, target_errors) = match cameras_env {
            Some(raw) => {
                info!("Using cameras from {}", CAMERAS_ENV);
                parse_target_list(raw)
            }
            None => {
                let mut targets = Vec::new();
                let mut errors = Vec::new();
                for entry in &self.cameras {
                    match entry.to_target() {
                        Ok(target) => targets.push(target),
                        Err(e) => {
                            warn!("Skipping camera entry: {}", e);
                            errors.push(e);
                        }
                    }
                }
                (targets, errors)
            }
        };

        let (targets, used_fallback) = CameraTargets::with_fallback(targets);
        CameraSetup {
            targets,
            errors: target_errors.into_iter().map(ConfigError::from).collect(),
            used_fallback,
            from_env: cameras_env.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{AxisId, ButtonId};
    use std::io::Write;

    const SAMPLE_CONFIG: &str = r#"
        [control]
        max_speed = 16
        initial_deadzone = 0.2
        zoom_repeat_ms = 150

        [layout]
        camera_select = "north"
        zoom_tele_axis = "left_trigger"

        [[cameras]]
        host = "10.0.0.10"

        [[cameras]]
        host = "10.0.0.11"
        transport = "udp"
        port = 52381

        [display]
        enabled = false
    "#;

    #[test]
    fn empty_config_is_default() {
        let config = AppConfig::from_toml_str("").expect("config should parse");
        assert_eq!(config, AppConfig::default());
        assert!(config.control.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = AppConfig::from_toml_str(SAMPLE_CONFIG).expect("config should parse");
        assert_eq!(config.control.max_speed, 16);
        assert_eq!(config.control.zoom_repeat(), Duration::from_millis(150));
        assert_eq!(config.control.tick_ms, 50);
        assert_eq!(config.layout.camera_select, ButtonId::North);
        assert_eq!(config.layout.zoom_tele_axis, AxisId::LeftTrigger);
        assert_eq!(config.layout.autofocus, ButtonId::LeftStick);
        assert!(!config.display.enabled);
        assert_eq!(config.display.i2c_address, 0x3C);
    }

    #[test]
    fn cameras_from_file_entries() {
        let config = AppConfig::from_toml_str(SAMPLE_CONFIG).unwrap();
        let setup = config.camera_setup(None);
        assert!(!setup.used_fallback);
        assert!(setup.errors.is_empty());
        assert_eq!(setup.targets.len(), 2);
        assert_eq!(
            setup.targets.get(0),
            &CameraTarget::new("10.0.0.10", Transport::Tcp, Some(5678))
        );
        assert_eq!(setup.targets.get(1).port, 52381);
    }

    #[test]
    fn env_list_overrides_file_entries() {
        let config = AppConfig::from_toml_str(SAMPLE_CONFIG).unwrap();
        let setup = config.camera_setup(Some("udp:10.0.0.20"));
        assert_eq!(setup.targets.len(), 1);
        assert_eq!(setup.targets.get(0).transport, Transport::Udp);
    }

    #[test]
    fn invalid_env_list_falls_back_to_default() {
        let setup = AppConfig::default().camera_setup(Some("10.0.0.30:nope"));
        assert!(setup.used_fallback);
        assert_eq!(setup.errors.len(), 1);
        assert_eq!(setup.targets.get(0), &CameraTarget::default());
    }

    #[test]
    fn blank_host_entry_is_skipped() {
        let config = AppConfig::from_toml_str(
            r#"
            [[cameras]]
            host = " "
            [[cameras]]
            host = "10.0.0.40"
            "#,
        )
        .unwrap();
        let setup = config.camera_setup(None);
        assert_eq!(setup.errors.len(), 1);
        assert_eq!(setup.targets.len(), 1);
    }

    #[test]
    fn rejects_out_of_range_control_settings() {
        let mut control = ControlConfig::default();
        control.max_speed = 0x19;
        assert!(control.validate().is_err());

        let mut control = ControlConfig::default();
        control.zoom_stop_threshold = 0.2;
        assert!(control.validate().is_err());

        let mut control = ControlConfig::default();
        control.initial_deadzone = 0.6;
        assert!(control.validate().is_err());
    }

    #[test]
    fn rejects_busy_polling_and_bad_deadzone_steps() {
        let mut control = ControlConfig::default();
        control.device_poll_ms = 0;
        assert!(control.validate().is_err());

        for step in [0.0, -0.01, f32::NAN, f32::INFINITY, 0.6] {
            let mut control = ControlConfig::default();
            control.deadzone_step = step;
            assert!(control.validate().is_err(), "step {step} accepted");
        }
    }

    #[test]
    fn status_messages_follow_the_error_kind() {
        let env = AppConfig::default().camera_setup(Some("10.0.0.1:x,udp:,10.0.0.2"));
        assert!(!env.used_fallback);
        let messages: Vec<_> = env.errors.iter().map(|e| env.status_message(e)).collect();
        assert_eq!(messages, vec!["Bad PTZ_CAMS port", "Bad PTZ_CAMS entry"]);

        let config = AppConfig::from_toml_str(
            r#"
            [[cameras]]
            host = ""
            "#,
        )
        .unwrap();
        let file = config.camera_setup(None);
        assert_eq!(file.status_message(&file.errors[0]), "Bad camera entry");
        assert_eq!(file.fallback_message(), "No cameras; using default");

        let empty = AppConfig::default().camera_setup(Some(""));
        assert_eq!(empty.fallback_message(), "PTZ_CAMS invalid; using default");
    }

    #[test]
    fn unknown_transport_is_a_parse_error() {
        let result = AppConfig::from_toml_str(
            r#"
            [[cameras]]
            host = "10.0.0.50"
            transport = "serial"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_reads_file_and_degrades_on_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE_CONFIG).unwrap();
        let config = AppConfig::load(Some(file.path()));
        assert_eq!(config.control.max_speed, 16);

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "[control\nmax_speed = ").unwrap();
        assert_eq!(AppConfig::load(Some(broken.path())), AppConfig::default());

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        write!(invalid, "[control]\nmax_speed = 0\n[display]\nenabled = false\n").unwrap();
        let config = AppConfig::load(Some(invalid.path()));
        assert_eq!(config.control, ControlConfig::default());
        assert!(!config.display.enabled);

        let missing = file.path().with_extension("missing");
        assert_eq!(AppConfig::load(Some(&missing)), AppConfig::default());
    }
}
