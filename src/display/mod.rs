//! Status display for the operator
//!
//! The control loop raises named events through [`StatusDisplay`]; it never
//! learns whether a screen is attached. Two implementations:
//!
//! - [`StatusScreen`] - Rate-limited two-line renderer over any [`Panel`]
//!   (the SSD1306 OLED in [`oled`])
//! - [`NullDisplay`] - Used when no screen is configured or it fails to open
//!
//! Display failures stay inside this module; a panel that errors is dropped
//! and the screen degrades to a no-op.

pub mod oled;
pub mod status;

pub use oled::OledPanel;
pub use status::{Panel, StatusScreen};

use tracing::{info, warn};

use crate::config::DisplayConfig;

/// Failures opening or writing the panel; never leave this module
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// The I2C bus could not be opened
    #[error("I2C error: {0}")]
    I2c(#[from] rppal::i2c::Error),

    /// Panel-side failure reported by the SSD1306 driver
    #[error("Display write failed: {0}")]
    Panel(String),

    #[error("Display unavailable: {0}")]
    Unavailable(String),
}

/// Sink for operator-facing status events. Never blocks, never fails.
pub trait StatusDisplay {
    fn boot(&mut self, message: &str);
    fn joystick_waiting(&mut self);
    fn joystick_connected(&mut self, name: &str);
    fn joystick_disconnected(&mut self);
    fn bluetooth_linked(&mut self, name: &str);
    fn bluetooth_lost(&mut self);
    fn camera_active(&mut self, index: usize, host: &str);
    fn error(&mut self, message: &str);
    /// Re-renders the current lines when the keepalive is due
    fn refresh(&mut self);
}

#[derive(Debug, Default)]
pub struct NullDisplay;

impl StatusDisplay for NullDisplay {
    fn boot(&mut self, _message: &str) {}
    fn joystick_waiting(&mut self) {}
    fn joystick_connected(&mut self, _name: &str) {}
    fn joystick_disconnected(&mut self) {}
    fn bluetooth_linked(&mut self, _name: &str) {}
    fn bluetooth_lost(&mut self) {}
    fn camera_active(&mut self, _index: usize, _host: &str) {}
    fn error(&mut self, _message: &str) {}
    fn refresh(&mut self) {}
}

/// Opens the configured screen, falling back to [`NullDisplay`].
pub fn open_display(config: &DisplayConfig) -> Box<dyn StatusDisplay> {
    if !config.enabled {
        info!("Status display disabled in config");
        return Box::new(NullDisplay);
    }

    info!(
        "Initializing SSD1306 on I2C bus {} addr {:#04X}",
        config.i2c_bus, config.i2c_address
    );
    match OledPanel::open(config.i2c_bus, config.i2c_address) {
        Ok(panel) => {
            let mut screen = StatusScreen::new(
                panel,
                std::time::Duration::from_millis(config.min_interval_ms),
                std::time::Duration::from_secs(config.keepalive_secs),
            );
            screen.boot_screen();
            Box::new(screen)
        }
        Err(e) => {
            warn!("Failed to initialize OLED display: {}; running without screen", e);
            Box::new(NullDisplay)
        }
    }
}
