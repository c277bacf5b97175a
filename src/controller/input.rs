//! Device-independent gamepad state
//!
//! The control engine only sees [`InputSample`]s; where they come from is
//! hidden behind [`InputSource`], which also lets tests script a device.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Analog controls read once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

impl AxisId {
    /// Triggers rest at -1.0 instead of 0.0
    pub fn is_trigger(self) -> bool {
        matches!(self, AxisId::LeftTrigger | AxisId::RightTrigger)
    }
}

// Named after the face/shoulder position, not the vendor label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    South,
    East,
    North,
    West,
    LeftBumper,
    RightBumper,
    LeftStick,
    RightStick,
    Start,
    Select,
    Guide,
}

/// D-pad state, each component in {-1, 0, 1}. Up and right are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hat {
    pub x: i8,
    pub y: i8,
}

impl Hat {
    /// Clamps both components to their sign
    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }
}

/// Read-only snapshot of one device for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct InputSample {
    axes: HashMap<AxisId, f32>,
    buttons: HashMap<ButtonId, bool>,
    hat: Hat,
}

impl Default for InputSample {
    /// Centered sticks, released triggers, nothing pressed
    fn default() -> Self {
        let mut axes = HashMap::new();
        axes.insert(AxisId::LeftTrigger, -1.0);
        axes.insert(AxisId::RightTrigger, -1.0);
        Self {
            axes,
            buttons: HashMap::new(),
            hat: Hat::default(),
        }
    }
}

impl InputSample {
    pub fn with_axis(mut self, axis: AxisId, value: f32) -> Self {
        self.set_axis(axis, value);
        self
    }

    pub fn with_button(mut self, button: ButtonId, pressed: bool) -> Self {
        self.set_button(button, pressed);
        self
    }

    pub fn with_hat(mut self, hat: Hat) -> Self {
        self.hat = hat;
        self
    }

    pub fn set_axis(&mut self, axis: AxisId, value: f32) {
        self.axes.insert(axis, value.clamp(-1.0, 1.0));
    }

    pub fn set_button(&mut self, button: ButtonId, pressed: bool) {
        self.buttons.insert(button, pressed);
    }

    pub fn set_hat(&mut self, hat: Hat) {
        self.hat = hat;
    }

    /// Axis value, 0.0 for sticks and -1.0 (released) for triggers when unknown
    pub fn axis(&self, axis: AxisId) -> f32 {
        match self.axes.get(&axis) {
            Some(value) => *value,
            None if axis.is_trigger() => -1.0,
            None => 0.0,
        }
    }

    /// Button state, unreported buttons read as released
    pub fn pressed(&self, button: ButtonId) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    pub fn hat(&self) -> Hat {
        self.hat
    }
}

/// Errors raised while bringing up the gamepad backend
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),
}

/// Polled source of gamepad state.
///
/// Zero connected devices is a normal state, not an error.
pub trait InputSource {
    /// Pumps pending device events and rescans for connected devices
    fn refresh(&mut self);

    /// Number of connected devices after the last refresh
    fn device_count(&self) -> usize;

    /// Name of the device samples are read from
    fn device_name(&self) -> Option<String>;

    /// Current state of the active device, `None` when no device is present
    fn sample(&mut self) -> Option<InputSample>;
}

/// Whether a device name suggests a radio link
pub fn is_wireless(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("bluetooth") || name.contains("wireless")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sample_is_neutral() {
        let sample = InputSample::default();
        assert_eq!(sample.axis(AxisId::RightStickX), 0.0);
        assert_eq!(sample.axis(AxisId::LeftTrigger), -1.0);
        assert!(!sample.pressed(ButtonId::South));
        assert_eq!(sample.hat(), Hat::default());
    }

    #[test]
    fn axis_values_are_clamped() {
        let sample = InputSample::default().with_axis(AxisId::LeftStickX, 1.7);
        assert_eq!(sample.axis(AxisId::LeftStickX), 1.0);
    }

    #[test]
    fn hat_components_collapse_to_sign() {
        assert_eq!(Hat::new(5, -3), Hat { x: 1, y: -1 });
    }

    #[test]
    fn wireless_names() {
        assert!(is_wireless("Xbox Wireless Controller"));
        assert!(is_wireless("8BitDo Bluetooth pad"));
        assert!(!is_wireless("Microsoft X-Box One pad"));
    }
}
