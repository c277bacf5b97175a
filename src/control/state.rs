//! Runtime state adjusted from the gamepad
//!
//! The speed ceiling, deadzone and zoom speed start from the config and are
//! then stepped by the D-pad and bumpers. The zoom fields are bookkeeping for
//! [`super::zoom`] and only change when a zoom command is actually sent.

use tokio::time::Instant;
use tracing::info;

use crate::config::ControlConfig;
use crate::visca::ZoomDirection;

/// Mutable runtime state of the bridge, owned by the control loop
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub camera_index: usize,
    /// Current pan/tilt speed ceiling, 1..=config max
    pub max_speed: u8,
    /// Current stick deadzone for pan/tilt
    pub deadzone: f32,
    /// Current variable zoom speed, 0..=config max
    pub zoom_speed: u8,
    /// Direction of the last zoom command actually sent
    pub last_zoom_direction: ZoomDirection,
    /// Consecutive ticks with the trigger value below the stop threshold
    pub zoom_stop_streak: u32,
    pub last_zoom_sent_at: Option<Instant>,
}

impl ControlState {
    /// Camera 0, full speed, configured deadzone, zoom stopped
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            camera_index: 0,
            max_speed: config.max_speed,
            deadzone: config.initial_deadzone,
            zoom_speed: config.max_zoom_speed,
            last_zoom_direction: ZoomDirection::Stopped,
            zoom_stop_streak: 0,
            last_zoom_sent_at: None,
        }
    }

    /// Steps the pan/tilt speed ceiling up (`delta > 0`) or down within `1..=ceiling`
    pub fn adjust_max_speed(&mut self, delta: i8, ceiling: u8) {
        let next = (i16::from(self.max_speed) + i16::from(delta)).clamp(1, i16::from(ceiling));
        self.max_speed = next as u8;
        info!("MAX_SPEED {:#04x}", self.max_speed);
    }

    /// Steps the stick deadzone by `delta`, clamped to `min..=max`
    pub fn adjust_deadzone(&mut self, delta: f32, min: f32, max: f32) {
        let next = (self.deadzone + delta).clamp(min, max);
        // keep repeated 0.01 steps from drifting
        self.deadzone = (next * 1000.0).round() / 1000.0;
        info!("DEADZONE {:.2}", self.deadzone);
    }

    /// Steps the zoom speed up (`delta > 0`) or down within `0..=ceiling`
    pub fn adjust_zoom_speed(&mut self, delta: i8, ceiling: u8) {
        let next = (i16::from(self.zoom_speed) + i16::from(delta)).clamp(0, i16::from(ceiling));
        self.zoom_speed = next as u8;
        info!("ZOOM_SPEED {}", self.zoom_speed);
    }

    /// Marks a zoom command for `direction` as sent at `at`
    pub fn record_zoom_sent(&mut self, direction: ZoomDirection, at: Instant) {
        self.last_zoom_direction = direction;
        self.last_zoom_sent_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_config() {
        let state = ControlState::new(&ControlConfig::default());
        assert_eq!(state.camera_index, 0);
        assert_eq!(state.max_speed, 0x18);
        assert_eq!(state.deadzone, 0.15);
        assert_eq!(state.zoom_speed, 0x07);
        assert_eq!(state.last_zoom_direction, ZoomDirection::Stopped);
        assert!(state.last_zoom_sent_at.is_none());
    }

    #[test]
    fn max_speed_is_clamped() {
        let mut state = ControlState::new(&ControlConfig::default());
        state.adjust_max_speed(1, 0x18);
        assert_eq!(state.max_speed, 0x18);

        state.max_speed = 1;
        state.adjust_max_speed(-1, 0x18);
        assert_eq!(state.max_speed, 1);
    }

    #[test]
    fn deadzone_steps_stay_exact_and_bounded() {
        let mut state = ControlState::new(&ControlConfig::default());
        for _ in 0..10 {
            state.adjust_deadzone(0.01, 0.0, 0.5);
        }
        assert_eq!(state.deadzone, 0.25);

        for _ in 0..100 {
            state.adjust_deadzone(0.01, 0.0, 0.5);
        }
        assert_eq!(state.deadzone, 0.5);

        for _ in 0..100 {
            state.adjust_deadzone(-0.01, 0.0, 0.5);
        }
        assert_eq!(state.deadzone, 0.0);
    }

    #[test]
    fn zoom_speed_is_clamped() {
        let mut state = ControlState::new(&ControlConfig::default());
        state.adjust_zoom_speed(1, 7);
        assert_eq!(state.zoom_speed, 7);

        state.zoom_speed = 0;
        state.adjust_zoom_speed(-1, 7);
        assert_eq!(state.zoom_speed, 0);
    }
}
