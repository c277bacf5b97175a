//! Zoom direction with hysteresis and hold-repeat
//!
//! ```text
//!            |z| > start                    |z| > start
//!   WIDE(-1) <──────────── STOPPED(0) ────────────> TELE(+1)
//!      │                    ▲      ▲                   │
//!      └── |z| < stop for ──┘      └── |z| < stop for ─┘
//!          N ticks in a row            N ticks in a row
//! ```
//!
//! Between the two thresholds the previous direction is held. While moving,
//! the command is repeated every interval since the camera firmware stops
//! a zoom that is not refreshed.

use std::time::Duration;
use tokio::time::Instant;

use super::state::ControlState;
use crate::config::ControlConfig;
use crate::visca::ZoomDirection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTuning {
    pub start_threshold: f32,
    pub stop_threshold: f32,
    pub stop_ticks: u32,
    pub repeat_interval: Duration,
}

impl From<&ControlConfig> for ZoomTuning {
    fn from(config: &ControlConfig) -> Self {
        Self {
            start_threshold: config.zoom_start_threshold,
            stop_threshold: config.zoom_stop_threshold,
            stop_ticks: config.zoom_stop_ticks,
            repeat_interval: config.zoom_repeat(),
        }
    }
}

/// Combines two raw trigger readings (-1.0 released .. 1.0 pressed) into one signed value.
pub fn combine_triggers(tele_raw: f32, wide_raw: f32) -> f32 {
    let tele = ((tele_raw + 1.0) / 2.0).clamp(0.0, 1.0);
    let wide = ((wide_raw + 1.0) / 2.0).clamp(0.0, 1.0);
    tele - wide
}

impl ZoomTuning {
    /// Resolves this tick's zoom direction, updating the stop streak in `state`.
    pub fn resolve(&self, z: f32, state: &mut ControlState) -> ZoomDirection {
        let magnitude = z.abs();

        if magnitude > self.start_threshold {
            state.zoom_stop_streak = 0;
            ZoomDirection::from_sign(z)
        } else if magnitude < self.stop_threshold {
            state.zoom_stop_streak = state.zoom_stop_streak.saturating_add(1);
            if state.zoom_stop_streak >= self.stop_ticks {
                ZoomDirection::Stopped
            } else {
                state.last_zoom_direction
            }
        } else {
            state.zoom_stop_streak = 0;
            state.last_zoom_direction
        }
    }

    /// Whether a zoom command for `direction` goes out this tick.
    pub fn send_due(&self, direction: ZoomDirection, state: &ControlState, now: Instant) -> bool {
        if direction != state.last_zoom_direction {
            return true;
        }
        direction.is_moving()
            && state
                .last_zoom_sent_at
                .map_or(true, |sent| now.saturating_duration_since(sent) >= self.repeat_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> ZoomTuning {
        ZoomTuning::from(&ControlConfig::default())
    }

    #[test]
    fn triggers_combine_into_signed_value() {
        assert_eq!(combine_triggers(-1.0, -1.0), 0.0);
        assert_eq!(combine_triggers(1.0, -1.0), 1.0);
        assert_eq!(combine_triggers(-1.0, 1.0), -1.0);
        assert_eq!(combine_triggers(1.0, 1.0), 0.0);
        assert_eq!(combine_triggers(0.0, -1.0), 0.5);
    }

    #[test]
    fn hysteresis_holds_then_stops_after_streak() {
        let tuning = tuning();
        let mut state = ControlState::new(&ControlConfig::default());
        let now = Instant::now();

        let mut directions = Vec::new();
        for z in [0.5, 0.5, 0.02, 0.02, 0.02] {
            let direction = tuning.resolve(z, &mut state);
            if tuning.send_due(direction, &state, now) {
                state.record_zoom_sent(direction, now);
            }
            directions.push(direction);
        }

        assert_eq!(
            directions,
            vec![
                ZoomDirection::Tele,
                ZoomDirection::Tele,
                ZoomDirection::Tele,
                ZoomDirection::Tele,
                ZoomDirection::Stopped,
            ]
        );
        assert_eq!(state.zoom_stop_streak, 3);
    }

    #[test]
    fn between_thresholds_holds_and_resets_streak() {
        let tuning = tuning();
        let mut state = ControlState::new(&ControlConfig::default());
        state.last_zoom_direction = ZoomDirection::Wide;

        assert_eq!(tuning.resolve(0.01, &mut state), ZoomDirection::Wide);
        assert_eq!(tuning.resolve(-0.01, &mut state), ZoomDirection::Wide);
        assert_eq!(state.zoom_stop_streak, 2);

        assert_eq!(tuning.resolve(-0.07, &mut state), ZoomDirection::Wide);
        assert_eq!(state.zoom_stop_streak, 0);

        assert_eq!(tuning.resolve(0.0, &mut state), ZoomDirection::Wide);
        assert_eq!(tuning.resolve(0.0, &mut state), ZoomDirection::Wide);
        assert_eq!(tuning.resolve(0.0, &mut state), ZoomDirection::Stopped);
    }

    #[test]
    fn reversal_is_immediate() {
        let tuning = tuning();
        let mut state = ControlState::new(&ControlConfig::default());
        state.last_zoom_direction = ZoomDirection::Tele;

        assert_eq!(tuning.resolve(-0.6, &mut state), ZoomDirection::Wide);
    }

    #[test]
    fn repeat_waits_for_interval() {
        let tuning = tuning();
        let mut state = ControlState::new(&ControlConfig::default());
        let start = Instant::now();
        state.record_zoom_sent(ZoomDirection::Tele, start);

        let at = |ms| start + Duration::from_millis(ms);
        assert!(!tuning.send_due(ZoomDirection::Tele, &state, at(50)));
        assert!(!tuning.send_due(ZoomDirection::Tele, &state, at(199)));
        assert!(tuning.send_due(ZoomDirection::Tele, &state, at(200)));
    }

    #[test]
    fn direction_change_sends_immediately() {
        let tuning = tuning();
        let mut state = ControlState::new(&ControlConfig::default());
        let start = Instant::now();
        state.record_zoom_sent(ZoomDirection::Tele, start);

        assert!(tuning.send_due(ZoomDirection::Wide, &state, start));
        assert!(tuning.send_due(ZoomDirection::Stopped, &state, start));
    }

    #[test]
    fn stopped_is_not_repeated() {
        let tuning = tuning();
        let mut state = ControlState::new(&ControlConfig::default());
        let start = Instant::now();

        assert!(!tuning.send_due(ZoomDirection::Stopped, &state, start));
        state.record_zoom_sent(ZoomDirection::Stopped, start);
        assert!(!tuning.send_due(
            ZoomDirection::Stopped,
            &state,
            start + Duration::from_secs(5)
        ));
    }
}
