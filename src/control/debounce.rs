//! Cooldown for buttons and D-pad directions that change state once per press

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Discrete controls that share one cooldown each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscreteControl {
    CameraSelect,
    /// D-pad up/down
    MaxSpeed,
    /// D-pad left/right
    Deadzone,
    /// Bumpers
    ZoomSpeed,
    Autofocus,
}

/// Per-control cooldown tracked with "last fired" timestamps.
///
/// An active control fires at most once per cooldown window, so a short
/// press yields exactly one effect and a held control repeats at the
/// cooldown rate. Nothing here sleeps; the tick carries on regardless.
#[derive(Debug, Clone)]
pub struct Debouncer {
    cooldown: Duration,
    last_fired: HashMap<DiscreteControl, Instant>,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    /// Returns true when `control` is active and out of its cooldown, arming the cooldown.
    pub fn fire(&mut self, control: DiscreteControl, active: bool, now: Instant) -> bool {
        if !active {
            return false;
        }

        if let Some(last) = self.last_fired.get(&control) {
            if now.saturating_duration_since(*last) < self.cooldown {
                debug!("{:?} suppressed by cooldown", control);
                return false;
            }
        }

        self.last_fired.insert(control, now);
        true
    }
}
