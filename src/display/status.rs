//! Text status screen
//!
//! Turns display events into two short lines and decides when a panel write
//! is worth doing. A failing panel is dropped on the first error so the
//! control loop never sees display problems.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{DisplayError, StatusDisplay};

/// Characters that fit one line of the 128px panel
pub const LINE_WIDTH: usize = 21;

const TITLE: &str = "PTZ Bridge";

/// A surface that shows a few short text lines
pub trait Panel {
    fn show(&mut self, lines: &[String]) -> Result<(), DisplayError>;
}

/// Two-line status renderer with rate limiting and keepalive.
///
/// Identical lines are only redrawn once the keepalive interval has passed;
/// new lines are dropped if they arrive within `min_interval` of the last
/// draw. Forced renders (errors, boot screen) skip the keepalive wait and
/// always replace different lines, but an identical forced screen is still
/// held back for `min_interval`.
pub struct StatusScreen<P: Panel> {
    panel: Option<P>,
    min_interval: Duration,
    keepalive: Duration,
    last_lines: Vec<String>,
    last_update: Option<Instant>,
}

impl<P: Panel> StatusScreen<P> {
    pub fn new(panel: P, min_interval: Duration, keepalive: Duration) -> Self {
        Self {
            panel: Some(panel),
            min_interval,
            keepalive,
            last_lines: Vec::new(),
            last_update: None,
        }
    }

    /// Title plus "Starting up...", shown as soon as the panel opens
    pub fn boot_screen(&mut self) {
        self.render(&[TITLE, "Starting up..."], true);
    }

    fn render(&mut self, lines: &[&str], force: bool) {
        self.render_at(lines, force, Instant::now());
    }

    pub(crate) fn render_at(&mut self, lines: &[&str], force: bool, now: Instant) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };

        let normalized: Vec<String> = lines
            .iter()
            .map(|line| line.chars().take(LINE_WIDTH).collect())
            .collect();

        if let Some(last) = self.last_update {
            let elapsed = now.saturating_duration_since(last);
            let unchanged = normalized == self.last_lines;
            // forced lines still never redraw the same screen within min_interval
            let skip = if force {
                unchanged && elapsed < self.min_interval
            } else if unchanged {
                elapsed < self.keepalive
            } else {
                elapsed < self.min_interval
            };
            if skip {
                debug!("Dropping display update {:?}: rate limited", normalized);
                return;
            }
        }

        match panel.show(&normalized) {
            Ok(()) => {
                self.last_lines = normalized;
                self.last_update = Some(now);
            }
            Err(e) => {
                warn!("OLED write failed: {}; disabling display", e);
                self.panel = None;
            }
        }
    }

    pub(crate) fn refresh_at(&mut self, now: Instant) {
        if self.panel.is_none() || self.last_lines.is_empty() {
            return;
        }
        let lines = self.last_lines.clone();
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.render_at(&lines, false, now);
    }
}

impl<P: Panel> StatusDisplay for StatusScreen<P> {
    fn boot(&mut self, message: &str) {
        self.render(&[TITLE, message], false);
    }

    fn joystick_waiting(&mut self) {
        self.render(&["Waiting for joystick", "Connect controller..."], false);
    }

    fn joystick_connected(&mut self, name: &str) {
        self.render(&["Joystick connected", name], false);
    }

    fn joystick_disconnected(&mut self) {
        self.render(&["Joystick disconnected", "Waiting to reconnect"], false);
    }

    fn bluetooth_linked(&mut self, name: &str) {
        self.render(&["Bluetooth linked", name], false);
    }

    fn bluetooth_lost(&mut self) {
        self.render(&["Bluetooth link lost", "Reconnect controller"], false);
    }

    fn camera_active(&mut self, index: usize, host: &str) {
        let title = format!("Camera {}", index + 1);
        self.render(&[title.as_str(), host], false);
    }

    fn error(&mut self, message: &str) {
        self.render(&["Error", message], true);
    }

    fn refresh(&mut self) {
        self.refresh_at(Instant::now());
    }
}
