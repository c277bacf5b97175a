use serde::{Deserialize, Serialize};

use super::input::{AxisId, ButtonId};

/// Assignment of gamepad controls to camera functions
///
/// Defaults follow an Xbox-style pad: right stick drives pan/tilt, left stick
/// vertical drives focus, the triggers zoom, the bumpers change zoom speed,
/// A cycles cameras and the left stick click fires one-push autofocus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLayout {
    pub camera_select: ButtonId,
    pub autofocus: ButtonId,
    pub zoom_speed_up: ButtonId,
    pub zoom_speed_down: ButtonId,

    pub pan_axis: AxisId,
    pub tilt_axis: AxisId,
    pub focus_axis: AxisId,
    pub zoom_tele_axis: AxisId,
    pub zoom_wide_axis: AxisId,

    /// Tilt is sent down-positive; the raw stick already reads down-positive
    pub invert_tilt: bool,
    /// Focus far is positive, so the down-positive stick gets flipped
    pub invert_focus: bool,
}

impl Default for ControlLayout {
    fn default() -> Self {
        Self {
            camera_select: ButtonId::South,
            autofocus: ButtonId::LeftStick,
            zoom_speed_up: ButtonId::RightBumper,
            zoom_speed_down: ButtonId::LeftBumper,
            pan_axis: AxisId::RightStickX,
            tilt_axis: AxisId::RightStickY,
            focus_axis: AxisId::LeftStickY,
            zoom_tele_axis: AxisId::RightTrigger,
            zoom_wide_axis: AxisId::LeftTrigger,
            invert_tilt: false,
            invert_focus: true,
        }
    }
}

impl ControlLayout {
    pub fn tilt_sign(&self) -> f32 {
        if self.invert_tilt {
            -1.0
        } else {
            1.0
        }
    }

    pub fn focus_sign(&self) -> f32 {
        if self.invert_focus {
            -1.0
        } else {
            1.0
        }
    }
}
