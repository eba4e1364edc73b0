//! The mow / dock / transit state machine.
//!
//! [`Navigator`] owns the [`PointStore`](crate::store::PointStore) and a
//! [`NavState`]. Each control tick the caller resolves the current target with
//! [`Navigator::run`] and, once the robot reached it, calls
//! [`Navigator::advance`]. Transitions are planned as a pure function of the
//! current state (see `step`) and only then committed, so a preview never
//! touches the live state.

mod navigator;
mod step;

pub use navigator::Navigator;
pub use step::{STRAIGHT_TURN_LIMIT_DEG, Transition, is_straight_turn};

use sward_geometry::Point;

/// Which segment the robot is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavMode {
    /// Following the mow path.
    #[default]
    Mow,
    /// Driving into or out of the charging station.
    Dock,
    /// Following a synthesized transit path.
    Free,
}

/// Driving constraints handed to the motion controller for the current leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveFlags {
    /// Approach the target backwards.
    pub reverse: bool,
    /// Approach the target at reduced speed.
    pub slow: bool,
    /// GPS float solutions may be used for the position estimate.
    pub gps_position_trusted: bool,
    /// GPS float solutions may be used for the delta (heading) estimate.
    pub gps_delta_trusted: bool,
    /// The inertial sensor may be used.
    pub imu_trusted: bool,
}

impl DriveFlags {
    /// Open-field driving: forward, full speed, every sensor trusted.
    pub const MOWING: Self = Self {
        reverse: false,
        slow: false,
        gps_position_trusted: true,
        gps_delta_trusted: true,
        imu_trusted: true,
    };

    /// Creeping along the dock path towards the contacts. GPS and IMU are
    /// unreliable next to the station.
    pub const DOCKING: Self = Self {
        reverse: false,
        slow: true,
        gps_position_trusted: false,
        gps_delta_trusted: false,
        imu_trusted: false,
    };

    /// Sitting on the contacts; the next move backs out.
    pub const DOCKED: Self = Self {
        reverse: true,
        ..Self::DOCKING
    };
}

impl Default for DriveFlags {
    fn default() -> Self {
        Self::MOWING
    }
}

/// Externally requested goals driving mode transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    /// Mowing was requested.
    pub should_mow: bool,
    /// Docking was requested.
    pub should_dock: bool,
}

/// The complete mutable navigation state.
///
/// Progress indices are relative to their own segment; buffer offsets are
/// derived from the store layout whenever a point is needed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavState {
    /// Current driving mode.
    pub mode: NavMode,
    /// Next point to reach on the mow path.
    pub mow_index: usize,
    /// Next point to reach on the dock path.
    pub dock_index: usize,
    /// Next point to reach on the free path.
    pub free_index: usize,
    /// End of the drive line.
    pub target: Point,
    /// Start of the drive line.
    pub last_target: Point,
    /// Constraints for the current leg.
    pub flags: DriveFlags,
    /// Requested goals.
    pub intent: Intent,
    /// Progress through the mow path, 0..=100.
    pub percent_completed: u8,
}

impl NavState {
    /// Progress index of the segment driven in `mode`.
    pub fn progress(&self, mode: NavMode) -> usize {
        match mode {
            NavMode::Mow => self.mow_index,
            NavMode::Dock => self.dock_index,
            NavMode::Free => self.free_index,
        }
    }
}

/// Read-only snapshot of what the drive controller consumes each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directives {
    /// Current driving mode.
    pub mode: NavMode,
    /// Point to drive to.
    pub target: Point,
    /// Point the current drive line starts at.
    pub last_target: Point,
    /// Constraints for the current leg.
    pub flags: DriveFlags,
    /// Progress through the mow path, 0..=100.
    pub percent_completed: u8,
}

impl From<&NavState> for Directives {
    fn from(state: &NavState) -> Self {
        Self {
            mode: state.mode,
            target: state.target,
            last_target: state.last_target,
            flags: state.flags,
            percent_completed: state.percent_completed,
        }
    }
}
