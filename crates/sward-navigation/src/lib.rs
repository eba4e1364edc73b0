//! Navigation core of an autonomous mower.
//!
//! The robot's planned paths (perimeter, exclusion zones, docking path, mowing
//! path and a synthesized transit path) share one segmented [`PointStore`].
//! The [`Navigator`] walks that store as a mow / dock / transit state machine
//! and tells the drive controller, every control cycle, which point to drive to
//! and under which constraints.

pub mod error;
pub mod nav;
pub mod store;
pub mod upload;

pub use error::NavigationError;
pub use nav::{
    Directives, DriveFlags, Intent, NavMode, NavState, Navigator, STRAIGHT_TURN_LIMIT_DEG,
    Transition, is_straight_turn,
};
pub use store::{ExclusionRun, MAX_EXCLUSIONS, MAX_POINTS, PointStore, Segment, SegmentLayout, UploadProgress};
pub use upload::MissionPlan;

pub use sward_geometry::{Point, Pose};
