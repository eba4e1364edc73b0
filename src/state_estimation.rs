use sward_geometry::{Pose, Twist};
use tracing::warn;

/// Dead-reckons the next pose from the previously applied twist.
///
/// An unusable time step leaves the pose where it was.
pub fn update_pose(previous_pose: &Pose, applied_twist: Twist, dt: f32) -> Pose {
    match previous_pose.integrate(applied_twist, dt) {
        Ok(pose) => pose,
        Err(e) => {
            warn!(error = %e, "Skipping pose update");
            *previous_pose
        }
    }
}
