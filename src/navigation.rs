use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;
use std::time::Instant;

use sward_geometry::{Pose, Twist, angular_distance, normalize_angle};
use sward_navigation::{Directives, NavMode, Navigator, Segment};
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, info, warn};

use crate::blackboard::{Blackboard, finish, has_faults, request_reanchor, snapshot};
use crate::bus::Topic;
use crate::config::{AppConfig, DriveConfig, MissionConfig};

/// How a mission run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionEnd {
    /// Mow path done, no docking requested.
    Mowed,
    /// Sitting on the charging contacts.
    Docked,
    /// Nowhere left to go.
    Stopped,
    /// A fault was raised.
    Faulted,
    /// The simulated time limit ran out.
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supervision {
    Continue,
    Finished(MissionEnd),
}

/// Navigation task, one tick per `control.nav_rate_hz`.
///
/// Owns the navigator: resolves the target, advances once the robot is within
/// tolerance and turns the directives into a twist for the drive thread.
pub async fn nav_task(
    bb: Blackboard,
    mut navigator: Navigator,
    pose_rx: &mut broadcast::Receiver<Arc<Pose>>,
    twist_tx: Topic<Twist>,
    config: AppConfig,
) -> anyhow::Result<MissionEnd> {
    info!("Navigation task started.");
    let mut ticker = time::interval(config.control.nav_period());
    let mut current_pose: Arc<Pose> = Arc::new(snapshot(&bb).pose);
    let started = Instant::now();
    let mut reported_percent = navigator.percent_completed();
    info!(initial_pose = %current_pose, target = %navigator.target(), "Navigation task initialized");

    let end = loop {
        tokio::select! {
            _ = ticker.tick() => {
                if has_faults(&bb) {
                    warn!(faults = ?snapshot(&bb).faults, "Fault raised, stopping mission");
                    break MissionEnd::Faulted;
                }
                if started.elapsed() > config.control.time_limit() {
                    warn!(limit = ?config.control.time_limit(), "Mission time limit reached");
                    break MissionEnd::TimedOut;
                }

                navigator.run();
                let position = current_pose.position();
                if navigator.distance_to_target(position) < config.drive.target_tolerance
                    && !navigator.advance(false)
                {
                    if let Supervision::Finished(end) = supervise(&mut navigator, &bb, &config.mission) {
                        break end;
                    }
                }

                let directives = navigator.directives();
                if directives.percent_completed / 10 != reported_percent / 10 {
                    info!(percent = directives.percent_completed, "Mowing progress");
                }
                reported_percent = directives.percent_completed;

                let speed = cruise_speed(
                    &directives,
                    navigator.is_next_segment_straight(),
                    !navigator.advance(true),
                    &config.drive,
                );
                let twist = compute_twist(&current_pose, &directives, speed, &config.drive);
                debug!(vx = twist.vx, wz = twist.wz, pose = %current_pose, target = %directives.target, "Computed twist for navigation");
                bb.write().directives = directives;
                twist_tx.publish(twist);
            }
            Ok(new_pose) = pose_rx.recv() => {
                current_pose = new_pose;
            }
        }
    };

    twist_tx.publish(Twist::default());
    navigator.dump();
    finish(&bb);
    info!(?end, "Navigation task finished.");
    Ok(end)
}

/// Decides what happens when the navigator has nowhere further to go.
pub fn supervise(navigator: &mut Navigator, bb: &Blackboard, mission: &MissionConfig) -> Supervision {
    let intent = navigator.state().intent;
    match navigator.mode() {
        NavMode::Mow if mission.dock_after_mow && navigator.store().count(Segment::Dock) > 0 => {
            info!("Mow path finished, heading for the dock");
            match navigator.start_docking() {
                Ok(()) => Supervision::Continue,
                Err(e) => {
                    warn!(error = %e, "Cannot head for the dock");
                    Supervision::Finished(MissionEnd::Mowed)
                }
            }
        }
        NavMode::Mow => {
            info!("Mow path finished");
            Supervision::Finished(MissionEnd::Mowed)
        }
        NavMode::Dock if intent.should_dock => {
            navigator.set_is_docked(true);
            if let Some(pose) = navigator.project_docking_pose() {
                info!(pose = %pose, "Docked, re-anchoring on the contacts");
                request_reanchor(bb, pose);
            }
            Supervision::Finished(MissionEnd::Docked)
        }
        mode => {
            warn!(?mode, ?intent, "No destination left");
            Supervision::Finished(MissionEnd::Stopped)
        }
    }
}

/// Drive speed (m/s) for the current leg.
pub fn cruise_speed(directives: &Directives, straight_ahead: bool, final_approach: bool, drive: &DriveConfig) -> f32 {
    if directives.flags.slow || final_approach {
        drive.slow_speed
    } else if straight_ahead {
        drive.straight_speed
    } else {
        drive.mow_speed
    }
}

/// Proportional controller towards `directives.target`.
///
/// Reverse legs point the rear at the target. Large heading errors are turned
/// out in place, and forward speed leaves room for the outer wheel.
pub fn compute_twist(pose: &Pose, directives: &Directives, speed: f32, drive: &DriveConfig) -> Twist {
    let position = pose.position();
    let distance = position.distance_to(directives.target);
    if distance < drive.target_tolerance {
        return Twist::default();
    }

    let mut heading_to_goal = position.heading_to(directives.target);
    if directives.flags.reverse {
        heading_to_goal = normalize_angle(heading_to_goal + PI);
    }
    let heading_error = angular_distance(pose.theta, heading_to_goal);

    let max_wz = drive.max_angular_speed;
    let wz = (drive.angular_gain * heading_error).clamp(-max_wz, max_wz);

    if heading_error.abs() > FRAC_PI_2 {
        return Twist::new(0.0, wz);
    }

    let rim_speed = wz.abs() * drive.wheel_base / 2.0;
    let vx = speed.min(distance).min(speed - rim_speed).max(0.0);

    if directives.flags.reverse {
        Twist::new(-vx, wz)
    } else {
        Twist::new(vx, wz)
    }
}
