mod blackboard; // shared runner state
mod bus; // broadcast topics between the drive thread and async tasks
mod config; // runner settings and mission plan loading
mod navigation; // navigation task, mission supervisor and motion controller
mod state_estimation; // dead-reckoned pose

use anyhow::Context;
use blackboard::{Blackboard, is_finished, raise_fault, snapshot, take_reanchor, touch_cmd};
use bus::{Topic, latest};
use crate::config::AppConfig;
use navigation::MissionEnd;

use spin_sleep::SpinSleeper;
use std::{
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};
use sward_geometry::{Pose, Twist};
use sward_navigation::{MissionPlan, Navigator, Segment};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Sward runner started. Loading configuration and mission...");
    let config = config::load_config()?;
    let plan = config::load_mission(&config.mission.plan_path)
        .with_context(|| format!("loading mission plan {}", config.mission.plan_path))?;

    let tokio_rt = tokio::runtime::Runtime::new()?;
    match tokio_rt.block_on(run(config, plan)) {
        Ok(end) => {
            info!(?end, "Mission finished.");
            Ok(())
        }
        Err(e) => {
            error!("Mission failed: {:?}", e);
            Err(e)
        }
    }
}

/// Uploads the mission and picks the starting pose. A mission with a docking
/// path starts on the contacts and backs out; otherwise the robot starts at
/// the origin and heads straight for the mow path.
fn prepare(config: &AppConfig, plan: &MissionPlan) -> anyhow::Result<(Navigator, Pose)> {
    let mut navigator = Navigator::new();
    navigator.upload(plan)?;
    navigator.set_mow_progress(config.mission.resume_progress);

    let start = match navigator.project_docking_pose() {
        Some(docked_pose) => {
            navigator.set_is_docked(true);
            docked_pose
        }
        None => Pose::default(),
    };
    navigator.start_mowing()?;
    navigator.set_last_target_point(start.position());
    navigator.dump();
    info!(
        start = %start,
        mow_points = navigator.store().count(Segment::Mow),
        percent = navigator.percent_completed(),
        "Mission prepared"
    );
    Ok((navigator, start))
}

async fn run(config: AppConfig, plan: MissionPlan) -> anyhow::Result<MissionEnd> {
    let (navigator, start) = prepare(&config, &plan)?;

    let bb: Blackboard = Arc::default();
    bb.write().pose = start;
    let pose_topic: Topic<Pose> = Topic::new(16);
    let twist_topic: Topic<Twist> = Topic::new(4);
    let mut pose_rx = pose_topic.subscribe();

    let drive = spawn_drive_thread(bb.clone(), pose_topic, &twist_topic, config.control.drive_period())?;

    info!("Starting async tasks (navigation, watchdog)...");
    let result = tokio::try_join!(
        navigation::nav_task(bb.clone(), navigator, &mut pose_rx, twist_topic, config.clone()),
        watchdog(bb.clone(), config.control.watchdog_timeout()),
    );
    // The drive thread only stops once the mission is marked finished.
    blackboard::finish(&bb);
    if drive.join().is_err() {
        error!("Drive thread panicked");
    }

    let (end, ()) = result?;
    info!(pose = %snapshot(&bb).pose, "Final pose");
    Ok(end)
}

/// Applies the newest twist, dead-reckons the pose and publishes it.
fn spawn_drive_thread(
    bb: Blackboard,
    pose_topic: Topic<Pose>,
    twist_topic: &Topic<Twist>,
    period: Duration,
) -> anyhow::Result<JoinHandle<()>> {
    let mut twist_rx = twist_topic.subscribe();
    let handle = std::thread::Builder::new().name("drive".into()).spawn(move || {
        info!("Drive thread started.");
        let sleeper = SpinSleeper::new(10_000);
        let dt = period.as_secs_f32();
        let mut current_pose = snapshot(&bb).pose;
        let mut applied_twist = Twist::default();

        while !is_finished(&bb) {
            if let Some(twist) = latest(&mut twist_rx) {
                applied_twist = *twist;
                touch_cmd(&bb);
            }
            if let Some(anchor) = take_reanchor(&bb) {
                info!(from = %current_pose, to = %anchor, "Re-anchoring pose");
                current_pose = anchor;
            }

            current_pose = state_estimation::update_pose(&current_pose, applied_twist, dt);
            pose_topic.publish(current_pose);
            {
                let mut state = bb.write();
                state.pose = current_pose;
                state.twist = applied_twist;
            }
            sleeper.sleep(period);
        }
        info!("Drive thread stopped.");
    })?;
    Ok(handle)
}

async fn watchdog(bb: Blackboard, timeout: Duration) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let mut tick = tokio::time::interval(timeout / 4);
    loop {
        tick.tick().await;
        let state = snapshot(&bb);
        if state.finished {
            info!("Watchdog task finished.");
            return Ok(());
        }
        let age = Instant::now() - state.last_cmd_ts;
        if age > timeout {
            warn!(?age, last_cmd_ts = ?state.last_cmd_ts, "Command velocity timeout! Stopping.");
            raise_fault(&bb, "cmd_vel timeout");
        }
    }
}
