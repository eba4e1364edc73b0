use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use sward_geometry::{Pose, Twist};
use sward_navigation::Directives;

#[derive(Clone)]
pub struct State {
    pub pose: Pose,
    pub twist: Twist,
    pub directives: Directives,
    pub last_cmd_ts: Instant,
    pub faults: Vec<String>,
    /// Pose the drive thread should jump to, e.g. after docking.
    pub reanchor: Option<Pose>,
    pub finished: bool,
}

impl Default for State {
    fn default() -> Self {
        State {
            pose: Pose::default(),
            twist: Twist::default(),
            directives: Directives::default(),
            last_cmd_ts: Instant::now(),
            faults: Vec::new(),
            reanchor: None,
            finished: false,
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn touch_cmd(bb: &Blackboard) {
    bb.write().last_cmd_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

pub fn has_faults(bb: &Blackboard) -> bool {
    !bb.read().faults.is_empty()
}

pub fn request_reanchor(bb: &Blackboard, pose: Pose) {
    bb.write().reanchor = Some(pose);
}

pub fn take_reanchor(bb: &Blackboard) -> Option<Pose> {
    bb.write().reanchor.take()
}

pub fn finish(bb: &Blackboard) {
    bb.write().finished = true;
}

pub fn is_finished(bb: &Blackboard) -> bool {
    bb.read().finished
}
