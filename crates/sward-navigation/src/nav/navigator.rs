use sward_geometry::{Point, Pose, angle_between};
use tracing::{debug, info, warn};

use super::step::{Transition, plan_advance, resolve_target};
use super::{Directives, DriveFlags, Intent, NavMode, NavState, is_straight_turn};
use crate::error::NavigationError;
use crate::store::{PointStore, Segment, UploadProgress};

/// Navigation core: the mission's point store plus the state machine that
/// walks it.
///
/// Driven from a single control loop: [`run`](Self::run) every tick, then
/// [`advance`](Self::advance) at most once when the robot reached the target.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    store: PointStore,
    state: NavState,
}

impl Navigator {
    /// Creates a navigator with an empty store, in mow mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mission points.
    pub fn store(&self) -> &PointStore {
        &self.store
    }

    /// The full navigation state.
    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// Snapshot for the drive controller.
    pub fn directives(&self) -> Directives {
        Directives::from(&self.state)
    }

    /// Current driving mode.
    pub fn mode(&self) -> NavMode {
        self.state.mode
    }

    /// End of the current drive line.
    pub fn target(&self) -> Point {
        self.state.target
    }

    /// Start of the current drive line.
    pub fn last_target(&self) -> Point {
        self.state.last_target
    }

    /// Driving constraints for the current leg.
    pub fn flags(&self) -> DriveFlags {
        self.state.flags
    }

    /// Progress through the mow path, 0..=100.
    pub fn percent_completed(&self) -> u8 {
        self.state.percent_completed
    }

    // --- upload --------------------------------------------------------

    /// Stores an uploaded point. Writing index 0 starts a fresh upload and
    /// rewinds all progress indices, since the path data they refer to is
    /// being replaced.
    pub fn set_point(&mut self, index: usize, point: Point) -> Result<(), NavigationError> {
        if self.store.set_point(index, point)? == UploadProgress::Restarted {
            self.state.mow_index = 0;
            self.state.dock_index = 0;
            self.state.free_index = 0;
        }
        Ok(())
    }

    /// See [`PointStore::set_segment_count`].
    pub fn set_segment_count(&mut self, segment: Segment, count: usize) -> Result<(), NavigationError> {
        self.store.set_segment_count(segment, count)
    }

    /// See [`PointStore::set_exclusion_length`].
    pub fn set_exclusion_length(&mut self, run: usize, len: usize) -> Result<(), NavigationError> {
        self.store.set_exclusion_length(run, len)
    }

    // --- per tick ------------------------------------------------------

    /// Resolves the target for the current mode and progress index.
    pub fn run(&mut self) {
        resolve_target(&mut self.state, &self.store, None);
    }

    /// Candidate result of [`advance`](Self::advance), without committing it.
    pub fn plan_advance(&self) -> Transition {
        plan_advance(&self.state, &self.store)
    }

    /// Moves on to the next point, switching modes where a segment ends.
    ///
    /// With `simulate_only` the outcome is computed and returned but nothing
    /// is written. Returns false when there is nowhere further to go: mowing
    /// finished, docked, or no requested destination exists.
    pub fn advance(&mut self, simulate_only: bool) -> bool {
        let transition = self.plan_advance();
        if simulate_only {
            return transition.advanced;
        }
        self.commit(transition)
    }

    fn commit(&mut self, transition: Transition) -> bool {
        if transition.is_noop(&self.state) {
            return transition.advanced;
        }
        if let Some(point) = transition.transit {
            if let Err(e) = self.store.replace_free_path(&[point]) {
                warn!(error = %e, "transit path rejected, state left unchanged");
                return false;
            }
        }

        let previous = self.state.mode;
        self.state = transition.next;
        if previous != self.state.mode {
            info!(
                from = ?previous,
                to = ?self.state.mode,
                target = %self.state.target,
                "navigation mode changed"
            );
        } else {
            debug!(
                mode = ?self.state.mode,
                index = self.state.progress(self.state.mode),
                target = %self.state.target,
                percent = self.state.percent_completed,
                "next point"
            );
        }
        transition.advanced
    }

    // --- intents -------------------------------------------------------

    /// Sets the mow intent without synthesizing a transit path.
    pub fn set_should_mow(&mut self, should_mow: bool) {
        self.state.intent.should_mow = should_mow;
    }

    /// Sets the dock intent without synthesizing a transit path.
    pub fn set_should_dock(&mut self, should_dock: bool) {
        self.state.intent.should_dock = should_dock;
    }

    /// Requests mowing. If a mow path exists, heads for the current mow
    /// point over a one-point transit path. On the dock path only the intent
    /// changes; [`advance`](Self::advance) backs out first.
    pub fn start_mowing(&mut self) -> Result<(), NavigationError> {
        self.state.intent = Intent {
            should_mow: true,
            should_dock: false,
        };
        if self.state.mode == NavMode::Dock {
            info!(dock_index = self.state.dock_index, "mowing requested, undocking");
            return Ok(());
        }
        match self.store.point(Segment::Mow, self.state.mow_index) {
            Some(entry) => self.enter_transit(entry),
            None => Ok(()),
        }
    }

    /// Requests docking. If a dock path exists, heads for its first point
    /// over a one-point transit path. On the dock path only the intent
    /// changes; [`advance`](Self::advance) walks on towards the contacts.
    pub fn start_docking(&mut self) -> Result<(), NavigationError> {
        self.state.intent = Intent {
            should_mow: false,
            should_dock: true,
        };
        if self.state.mode == NavMode::Dock {
            info!(dock_index = self.state.dock_index, "docking requested, already on the dock path");
            return Ok(());
        }
        match self.store.point(Segment::Dock, 0) {
            Some(entry) => self.enter_transit(entry),
            None => Ok(()),
        }
    }

    fn enter_transit(&mut self, destination: Point) -> Result<(), NavigationError> {
        self.store.replace_free_path(&[destination])?;
        let previous = self.state.mode;
        self.state.last_target = self.state.target;
        self.state.mode = NavMode::Free;
        self.state.free_index = 0;
        resolve_target(&mut self.state, &self.store, None);
        info!(from = ?previous, destination = %destination, "transit started");
        Ok(())
    }

    /// Snaps the state to the dock extremes on an external dock signal.
    ///
    /// `true` puts the robot on the one-before-last dock point in dock mode,
    /// ready to back out; `false` returns to the mow path with the mowing
    /// constraints. Ignored with fewer than 2 dock points.
    pub fn set_is_docked(&mut self, docked: bool) {
        let dock_count = self.store.count(Segment::Dock);
        if dock_count < 2 {
            return;
        }
        if docked {
            self.state.mode = NavMode::Dock;
            self.state.dock_index = dock_count - 2;
            self.state.flags = DriveFlags::DOCKED;
        } else {
            self.state.mode = NavMode::Mow;
            self.state.dock_index = 0;
            self.state.flags = DriveFlags::MOWING;
        }
        resolve_target(&mut self.state, &self.store, None);
        info!(docked, mode = ?self.state.mode, "dock state set");
    }

    /// Jumps to a fraction (`0.0..=1.0`) of the mow path, to resume a partly
    /// finished job.
    pub fn set_mow_progress(&mut self, fraction: f32) {
        let mow_count = self.store.count(Segment::Mow);
        self.state.mow_index = match mow_count {
            0 => 0,
            n => ((n as f32 * fraction).round() as usize).min(n - 1),
        };
        resolve_target(&mut self.state, &self.store, None);
    }

    // --- queries -------------------------------------------------------

    /// Whether the leg after the current target continues roughly straight,
    /// allowing a faster drive profile. Only meaningful while mowing.
    pub fn is_next_segment_straight(&self) -> bool {
        if self.state.mode != NavMode::Mow {
            return false;
        }
        let Some(next) = self.store.point(Segment::Mow, self.state.mow_index + 1) else {
            return false;
        };
        let current_heading = angle_between(self.state.last_target, self.state.target);
        let next_heading = angle_between(self.state.target, next);
        is_straight_turn(current_heading, next_heading)
    }

    /// Pose of the robot on the charging contacts: the last dock point, facing
    /// along the final dock leg. `None` with fewer than 2 dock points.
    pub fn project_docking_pose(&self) -> Option<Pose> {
        let dock = self.store.segment(Segment::Dock);
        let [.., approach, contacts] = dock else {
            return None;
        };
        Some(Pose::new(contacts.x, contacts.y, angle_between(*approach, *contacts)))
    }

    /// Starts the drive line at `position`, typically the robot's own position
    /// when a new leg begins somewhere other than the previous target.
    pub fn set_last_target_point(&mut self, position: Point) {
        self.state.last_target = position;
    }

    /// Distance (m) from `position` to the target.
    pub fn distance_to_target(&self, position: Point) -> f32 {
        position.distance_to(self.state.target)
    }

    /// Distance (m) from `position` to the start of the drive line.
    pub fn distance_to_last_target(&self, position: Point) -> f32 {
        position.distance_to(self.state.last_target)
    }

    /// Logs the segment layout and the first mow point.
    pub fn dump(&self) {
        info!("{}", self.store);
        info!(
            mode = ?self.state.mode,
            mow_index = self.state.mow_index,
            dock_index = self.state.dock_index,
            free_index = self.state.free_index,
            target = %self.state.target,
            "navigation state"
        );
    }
}
