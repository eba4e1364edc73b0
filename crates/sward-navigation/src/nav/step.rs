//! Pure transition planning.
//!
//! Nothing in here mutates live state. [`plan_advance`] turns the current
//! state into a [`Transition`] holding the candidate next state; the
//! navigator decides whether to commit it.

use sward_geometry::{Point, angle_between, angular_distance, normalize_relative_to};

use super::{DriveFlags, NavMode, NavState};
use crate::store::{PointStore, Segment};

/// Largest heading change (degrees) between consecutive mow legs that still
/// counts as driving straight.
pub const STRAIGHT_TURN_LIMIT_DEG: f32 = 20.0;

/// Whether turning from `current_heading` onto `next_heading` (radians) stays
/// within [`STRAIGHT_TURN_LIMIT_DEG`].
///
/// The next heading is moved onto the current heading's branch first, so a
/// small turn across the `±PI` seam is not mistaken for a U-turn.
pub fn is_straight_turn(current_heading: f32, next_heading: f32) -> bool {
    let next = normalize_relative_to(next_heading, current_heading);
    angular_distance(current_heading, next).abs() <= STRAIGHT_TURN_LIMIT_DEG.to_radians()
}

/// Candidate outcome of one `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// The boolean `advance` reports.
    pub advanced: bool,
    /// State after the transition, target already resolved.
    pub next: NavState,
    /// Single-point free path to write before `next` becomes live.
    pub transit: Option<Point>,
}

impl Transition {
    fn advanced(next: NavState) -> Self {
        Self {
            advanced: true,
            next,
            transit: None,
        }
    }

    fn refused(state: &NavState) -> Self {
        Self {
            advanced: false,
            next: *state,
            transit: None,
        }
    }

    fn finished(next: NavState) -> Self {
        Self {
            advanced: false,
            next,
            transit: None,
        }
    }

    /// Whether committing would change anything.
    pub fn is_noop(&self, current: &NavState) -> bool {
        self.transit.is_none() && self.next == *current
    }
}

/// Plans the next `advance` from `state`.
pub(crate) fn plan_advance(state: &NavState, store: &PointStore) -> Transition {
    let mut transition = match state.mode {
        NavMode::Mow => plan_mow(state, store),
        NavMode::Dock => plan_dock(state, store),
        NavMode::Free => plan_free(state, store),
    };
    if transition.next != *state || transition.transit.is_some() {
        resolve_target(&mut transition.next, store, transition.transit);
    }
    transition
}

/// Points `state.target` at the current progress index of its mode's segment
/// and refreshes the mow percentage.
///
/// `transit` stands in for the first free point when it has not been written
/// to the store yet.
pub(crate) fn resolve_target(state: &mut NavState, store: &PointStore, transit: Option<Point>) {
    let point = match (state.mode, transit) {
        (NavMode::Free, Some(p)) if state.free_index == 0 => Some(p),
        (mode, _) => store.point(segment_of(mode), state.progress(mode)),
    };
    if let Some(p) = point {
        state.target = p;
    }

    let mow_count = store.count(Segment::Mow);
    if mow_count > 0 {
        state.percent_completed = (state.mow_index * 100 / mow_count).min(100) as u8;
    }
}

fn segment_of(mode: NavMode) -> Segment {
    match mode {
        NavMode::Mow => Segment::Mow,
        NavMode::Dock => Segment::Dock,
        NavMode::Free => Segment::Free,
    }
}

/// Copy of `state` whose drive line starts at the current target.
fn departed(state: &NavState) -> NavState {
    NavState {
        last_target: state.target,
        ..*state
    }
}

/// Leaves the current segment for a one-point free path ending at `destination`.
fn transit_to(state: &NavState, store: &PointStore, destination: Point) -> Transition {
    if !store.can_hold_free_path(1) {
        return Transition::refused(state);
    }
    let mut next = departed(state);
    next.mode = NavMode::Free;
    next.free_index = 0;
    Transition {
        transit: Some(destination),
        ..Transition::advanced(next)
    }
}

fn plan_mow(state: &NavState, store: &PointStore) -> Transition {
    if state.intent.should_mow && state.mow_index + 1 < store.count(Segment::Mow) {
        let mut next = departed(state);
        next.mow_index += 1;
        return Transition::advanced(next);
    }

    if state.intent.should_dock {
        if let Some(dock_entry) = store.point(Segment::Dock, 0) {
            // TODO: replace the single hop with a planned path around exclusions.
            return transit_to(state, store, dock_entry);
        }
    }

    if !state.intent.should_mow {
        // Paused: keep the resume point.
        return Transition::refused(state);
    }

    // Mow path exhausted: rewind for the next job.
    let mut next = *state;
    next.mow_index = 0;
    Transition::finished(next)
}

fn plan_dock(state: &NavState, store: &PointStore) -> Transition {
    if state.intent.should_dock {
        if state.dock_index + 1 < store.count(Segment::Dock) {
            let mut next = departed(state);
            next.dock_index += 1;
            next.flags = DriveFlags::DOCKING;
            return Transition::advanced(next);
        }
        // On the contacts.
        return Transition::refused(state);
    }

    if state.intent.should_mow {
        if state.dock_index > 0 {
            let mut next = departed(state);
            next.dock_index -= 1;
            next.flags.reverse = true;
            next.flags.slow = true;
            return Transition::advanced(next);
        }
        if let Some(mow_entry) = store.point(Segment::Mow, state.mow_index) {
            let mut transition = transit_to(state, store, mow_entry);
            if transition.advanced {
                transition.next.flags = DriveFlags::MOWING;
            }
            return transition;
        }
    }

    Transition::refused(state)
}

fn plan_free(state: &NavState, store: &PointStore) -> Transition {
    if state.free_index + 1 < store.count(Segment::Free) {
        let mut next = departed(state);
        next.free_index += 1;
        return Transition::advanced(next);
    }

    if state.intent.should_mow && store.count(Segment::Mow) > 0 {
        let mut next = departed(state);
        next.mode = NavMode::Mow;
        next.flags = DriveFlags::MOWING;
        return Transition::advanced(next);
    }

    // The dock entry is still open field; docking constraints start with the
    // first step along the dock path.
    if state.intent.should_dock && store.count(Segment::Dock) > 0 {
        let mut next = departed(state);
        next.mode = NavMode::Dock;
        next.dock_index = 0;
        next.flags = DriveFlags::MOWING;
        return Transition::advanced(next);
    }

    Transition::refused(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Intent;

    /// Threshold used by an earlier revision of the controller. Kept to pin
    /// down that turns between the two limits are now driven as curves.
    const EARLIER_STRAIGHT_TURN_LIMIT_DEG: f32 = 45.0;

    fn store(dock: &[Point], mow: &[Point]) -> PointStore {
        let mut store = PointStore::new();
        store.set_segment_count(Segment::Dock, dock.len()).unwrap();
        store.set_segment_count(Segment::Mow, mow.len()).unwrap();
        for (i, p) in dock.iter().chain(mow).enumerate() {
            store.set_point(i, *p).unwrap();
        }
        store
    }

    #[test]
    fn test_straight_turn_boundary() {
        let limit = STRAIGHT_TURN_LIMIT_DEG.to_radians();
        assert!(is_straight_turn(0.0, limit));
        assert!(is_straight_turn(0.0, -limit));
        assert!(!is_straight_turn(0.0, 20.0001_f32.to_radians()));
    }

    #[test]
    fn test_straight_turn_across_seam() {
        // 170° onto -175° is a 15° left turn, not a 345° swing.
        assert!(is_straight_turn(170.0_f32.to_radians(), (-175.0_f32).to_radians()));
        assert!(!is_straight_turn(170.0_f32.to_radians(), (-150.0_f32).to_radians()));
    }

    #[test]
    fn test_turns_between_old_and_new_limit_are_curves() {
        let turn = 30.0_f32;
        assert!(turn < EARLIER_STRAIGHT_TURN_LIMIT_DEG);
        assert!(!is_straight_turn(0.0, turn.to_radians()));
    }

    #[test]
    fn test_plan_does_not_touch_input() {
        let store = store(&[], &[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let state = NavState {
            intent: Intent {
                should_mow: true,
                should_dock: false,
            },
            ..NavState::default()
        };
        let before = state;
        let transition = plan_advance(&state, &store);
        assert_eq!(state, before);
        assert!(transition.advanced);
        assert_eq!(transition.next.mow_index, 1);
        assert_eq!(transition.next.target, Point::new(1.0, 0.0));
    }

    #[test]
    fn test_mow_to_dock_carries_transit() {
        let store = store(&[Point::new(5.0, 5.0), Point::new(5.0, 6.0)], &[Point::new(0.0, 0.0)]);
        let state = NavState {
            intent: Intent {
                should_mow: true,
                should_dock: true,
            },
            ..NavState::default()
        };
        let transition = plan_advance(&state, &store);
        assert!(transition.advanced);
        assert_eq!(transition.transit, Some(Point::new(5.0, 5.0)));
        assert_eq!(transition.next.mode, NavMode::Free);
        assert_eq!(transition.next.target, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_leaving_transit_restores_mowing_flags() {
        let store = store(&[Point::new(5.0, 5.0), Point::new(5.0, 6.0)], &[Point::new(0.0, 0.0)]);
        for (intent, mode) in [
            (
                Intent {
                    should_mow: true,
                    should_dock: false,
                },
                NavMode::Mow,
            ),
            (
                Intent {
                    should_mow: false,
                    should_dock: true,
                },
                NavMode::Dock,
            ),
        ] {
            let state = NavState {
                mode: NavMode::Free,
                flags: DriveFlags::DOCKED,
                intent,
                ..NavState::default()
            };
            let transition = plan_advance(&state, &store);
            assert!(transition.advanced);
            assert_eq!(transition.next.mode, mode);
            assert_eq!(transition.next.flags, DriveFlags::MOWING);
        }
    }

    #[test]
    fn test_paused_mow_path_is_refused() {
        let store = store(&[], &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)]);
        let state = NavState {
            mow_index: 1,
            ..NavState::default()
        };
        let transition = plan_advance(&state, &store);
        assert!(!transition.advanced);
        assert!(transition.is_noop(&state));
    }

    #[test]
    fn test_refused_is_noop() {
        let store = store(&[], &[]);
        let state = NavState {
            mode: NavMode::Free,
            ..NavState::default()
        };
        let transition = plan_advance(&state, &store);
        assert!(!transition.advanced);
        assert!(transition.is_noop(&state));
    }
}
