use sward_navigation::{
    DriveFlags, MAX_POINTS, NavMode, NavigationError, Navigator, Point, STRAIGHT_TURN_LIMIT_DEG, Segment,
    is_straight_turn,
};

fn pts(coords: &[(f32, f32)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Navigator holding only a dock and a mow path, target resolved.
fn navigator(dock: &[Point], mow: &[Point]) -> Navigator {
    let mut nav = Navigator::new();
    nav.set_segment_count(Segment::Dock, dock.len()).unwrap();
    nav.set_segment_count(Segment::Mow, mow.len()).unwrap();
    for (i, p) in dock.iter().chain(mow).enumerate() {
        nav.set_point(i, *p).unwrap();
    }
    nav.run();
    nav
}

fn l_path() -> Vec<Point> {
    pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])
}

#[test]
fn test_contiguous_points_accepted() {
    let mut nav = Navigator::new();
    for i in 0..MAX_POINTS {
        assert!(nav.set_point(i, Point::new(i as f32, 0.0)).is_ok());
    }
    assert!(matches!(
        nav.set_point(MAX_POINTS, Point::default()),
        Err(NavigationError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_out_of_order_point_leaves_store_unchanged() {
    let mut nav = Navigator::new();
    nav.set_segment_count(Segment::Mow, 4).unwrap();
    for i in 0..3 {
        nav.set_point(i, Point::new(i as f32, 1.0)).unwrap();
    }
    let before = nav.store().segment(Segment::Mow).to_vec();

    for bad in [1, 2, 4, 10] {
        assert!(nav.set_point(bad, Point::new(99.0, 99.0)).is_err());
    }
    assert_eq!(nav.store().segment(Segment::Mow), &before[..]);
    assert_eq!(nav.store().next_index(), 3);
}

#[test]
fn test_segment_starts_for_every_call_order() {
    let counts = [
        (Segment::Perimeter, 7),
        (Segment::Exclusion, 5),
        (Segment::Dock, 3),
        (Segment::Mow, 11),
    ];
    let orders: [[usize; 4]; 6] = [
        [0, 1, 2, 3],
        [3, 2, 1, 0],
        [2, 0, 3, 1],
        [1, 3, 0, 2],
        [2, 3, 0, 1],
        [3, 0, 2, 1],
    ];
    for order in orders {
        let mut nav = Navigator::new();
        for i in order {
            let (segment, count) = counts[i];
            nav.set_segment_count(segment, count).unwrap();
        }
        let layout = nav.store().layout();
        assert_eq!(layout.start(Segment::Dock), 7 + 5);
        assert_eq!(layout.start(Segment::Mow), 7 + 5 + 3);
        assert_eq!(layout.start(Segment::Free), 7 + 5 + 3 + 11);
    }
}

#[test]
fn test_simulated_advance_never_mutates() {
    let dock = pts(&[(5.0, 5.0), (5.0, 6.0), (5.0, 7.0)]);
    let mut scenarios: Vec<Navigator> = Vec::new();

    let mut mowing = navigator(&dock, &l_path());
    mowing.set_should_mow(true);
    scenarios.push(mowing.clone());

    let mut exhausted = mowing.clone();
    exhausted.advance(false);
    exhausted.advance(false);
    scenarios.push(exhausted.clone());

    let mut exhausted_docking = exhausted.clone();
    exhausted_docking.set_should_dock(true);
    scenarios.push(exhausted_docking);

    let mut transit = navigator(&dock, &l_path());
    transit.start_docking().unwrap();
    scenarios.push(transit.clone());

    let mut docking = transit.clone();
    docking.advance(false);
    scenarios.push(docking);

    let mut docked = navigator(&dock, &l_path());
    docked.set_is_docked(true);
    scenarios.push(docked.clone());

    let mut undocking = docked.clone();
    undocking.set_should_mow(true);
    undocking.advance(false);
    scenarios.push(undocking);

    scenarios.push(Navigator::new());

    for mut nav in scenarios {
        let state = *nav.state();
        let free = nav.store().segment(Segment::Free).to_vec();
        let layout = *nav.store().layout();

        let preview = nav.advance(true);
        assert_eq!(*nav.state(), state);
        assert_eq!(nav.store().segment(Segment::Free), &free[..]);
        assert_eq!(*nav.store().layout(), layout);

        // The preview predicts the committed outcome.
        assert_eq!(nav.advance(false), preview);
    }
}

#[test]
fn test_mowing_three_points() {
    let mut nav = navigator(&[], &l_path());
    nav.set_should_mow(true);
    nav.set_should_dock(false);

    assert!(nav.advance(false));
    assert!(nav.advance(false));
    nav.run();
    assert_eq!(nav.mode(), NavMode::Mow);
    assert_eq!(nav.state().mow_index, 2);
    assert_eq!(nav.target(), Point::new(1.0, 1.0));
    assert_eq!(nav.last_target(), Point::new(1.0, 0.0));
    assert_eq!(nav.percent_completed(), 66);

    assert!(!nav.advance(false));
    assert_eq!(nav.state().mow_index, 0);
}

#[test]
fn test_mowing_done_heads_to_dock() {
    let mut nav = navigator(&pts(&[(5.0, 5.0), (5.0, 6.0)]), &l_path());
    nav.set_should_mow(true);
    nav.set_should_dock(true);

    assert!(nav.advance(false));
    assert!(nav.advance(false));
    assert!(nav.advance(false));
    assert_eq!(nav.mode(), NavMode::Free);
    assert_eq!(nav.store().segment(Segment::Free), &[Point::new(5.0, 5.0)]);
    assert_eq!(nav.target(), Point::new(5.0, 5.0));
    assert_eq!(nav.last_target(), Point::new(1.0, 1.0));
}

#[test]
fn test_straight_threshold() {
    let limit = STRAIGHT_TURN_LIMIT_DEG.to_radians();
    assert!(is_straight_turn(0.0, limit));
    assert!(!is_straight_turn(0.0, 20.0001_f32.to_radians()));

    let gentle = 10.0_f32.to_radians();
    let sharp = 25.0_f32.to_radians();
    for (turn, straight) in [(gentle, true), (sharp, false)] {
        let mow = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0 + turn.cos(), turn.sin()),
        ];
        let mut nav = navigator(&[], &mow);
        nav.set_should_mow(true);
        nav.advance(false);
        assert_eq!(nav.is_next_segment_straight(), straight);
    }
}

#[test]
fn test_straight_needs_point_ahead_and_mow_mode() {
    let mut nav = navigator(&pts(&[(5.0, 5.0), (5.0, 6.0)]), &pts(&[(0.0, 0.0), (1.0, 0.0)]));
    nav.set_should_mow(true);
    nav.advance(false);
    assert!(!nav.is_next_segment_straight());

    nav.set_is_docked(true);
    assert!(!nav.is_next_segment_straight());
}

#[test]
fn test_dock_signal_round_trip() {
    let mut nav = navigator(&pts(&[(5.0, 5.0), (5.0, 6.0), (5.0, 7.0)]), &l_path());
    nav.set_should_mow(true);
    nav.advance(false);
    let mow_index = nav.state().mow_index;

    nav.set_is_docked(true);
    assert_eq!(nav.mode(), NavMode::Dock);
    assert_eq!(nav.target(), Point::new(5.0, 6.0));
    assert_eq!(nav.flags(), DriveFlags::DOCKED);

    nav.set_is_docked(false);
    assert_eq!(nav.mode(), NavMode::Mow);
    assert_eq!(nav.state().mow_index, mow_index);
    let flags = nav.flags();
    assert!(!flags.reverse);
    assert!(!flags.slow);
    assert!(flags.gps_position_trusted);
    assert!(flags.imu_trusted);
    assert_eq!(nav.target(), Point::new(1.0, 0.0));
}

#[test]
fn test_start_mowing_while_docked_restores_mowing_flags() {
    let mut nav = navigator(&pts(&[(5.0, 5.0), (5.0, 6.0), (5.0, 7.0)]), &l_path());
    nav.set_is_docked(true);
    nav.start_mowing().unwrap();
    assert_eq!(nav.mode(), NavMode::Dock);
    assert_eq!(nav.flags(), DriveFlags::DOCKED);

    // Back out to the dock entry.
    assert!(nav.advance(false));
    assert_eq!(nav.target(), Point::new(5.0, 5.0));
    assert!(nav.flags().reverse);
    assert!(nav.flags().slow);

    assert!(nav.advance(false));
    assert_eq!(nav.mode(), NavMode::Free);
    assert_eq!(nav.flags(), DriveFlags::MOWING);
    assert_eq!(nav.target(), Point::new(0.0, 0.0));

    assert!(nav.advance(false));
    assert_eq!(nav.mode(), NavMode::Mow);
    assert_eq!(nav.flags(), DriveFlags::MOWING);

    assert!(nav.advance(false));
    assert_eq!(nav.flags(), DriveFlags::MOWING);
    assert_eq!(nav.target(), Point::new(1.0, 0.0));
}

#[test]
fn test_flags_at_every_mode_change() {
    let mut nav = navigator(&pts(&[(5.0, 5.0), (5.0, 6.0), (5.0, 7.0)]), &l_path());

    // MOW -> FREE -> MOW
    nav.start_mowing().unwrap();
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Free, DriveFlags::MOWING));
    assert!(nav.advance(false));
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Mow, DriveFlags::MOWING));
    assert!(nav.advance(false));
    assert!(nav.advance(false));

    // MOW -> FREE -> DOCK, docking constraints from the first dock step.
    nav.start_docking().unwrap();
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Free, DriveFlags::MOWING));
    assert!(nav.advance(false));
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Dock, DriveFlags::MOWING));
    assert_eq!(nav.target(), Point::new(5.0, 5.0));
    assert!(nav.advance(false));
    assert_eq!(nav.flags(), DriveFlags::DOCKING);
    assert!(nav.advance(false));
    assert_eq!(nav.flags(), DriveFlags::DOCKING);
    assert!(!nav.advance(false));

    // Dock signal, then DOCK -> FREE -> MOW.
    nav.set_is_docked(true);
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Dock, DriveFlags::DOCKED));
    nav.start_mowing().unwrap();
    assert!(nav.advance(false));
    assert_eq!(nav.mode(), NavMode::Dock);
    assert!(nav.flags().reverse);
    assert!(nav.advance(false));
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Free, DriveFlags::MOWING));
    assert!(nav.advance(false));
    assert_eq!((nav.mode(), nav.flags()), (NavMode::Mow, DriveFlags::MOWING));
}

#[test]
fn test_pausing_mid_job_keeps_resume_point() {
    let mow = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    let mut nav = navigator(&[], &mow);
    nav.set_should_mow(true);
    nav.advance(false);
    nav.advance(false);

    nav.set_should_mow(false);
    assert!(!nav.advance(false));
    assert_eq!(nav.state().mow_index, 2);
    assert_eq!(nav.percent_completed(), 50);
}
