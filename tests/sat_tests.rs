//! Summed-Area Table Tests
//!
//! Tests for:
//! - Pass schedule (steps per axis, swap parity)
//! - Ping-pong parity detection and realignment
//! - CPU reference build against brute-force sums
//! - Box queries with corners in either order

use glam::Vec2;

use shadow_lab::shadow::{MomentsGrid, PingPong, SatAxis, SatBuilder, SatSchedule};

const EPSILON: f32 = 1e-3;

fn approx_vec(a: Vec2, b: Vec2) -> bool {
    (a - b).abs().max_element() <= EPSILON * b.abs().max_element().max(1.0)
}

// ============================================================================
// Schedule
// ============================================================================

#[test]
fn passes_per_axis_is_ceil_log() {
    assert_eq!(SatSchedule::passes_per_axis(1024, 4), 5);
    assert_eq!(SatSchedule::passes_per_axis(1024, 2), 10);
    assert_eq!(SatSchedule::passes_per_axis(1025, 4), 6);
    assert_eq!(SatSchedule::passes_per_axis(4, 4), 1);
    assert_eq!(SatSchedule::passes_per_axis(1, 4), 0);
}

#[test]
fn schedule_runs_horizontal_then_vertical() {
    let schedule = SatSchedule::new(16, 64, 4);
    let steps = schedule.steps();

    let offsets: Vec<(SatAxis, u32)> = steps.iter().map(|s| (s.axis, s.offset)).collect();
    assert_eq!(
        offsets,
        vec![
            (SatAxis::Horizontal, 1),
            (SatAxis::Horizontal, 4),
            (SatAxis::Vertical, 1),
            (SatAxis::Vertical, 4),
            (SatAxis::Vertical, 16),
        ]
    );
    assert_eq!(schedule.swap_count(), 5);
}

#[test]
fn base_below_two_is_clamped() {
    let schedule = SatSchedule::new(8, 8, 1);
    assert_eq!(schedule.base(), 2);
    assert_eq!(schedule.swap_count(), 6);
}

// ============================================================================
// Ping-Pong
// ============================================================================

#[test]
fn even_swaps_keep_parity() {
    let mut buffers = PingPong::new("front", "back");
    buffers.swap();
    buffers.swap();
    assert!(buffers.check_parity().is_ok());
    assert_eq!(*buffers.current(), "front");
}

#[test]
fn odd_swaps_are_detected_and_realigned() {
    let mut buffers = PingPong::new(vec![0u32], vec![0u32]);
    {
        let (_, dst) = buffers.split();
        dst[0] = 42;
    }
    buffers.swap();

    assert!(buffers.check_parity().is_err());
    assert_eq!(buffers.current_index(), 1);

    buffers.realign(|src, dst| dst.copy_from_slice(src));
    assert!(buffers.check_parity().is_ok());
    assert_eq!(buffers.into_front(), vec![42]);
}

#[test]
fn realign_without_mismatch_does_not_copy() {
    let mut buffers = PingPong::new(1, 2);
    let mut copied = false;
    buffers.realign(|_, _| copied = true);
    assert!(!copied);
    assert_eq!(buffers.swaps(), 0);
}

// ============================================================================
// CPU Build
// ============================================================================

#[test]
fn constant_field_sums_to_area() {
    let value = Vec2::new(0.5, 0.25);
    let sat = SatBuilder::default().build(MomentsGrid::filled(32, 32, value));

    for (x, y) in [(0, 0), (3, 7), (15, 15), (31, 0), (31, 31)] {
        let area = ((x + 1) * (y + 1)) as f32;
        assert!(approx_vec(sat.at(x, y), value * area), "wrong sum at ({x}, {y})");
    }
}

#[test]
fn ones_grid_corner_holds_total() {
    let sat = SatBuilder::new(4).build(MomentsGrid::filled(8, 8, Vec2::ONE));
    assert_eq!(sat.at(7, 7), Vec2::splat(64.0));
}

#[test]
fn odd_step_count_still_yields_front_result() {
    // 2 horizontal + 3 vertical steps: the result ends in the back buffer
    let builder = SatBuilder::new(4);
    assert_eq!(builder.schedule(8, 64).swap_count() % 2, 1);

    let sat = builder.build(MomentsGrid::filled(8, 64, Vec2::ONE));
    assert_eq!(sat.at(7, 63), Vec2::splat(512.0));
    assert_eq!(sat.at(0, 63), Vec2::splat(64.0));
}

#[test]
fn box_sum_matches_brute_force() {
    let grid = MomentsGrid::from_depths(24, 20, |x, y| ((x * 7 + y * 3) % 11) as f32 / 11.0);
    let sat = SatBuilder::default().build(grid.clone());

    let boxes = [
        (0, 0, 23, 19),
        (0, 0, 0, 0),
        (5, 3, 9, 12),
        (10, 0, 23, 4),
        (0, 7, 3, 19),
    ];
    for (x1, y1, x2, y2) in boxes {
        let expected = grid.rect_sum(x1, y1, x2, y2);
        let actual = sat.box_sum(x1, y1, x2, y2);
        assert!(
            approx_vec(actual, expected),
            "box ({x1},{y1})-({x2},{y2}): {actual} != {expected}"
        );
    }
}

#[test]
fn box_mean_recovers_single_texel() {
    let grid = MomentsGrid::from_depths(16, 16, |x, y| (x + y) as f32 / 32.0);
    let sat = SatBuilder::default().build(grid.clone());
    assert!(approx_vec(sat.box_mean(6, 9, 6, 9), grid.get(6, 9)));
}

#[test]
fn inverted_corners_match_normalized_box() {
    let grid = MomentsGrid::from_depths(16, 12, |x, y| ((x * 5 + y) % 7) as f32 / 7.0);
    let sat = SatBuilder::default().build(grid.clone());

    let expected_sum = grid.rect_sum(2, 3, 9, 8);
    let expected_mean = expected_sum / 48.0;
    for (x1, y1, x2, y2) in [(9, 8, 2, 3), (9, 3, 2, 8), (2, 8, 9, 3)] {
        let sum = sat.box_sum(x1, y1, x2, y2);
        let mean = sat.box_mean(x1, y1, x2, y2);
        assert!(approx_vec(sum, expected_sum), "sum ({x1},{y1})-({x2},{y2}): {sum}");
        assert!(approx_vec(mean, expected_mean), "mean ({x1},{y1})-({x2},{y2}): {mean}");
        assert!(mean.is_finite());
    }
}

#[test]
fn base_does_not_change_result() {
    let grid = MomentsGrid::from_depths(33, 17, |x, y| ((x ^ y) % 5) as f32 * 0.2);
    let base2 = SatBuilder::new(2).build(grid.clone());
    let base4 = SatBuilder::new(4).build(grid.clone());
    let base8 = SatBuilder::new(8).build(grid);

    for (x, y) in [(32, 16), (0, 16), (17, 5), (32, 0)] {
        assert!(approx_vec(base2.at(x, y), base4.at(x, y)));
        assert!(approx_vec(base4.at(x, y), base8.at(x, y)));
    }
}
