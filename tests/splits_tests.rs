//! Cascade Split Tests
//!
//! Tests for:
//! - Split ordering and endpoints
//! - Uniform / logarithmic blending
//! - Parameter validation, including extreme and near-degenerate ranges
//! - Cascade lookup by view depth

use shadow_lab::ShadowLabError;
use shadow_lab::shadow::splits::{log_split, uniform_split};
use shadow_lab::shadow::{CascadeSplits, MAX_CASCADES};

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn splits_are_strictly_increasing_with_exact_endpoints() {
    for count in 1..=MAX_CASCADES {
        for weight in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let splits = CascadeSplits::compute(1.0, 1000.0, count, weight).unwrap();
            let d = splits.distances();

            assert_eq!(d.len(), count + 1);
            assert_eq!(d[0], 1.0, "first split must be the near plane");
            assert_eq!(d[count], 1000.0, "last split must be the far plane");
            assert!(
                d.windows(2).all(|w| w[0] < w[1]),
                "splits not increasing for N={count}, w={weight}: {d:?}"
            );
        }
    }
}

#[test]
fn single_cascade_covers_whole_range() {
    let splits = CascadeSplits::compute(0.5, 80.0, 1, 0.5).unwrap();
    assert_eq!(splits.distances(), &[0.5, 80.0]);
    assert_eq!(splits.slice(0), Some((0.5, 80.0)));
    assert_eq!(splits.slice(1), None);
}

#[test]
fn slices_are_contiguous() {
    let splits = CascadeSplits::compute(1.0, 2000.0, 4, 0.5).unwrap();
    let slices: Vec<_> = splits.slices().collect();
    assert_eq!(slices.len(), 4);
    for pair in slices.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
}

// ============================================================================
// Blending
// ============================================================================

#[test]
fn half_weight_lies_between_uniform_and_log() {
    let (near, far, count) = (1.0, 1000.0, 3);
    let splits = CascadeSplits::compute(near, far, count, 0.5).unwrap();

    for i in 1..count {
        let uniform = uniform_split(near, far, i, count);
        let log = log_split(near, far, i, count);
        let d = splits.distances()[i];
        assert!(
            log < d && d < uniform,
            "d_{i} = {d} not strictly between log {log} and uniform {uniform}"
        );
    }
}

#[test]
fn weight_zero_is_uniform_and_one_is_log() {
    let uniform = CascadeSplits::compute(1.0, 1000.0, 3, 0.0).unwrap();
    assert!(approx(uniform.distances()[1], 334.0));
    assert!(approx(uniform.distances()[2], 667.0));

    let log = CascadeSplits::compute(1.0, 1000.0, 3, 1.0).unwrap();
    assert!(approx(log.distances()[1], 10.0));
    assert!(approx(log.distances()[2], 100.0));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn rejects_invalid_ranges() {
    let cases = [
        (1.0, 100.0, 0),
        (0.0, 100.0, 3),
        (-1.0, 100.0, 3),
        (10.0, 10.0, 2),
        (10.0, 5.0, 2),
    ];
    for (near, far, count) in cases {
        let result = CascadeSplits::compute(near, far, count, 0.5);
        assert!(
            matches!(result, Err(ShadowLabError::InvalidCascadeRange { .. })),
            "expected InvalidCascadeRange for near={near}, far={far}, count={count}"
        );
    }
}

#[test]
fn rejects_weight_outside_unit_interval() {
    assert!(matches!(
        CascadeSplits::compute(1.0, 100.0, 3, 1.5),
        Err(ShadowLabError::InvalidSplitWeight(_))
    ));
    assert!(matches!(
        CascadeSplits::compute(1.0, 100.0, 3, -0.1),
        Err(ShadowLabError::InvalidSplitWeight(_))
    ));
}

/// Either a finite, strictly increasing split or a range error.
fn assert_monotonic_or_rejected(near: f32, far: f32, count: usize, weight: f32) {
    match CascadeSplits::compute(near, far, count, weight) {
        Ok(splits) => {
            let d = splits.distances();
            assert_eq!(d.len(), count + 1);
            assert!(
                d.iter().all(|x| x.is_finite()),
                "non-finite split for [{near}, {far}], N={count}, w={weight}: {d:?}"
            );
            assert!(
                d.windows(2).all(|w| w[0] < w[1]),
                "splits not increasing for [{near}, {far}], N={count}, w={weight}: {d:?}"
            );
        }
        Err(err) => assert!(
            matches!(err, ShadowLabError::InvalidCascadeRange { .. }),
            "unexpected error for [{near}, {far}], N={count}, w={weight}: {err}"
        ),
    }
}

#[test]
fn extreme_ranges_stay_monotonic_or_are_rejected() {
    let ranges = [
        (1e-30, 1e30),
        (1e-20, 3e38),
        (f32::MIN_POSITIVE, f32::MAX),
        (1.0, 1.000_000_1),
        (1000.0, 1000.001),
        (0.1, 0.100_000_01),
    ];
    for (near, far) in ranges {
        for count in 1..=MAX_CASCADES {
            for weight in [0.0, 0.5, 1.0] {
                assert_monotonic_or_rejected(near, far, count, weight);
            }
        }
    }
}

#[test]
fn wide_range_splits_are_finite() {
    let splits = CascadeSplits::compute(1e-30, 1e30, 3, 0.5).unwrap();
    let d = splits.distances();
    assert!(d.iter().all(|x| x.is_finite()), "{d:?}");
    assert!(d.windows(2).all(|w| w[0] < w[1]), "{d:?}");

    let log = CascadeSplits::compute(1e-30, 1e30, 3, 1.0).unwrap();
    assert!((log.distances()[1] / 1e-10 - 1.0).abs() < 1e-3);
    assert!((log.distances()[2] / 1e10 - 1.0).abs() < 1e-3);
}

#[test]
fn collapsed_interior_splits_are_rejected() {
    assert!(matches!(
        CascadeSplits::compute(1.0, 1.000_000_1, 4, 0.5),
        Err(ShadowLabError::InvalidCascadeRange { count: 4, .. })
    ));
    // One slice has no interior split to collapse
    let single = CascadeSplits::compute(1.0, 1.000_000_1, 1, 0.5).unwrap();
    assert_eq!(single.count(), 1);
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn cascade_for_depth_picks_containing_slice() {
    let splits = CascadeSplits::compute(1.0, 1000.0, 3, 0.0).unwrap();
    assert_eq!(splits.cascade_for_depth(0.5), Some(0));
    assert_eq!(splits.cascade_for_depth(100.0), Some(0));
    assert_eq!(splits.cascade_for_depth(500.0), Some(1));
    assert_eq!(splits.cascade_for_depth(999.0), Some(2));
    assert_eq!(splits.cascade_for_depth(1000.0), Some(2));
    assert_eq!(splits.cascade_for_depth(1000.5), None);
}

#[test]
fn far_planes_are_padded_with_far() {
    let splits = CascadeSplits::compute(1.0, 1000.0, 2, 0.5).unwrap();
    let planes = splits.far_planes();
    assert_eq!(planes[0], splits.distances()[1]);
    assert_eq!(planes[1], 1000.0);
    assert_eq!(planes[2], 1000.0);
    assert_eq!(planes[3], 1000.0);
}
