//! Algorithm Switching Tests
//!
//! Tests for:
//! - Deferred selection and frame-boundary switching
//! - Per-algorithm frame plans
//! - Degraded plans on invalid camera ranges
//! - Light-space target caching and validation

use glam::UVec2;

use shadow_lab::renderer::targets::{TargetCache, TargetSpec};
use shadow_lab::scene::Camera;
use shadow_lab::shadow::{Evaluation, FrameInputs, LightTarget, MAX_CASCADES};
use shadow_lab::{RenderSettings, Scene, ShadowAlgorithm, ShadowLabError, ShadowStateMachine};

fn inputs<'a>(scene: &'a Scene, cascade_count: usize) -> FrameInputs<'a> {
    FrameInputs {
        camera: &scene.camera,
        light_camera: &scene.light_camera,
        cascade_count,
        split_weight: 0.5,
        padding_grid: UVec2::new(1920, 1080),
    }
}

fn scene() -> Scene {
    Scene::comparison_scene(&RenderSettings::default())
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn selection_applies_at_next_frame() {
    let scene = scene();
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Pcf);

    assert!(state.select(ShadowAlgorithm::SatVsm));
    assert_eq!(state.active(), ShadowAlgorithm::Pcf);
    assert_eq!(state.pending(), Some(ShadowAlgorithm::SatVsm));

    let plan = state.begin_frame(&inputs(&scene, 3));
    assert_eq!(plan.algorithm, ShadowAlgorithm::SatVsm);
    assert_eq!(state.active(), ShadowAlgorithm::SatVsm);
    assert_eq!(state.pending(), None);
    assert_eq!(state.frames_in_state(), 1);
}

#[test]
fn selecting_active_algorithm_is_a_no_op() {
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Vsm);
    assert!(!state.select(ShadowAlgorithm::Vsm));
    assert_eq!(state.pending(), None);
}

#[test]
fn reselecting_active_cancels_pending() {
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Vsm);
    assert!(state.select(ShadowAlgorithm::Psvsm));
    assert!(state.select(ShadowAlgorithm::Vsm));
    assert_eq!(state.pending(), None);
}

#[test]
fn last_selection_before_boundary_wins() {
    let scene = scene();
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Pcf);
    state.select(ShadowAlgorithm::Vsm);
    state.select(ShadowAlgorithm::Psvsm);

    let plan = state.begin_frame(&inputs(&scene, 2));
    assert_eq!(plan.algorithm, ShadowAlgorithm::Psvsm);
}

#[test]
fn frames_in_state_resets_on_switch() {
    let scene = scene();
    let mut state = ShadowStateMachine::default();
    for _ in 0..3 {
        let _ = state.begin_frame(&inputs(&scene, 3));
    }
    assert_eq!(state.frames_in_state(), 3);

    state.select(ShadowAlgorithm::Pcf);
    let _ = state.begin_frame(&inputs(&scene, 3));
    assert_eq!(state.frames_in_state(), 1);
}

// ============================================================================
// Plans
// ============================================================================

#[test]
fn single_map_plans() {
    let scene = scene();
    let cases = [
        (ShadowAlgorithm::Pcf, LightTarget::Depth, Evaluation::DepthCompare, false),
        (ShadowAlgorithm::Vsm, LightTarget::Moments, Evaluation::Chebyshev, false),
        (ShadowAlgorithm::SatVsm, LightTarget::Moments, Evaluation::SummedAreaChebyshev, true),
    ];

    for (algorithm, target, evaluation, build_sat) in cases {
        let mut state = ShadowStateMachine::new(algorithm);
        let inputs = inputs(&scene, 3);
        let plan = state.begin_frame(&inputs);

        assert_eq!(plan.target, target, "{algorithm}");
        assert_eq!(plan.evaluation, evaluation, "{algorithm}");
        assert_eq!(plan.build_sat, build_sat, "{algorithm}");
        assert_eq!(plan.light_passes.len(), 1, "{algorithm}");
        assert_eq!(plan.light_passes[0].layer, 0);
        assert_eq!(plan.light_passes[0].view_projection, inputs.light_view_projection());
        assert!(plan.splits.is_none());
    }
}

#[test]
fn switch_to_psvsm_plans_one_pass_per_cascade() {
    let scene = scene();
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Pcf);
    let _ = state.begin_frame(&inputs(&scene, 4));

    state.select(ShadowAlgorithm::Psvsm);
    let plan = state.begin_frame(&inputs(&scene, 4));

    assert_eq!(plan.target, LightTarget::MomentsArray { layers: 4 });
    assert_eq!(plan.evaluation, Evaluation::CascadedChebyshev);
    assert_eq!(plan.cascades.len(), 4);

    let layers: Vec<u32> = plan.light_passes.iter().map(|p| p.layer).collect();
    assert_eq!(layers, vec![0, 1, 2, 3]);

    let splits = plan.splits.as_ref().unwrap();
    assert_eq!(splits.count(), 4);
    assert_eq!(splits.near(), scene.camera.near());
    assert_eq!(splits.far(), scene.camera.far());
    for (pass, crop) in plan.light_passes.iter().zip(&plan.cascades) {
        assert_eq!(pass.view_projection, crop.view_projection);
    }
}

#[test]
fn cascade_count_is_clamped() {
    let scene = scene();
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Psvsm);

    let plan = state.begin_frame(&inputs(&scene, 0));
    assert_eq!(plan.light_passes.len(), 1);

    let plan = state.begin_frame(&inputs(&scene, 12));
    assert_eq!(plan.light_passes.len(), MAX_CASCADES);
    assert_eq!(
        plan.target,
        LightTarget::MomentsArray {
            layers: MAX_CASCADES as u32
        }
    );
}

#[test]
fn invalid_camera_range_degrades_plan() {
    let mut scene = scene();
    scene.camera = Camera::new_perspective(30.0, 1.0, 10.0, 5.0);
    let mut state = ShadowStateMachine::new(ShadowAlgorithm::Psvsm);

    let plan = state.begin_frame(&inputs(&scene, 3));
    assert_eq!(plan.algorithm, ShadowAlgorithm::Psvsm);
    assert!(plan.light_passes.is_empty());
    assert!(plan.splits.is_none());
    assert_eq!(plan.target, LightTarget::MomentsArray { layers: 3 });
}

// ============================================================================
// Target Cache
// ============================================================================

#[test]
fn cache_reuses_matching_spec() {
    let mut cache: TargetCache<u32> = TargetCache::new();
    let spec = TargetSpec::new(LightTarget::Moments, 1024);

    assert_eq!(*cache.get_or_create(spec, |_| Ok(1)).unwrap(), 1);
    assert_eq!(*cache.get_or_create(spec, |_| Ok(2)).unwrap(), 1);
    assert_eq!(cache.builds(), 1);
}

#[test]
fn cache_rebuilds_when_spec_changes() {
    let mut cache: TargetCache<u32> = TargetCache::new();
    let three = TargetSpec::new(LightTarget::MomentsArray { layers: 3 }, 1024);
    let four = TargetSpec::new(LightTarget::MomentsArray { layers: 4 }, 1024);

    cache.get_or_create(three, |s| Ok(s.layers())).unwrap();
    assert_eq!(*cache.get_or_create(four, |s| Ok(s.layers())).unwrap(), 4);
    assert_eq!(cache.builds(), 2);
    assert_eq!(cache.cached_spec(LightTarget::MomentsArray { layers: 1 }), Some(four));
    assert!(cache.get(&three).is_none());
}

#[test]
fn kinds_use_separate_slots() {
    let mut cache: TargetCache<&str> = TargetCache::new();
    let depth = TargetSpec::new(LightTarget::Depth, 512);
    let moments = TargetSpec::new(LightTarget::Moments, 512);

    cache.get_or_create(depth, |_| Ok("depth")).unwrap();
    cache.get_or_create(moments, |_| Ok("moments")).unwrap();

    assert_eq!(cache.get(&depth), Some(&"depth"));
    assert_eq!(cache.get(&moments), Some(&"moments"));
}

#[test]
fn failed_spec_is_recorded() {
    let mut cache: TargetCache<u32> = TargetCache::new();
    let spec = TargetSpec::new(LightTarget::Moments, 1 << 20);

    let result = cache.get_or_create(spec, |s| s.validate(&wgpu::Limits::default()).map(|()| 0));
    assert!(matches!(result, Err(ShadowLabError::IncompleteRenderTarget { .. })));
    assert!(cache.has_failed(&spec));
    assert!(cache.get(&spec).is_none());
    assert_eq!(cache.builds(), 0);

    let smaller = TargetSpec::new(LightTarget::Moments, 1024);
    cache.get_or_create(smaller, |_| Ok(7)).unwrap();
    assert!(!cache.has_failed(&smaller));
    assert!(!cache.has_failed(&spec));
}

#[test]
fn spec_validation_against_limits() {
    let limits = wgpu::Limits::default();
    assert!(TargetSpec::new(LightTarget::Depth, 1024).validate(&limits).is_ok());
    assert!(TargetSpec::new(LightTarget::Depth, 0).validate(&limits).is_err());
    assert!(
        TargetSpec::new(LightTarget::MomentsArray { layers: 0 }, 256)
            .validate(&limits)
            .is_err()
    );
    assert!(
        TargetSpec::new(LightTarget::MomentsArray { layers: 4 }, 256)
            .validate(&limits)
            .is_ok()
    );
}
