//! Settings Validation Tests

use shadow_lab::shadow::MAX_CASCADES;
use shadow_lab::{RenderSettings, ShadowLabError};

fn rejects(settings: &RenderSettings) -> bool {
    matches!(settings.validate(), Err(ShadowLabError::InvalidSettings(_)))
}

#[test]
fn defaults_are_valid() {
    let settings = RenderSettings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.cascade_count, 3);
    assert_eq!(settings.sat_base, 4);
}

#[test]
fn rejects_zero_sizes() {
    assert!(rejects(&RenderSettings {
        frame_width: 0,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        frame_height: 0,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        shadow_map_size: 0,
        ..Default::default()
    }));
}

#[test]
fn rejects_cascade_count_out_of_range() {
    assert!(rejects(&RenderSettings {
        cascade_count: 0,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        cascade_count: MAX_CASCADES + 1,
        ..Default::default()
    }));
    assert!(
        RenderSettings {
            cascade_count: MAX_CASCADES,
            ..Default::default()
        }
        .validate()
        .is_ok()
    );
}

#[test]
fn rejects_bad_filter_parameters() {
    assert!(rejects(&RenderSettings {
        split_weight: 1.5,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        sat_base: 1,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        vsm_min_variance: -1.0,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        vsm_min_variance: f32::NAN,
        ..Default::default()
    }));
    assert!(rejects(&RenderSettings {
        vsm_light_bleed_reduction: 1.0,
        ..Default::default()
    }));
}

#[test]
fn rejects_color_depth_format() {
    assert!(rejects(&RenderSettings {
        depth_format: wgpu::TextureFormat::Rgba8Unorm,
        ..Default::default()
    }));
}
