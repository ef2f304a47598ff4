//! Operator Controls Tests
//!
//! Tests for:
//! - Key bindings
//! - Pause semantics and control flow
//! - Mouse drag and wheel camera motion

use glam::{Vec2, Vec3};
use winit::event::MouseButton;
use winit::event_loop::ControlFlow;
use winit::keyboard::KeyCode;

use shadow_lab::scene::Camera;
use shadow_lab::{Command, Controls, ShadowAlgorithm};

fn camera() -> Camera {
    let mut camera = Camera::new_perspective(30.0, 16.0 / 9.0, 1.0, 2000.0);
    camera.look_at(Vec3::new(600.0, 400.0, 600.0), Vec3::new(0.0, 100.0, 0.0), Vec3::Y);
    camera
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn digits_select_algorithms() {
    let cases = [
        (KeyCode::Digit1, ShadowAlgorithm::Pcf),
        (KeyCode::Digit2, ShadowAlgorithm::Vsm),
        (KeyCode::Digit3, ShadowAlgorithm::Psvsm),
        (KeyCode::Digit4, ShadowAlgorithm::SatVsm),
        (KeyCode::Numpad4, ShadowAlgorithm::SatVsm),
    ];
    for (key, algorithm) in cases {
        assert_eq!(Controls::map_key(key), Some(Command::SelectAlgorithm(algorithm)));
    }
    assert_eq!(Controls::map_key(KeyCode::Digit5), None);
}

#[test]
fn other_bindings() {
    assert_eq!(Controls::map_key(KeyCode::ArrowUp), Some(Command::CascadeUp));
    assert_eq!(Controls::map_key(KeyCode::ArrowDown), Some(Command::CascadeDown));
    assert_eq!(Controls::map_key(KeyCode::KeyL), Some(Command::ToggleLight));
    assert_eq!(Controls::map_key(KeyCode::KeyP), Some(Command::LogCameraPosition));
    assert_eq!(Controls::map_key(KeyCode::Space), Some(Command::TogglePause));
    assert_eq!(Controls::map_key(KeyCode::KeyQ), Some(Command::Quit));
    assert_eq!(Controls::map_key(KeyCode::Escape), Some(Command::Quit));
    assert_eq!(Controls::map_key(KeyCode::KeyZ), None);
}

#[test]
fn selection_is_ignored_while_paused() {
    let mut controls = Controls::new();
    assert_eq!(controls.on_key(KeyCode::Space), Some(Command::TogglePause));
    assert!(controls.is_paused());

    assert_eq!(controls.on_key(KeyCode::Digit3), None);
    assert_eq!(controls.on_key(KeyCode::KeyL), Some(Command::ToggleLight));

    controls.on_key(KeyCode::Space);
    assert!(!controls.is_paused());
    assert_eq!(
        controls.on_key(KeyCode::Digit3),
        Some(Command::SelectAlgorithm(ShadowAlgorithm::Psvsm))
    );
}

#[test]
fn cascade_keys_are_ignored_while_paused() {
    let mut controls = Controls::new();
    controls.on_key(KeyCode::Space);

    assert_eq!(controls.on_key(KeyCode::ArrowUp), None);
    assert_eq!(controls.on_key(KeyCode::ArrowDown), None);
    assert_eq!(controls.on_key(KeyCode::KeyP), Some(Command::LogCameraPosition));

    controls.on_key(KeyCode::Space);
    assert_eq!(controls.on_key(KeyCode::ArrowUp), Some(Command::CascadeUp));
    assert_eq!(controls.on_key(KeyCode::ArrowDown), Some(Command::CascadeDown));
}

#[test]
fn pausing_stops_continuous_redraw() {
    let mut controls = Controls::new();
    assert_eq!(controls.control_flow(), ControlFlow::Poll);

    controls.on_key(KeyCode::Space);
    assert_eq!(controls.control_flow(), ControlFlow::Wait);

    controls.on_key(KeyCode::Space);
    assert_eq!(controls.control_flow(), ControlFlow::Poll);
}

// ============================================================================
// Mouse
// ============================================================================

#[test]
fn first_cursor_event_only_records_position() {
    let mut controls = Controls::new();
    let mut camera = camera();
    let before = camera.view_matrix();

    controls.on_mouse_button(MouseButton::Left, true);
    assert!(!controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera));
    assert_eq!(camera.view_matrix(), before);
}

#[test]
fn moving_without_button_does_nothing() {
    let mut controls = Controls::new();
    let mut camera = camera();
    let before = camera.position();

    controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera);
    assert!(!controls.on_cursor_moved(Vec2::new(150.0, 80.0), &mut camera));
    assert_eq!(camera.position(), before);
}

#[test]
fn vertical_drag_moves_along_view() {
    let mut controls = Controls::new();
    let mut camera = camera();
    let start = camera.position();
    let forward = camera.forward();

    controls.on_mouse_button(MouseButton::Left, true);
    controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera);
    // Dragging up moves the camera forward
    assert!(controls.on_cursor_moved(Vec2::new(100.0, 90.0), &mut camera));

    let moved = camera.position() - start;
    assert!((moved.length() - 10.0).abs() < 1e-3);
    assert!(moved.normalize().dot(forward) > 0.999);
}

#[test]
fn horizontal_drag_orbits_world_y() {
    let mut controls = Controls::new();
    let mut camera = camera();
    let start = camera.position();

    controls.on_mouse_button(MouseButton::Left, true);
    controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera);
    controls.on_cursor_moved(Vec2::new(160.0, 100.0), &mut camera);

    let end = camera.position();
    assert!((end.y - start.y).abs() < 1e-3);
    assert!((end.x.hypot(end.z) - start.x.hypot(start.z)).abs() < 1e-2);
    assert!((end - start).length() > 1.0);
}

#[test]
fn releasing_button_stops_drag() {
    let mut controls = Controls::new();
    let mut camera = camera();

    controls.on_mouse_button(MouseButton::Left, true);
    controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera);
    controls.on_mouse_button(MouseButton::Left, false);

    let before = camera.position();
    assert!(!controls.on_cursor_moved(Vec2::new(100.0, 50.0), &mut camera));
    assert_eq!(camera.position(), before);
}

#[test]
fn wheel_zooms() {
    let controls = Controls::new();
    let mut camera = camera();

    controls.on_scroll(1.0, &mut camera);
    assert!((camera.fov_y_degrees().unwrap() - 29.0).abs() < 1e-3);

    controls.on_scroll(-1.0, &mut camera);
    controls.on_scroll(-1.0, &mut camera);
    assert!((camera.fov_y_degrees().unwrap() - 31.0).abs() < 1e-3);
}

#[test]
fn drag_is_ignored_while_paused() {
    let mut controls = Controls::new();
    let mut camera = camera();
    let before = camera.view_matrix();

    controls.on_mouse_button(MouseButton::Left, true);
    controls.on_cursor_moved(Vec2::new(10.0, 10.0), &mut camera);
    controls.on_key(KeyCode::Space);

    assert!(!controls.on_cursor_moved(Vec2::new(50.0, 80.0), &mut camera));
    assert_eq!(camera.view_matrix(), before);

    // Resuming continues from the last seen cursor, not the pre-pause one
    controls.on_key(KeyCode::Space);
    let start = camera.position();
    assert!(controls.on_cursor_moved(Vec2::new(50.0, 70.0), &mut camera));
    assert!(((camera.position() - start).length() - 10.0).abs() < 1e-3);
}

#[test]
fn presses_while_paused_do_not_start_a_drag() {
    let mut controls = Controls::new();
    let mut camera = camera();
    controls.on_key(KeyCode::Space);

    controls.on_mouse_button(MouseButton::Left, true);
    controls.on_key(KeyCode::Space);

    let before = camera.position();
    controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera);
    assert!(!controls.on_cursor_moved(Vec2::new(100.0, 40.0), &mut camera));
    assert_eq!(camera.position(), before);
}

#[test]
fn release_while_paused_ends_drag() {
    let mut controls = Controls::new();
    let mut camera = camera();

    controls.on_mouse_button(MouseButton::Left, true);
    controls.on_cursor_moved(Vec2::new(100.0, 100.0), &mut camera);
    controls.on_key(KeyCode::Space);
    controls.on_mouse_button(MouseButton::Left, false);
    controls.on_key(KeyCode::Space);

    let before = camera.position();
    assert!(!controls.on_cursor_moved(Vec2::new(100.0, 40.0), &mut camera));
    assert_eq!(camera.position(), before);
}

#[test]
fn wheel_is_ignored_while_paused() {
    let mut controls = Controls::new();
    let mut camera = camera();
    controls.on_key(KeyCode::Space);

    assert!(!controls.on_scroll(1.0, &mut camera));
    assert!((camera.fov_y_degrees().unwrap() - 30.0).abs() < 1e-3);

    controls.on_key(KeyCode::Space);
    assert!(controls.on_scroll(1.0, &mut camera));
    assert!((camera.fov_y_degrees().unwrap() - 29.0).abs() < 1e-3);
}
