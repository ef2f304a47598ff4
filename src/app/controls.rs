//! Operator Controls
//!
//! Translates keyboard and mouse input into [`Command`]s and camera motion.
//! Kept free of window state so the bindings can be tested directly.
//!
//! | Input             | Effect                                  |
//! |-------------------|-----------------------------------------|
//! | `1`–`4`           | select PCF / VSM / PSVSM / SATVSM       |
//! | `Up` / `Down`     | one cascade more / less                 |
//! | `L`               | toggle the light                        |
//! | `P`               | log the camera position                 |
//! | `Space`           | pause / resume rendering                |
//! | `Q` / `Esc`       | quit                                    |
//! | left drag         | move forward/back, orbit around world Y |
//! | left + right drag | additionally pitch                      |
//! | wheel             | zoom                                    |
//!
//! While paused only `L`, `P`, `Space` and quit are honored; camera and
//! cascade input is dropped so nothing changes behind the frozen frame.

use glam::Vec2;
use winit::event::MouseButton;
use winit::event_loop::ControlFlow;
use winit::keyboard::KeyCode;

use crate::scene::Camera;
use crate::shadow::ShadowAlgorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectAlgorithm(ShadowAlgorithm),
    CascadeUp,
    CascadeDown,
    ToggleLight,
    LogCameraPosition,
    TogglePause,
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct Controls {
    paused: bool,
    left_down: bool,
    right_down: bool,
    cursor: Option<Vec2>,
}

impl Controls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The command bound to `key`, regardless of pause state.
    #[must_use]
    pub fn map_key(key: KeyCode) -> Option<Command> {
        if let Some(algorithm) = selection_digit(key).and_then(ShadowAlgorithm::from_index) {
            return Some(Command::SelectAlgorithm(algorithm));
        }
        let command = match key {
            KeyCode::ArrowUp => Command::CascadeUp,
            KeyCode::ArrowDown => Command::CascadeDown,
            KeyCode::KeyL => Command::ToggleLight,
            KeyCode::KeyP => Command::LogCameraPosition,
            KeyCode::Space => Command::TogglePause,
            KeyCode::KeyQ | KeyCode::Escape => Command::Quit,
            _ => return None,
        };
        Some(command)
    }

    /// Handles a key press. Algorithm and cascade changes are ignored while
    /// paused.
    pub fn on_key(&mut self, key: KeyCode) -> Option<Command> {
        let command = Self::map_key(key)?;
        match command {
            Command::SelectAlgorithm(_) | Command::CascadeUp | Command::CascadeDown
                if self.paused =>
            {
                return None;
            }
            Command::TogglePause => self.paused = !self.paused,
            _ => {}
        }
        Some(command)
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Continuous redraw while running, wake only on events while paused.
    #[must_use]
    pub fn control_flow(&self) -> ControlFlow {
        if self.paused {
            ControlFlow::Wait
        } else {
            ControlFlow::Poll
        }
    }

    /// Presses are dropped while paused; releases always register.
    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed && self.paused {
            return;
        }
        match button {
            MouseButton::Left => self.left_down = pressed,
            MouseButton::Right => self.right_down = pressed,
            _ => {}
        }
    }

    /// Applies a cursor move to `camera`. Returns whether the camera moved.
    pub fn on_cursor_moved(&mut self, position: Vec2, camera: &mut Camera) -> bool {
        let Some(previous) = self.cursor.replace(position) else {
            return false;
        };
        if self.paused || !self.left_down {
            return false;
        }

        let delta = position - previous;
        camera.move_forward(-delta.y);
        camera.rotate_around_world_y(-delta.x);
        if self.right_down {
            camera.pitch(-delta.y);
        }
        true
    }

    /// Wheel up (or no vertical motion) zooms in, wheel down zooms out.
    /// Returns whether the camera changed.
    pub fn on_scroll(&self, delta_y: f32, camera: &mut Camera) -> bool {
        if self.paused {
            return false;
        }
        if delta_y >= 0.0 {
            camera.zoom_in();
        } else {
            camera.zoom_out();
        }
        true
    }
}

fn selection_digit(key: KeyCode) -> Option<u32> {
    match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some(4),
        _ => None,
    }
}
