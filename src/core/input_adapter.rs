use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixels treated as one wheel line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// A completed left click at a physical pixel position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub position: Vec2,
}

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Current cursor position (relative to window)
    mouse_position: Option<Vec2>,
    /// Cursor movement delta since last reset
    mouse_delta: Vec2,
    scroll: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update internal state from a window event. Releasing the left button
    /// yields a click at the last cursor position, the way a browser `click`
    /// follows `mouseup`.
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<Click> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_button(button, event.state);
                    }
                }
                None
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let btn = Self::mouse_button_to_button(*button)?;
                self.mouse_input(btn, *state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32), true);
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                None
            }
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.track_consumed_event(event);
                None
            }
            _ => None,
        }
    }

    /// Keeps state in step with an event the HUD consumed. Releases, cursor
    /// position and focus still land; presses, drags and wheel input do not,
    /// so no click or orbit starts from it.
    pub fn track_consumed_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button,
                ..
            } => {
                if let Some(btn) = Self::mouse_button_to_button(*button) {
                    self.set_button(btn, ElementState::Released);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Released => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_button(button, ElementState::Released);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32), false);
            }
            WindowEvent::CursorLeft { .. } => self.mouse_position = None,
            // Releases that happen while unfocused never arrive
            WindowEvent::Focused(false) => self.pressed_keys.clear(),
            _ => {}
        }
    }

    fn mouse_input(&mut self, button: Button, state: ElementState) -> Option<Click> {
        let was_down = self.pressed_keys.contains(&button);
        self.set_button(button, state);

        let released = was_down && state == ElementState::Released;
        match (button, released, self.mouse_position) {
            (Button::MouseLeft, true, Some(position)) => Some(Click { position }),
            _ => None,
        }
    }

    /// Moves the cursor, adding to the drag delta only when `track_delta`
    fn cursor_moved(&mut self, position: Vec2, track_delta: bool) {
        if let (true, Some(old_pos)) = (track_delta, self.mouse_position) {
            self.mouse_delta += position - old_pos;
        }
        self.mouse_position = Some(position);
    }

    fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(button);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&button);
            }
        }
    }

    /// Reset per-frame state (pointer and wheel deltas)
    /// Call this at the end of each frame after processing input
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Right => Some(Button::MouseRight),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn pointer_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}
