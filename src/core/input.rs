//! Input state tracking

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard and mouse input between two frames
pub struct InputState {
    /// Keys currently held down
    keys_held: HashSet<KeyCode>,
    /// Keys that went down this frame
    keys_pressed: HashSet<KeyCode>,
    /// Mouse movement in pixels since the last frame
    mouse_delta: (f32, f32),
    /// Last known cursor position (used when the cursor is not captured)
    mouse_position: Option<(f32, f32)>,
    /// Whether mouse is captured (raw device motion is used)
    mouse_captured: bool,
    /// Set once the user asked to quit
    exit_requested: bool,
}

impl InputState {
    /// Create new input state
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            mouse_delta: (0.0, 0.0),
            mouse_position: None,
            mouse_captured: false,
            exit_requested: false,
        }
    }

    /// Process a window event
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(key_code),
                    state,
                    ..
                },
                ..
            } => match state {
                ElementState::Pressed => self.press(*key_code),
                ElementState::Released => self.release(*key_code),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = (position.x as f32, position.y as f32);
                if !self.mouse_captured {
                    if let Some(old) = self.mouse_position {
                        self.mouse_delta.0 += new_pos.0 - old.0;
                        self.mouse_delta.1 += new_pos.1 - old.1;
                    }
                }
                self.mouse_position = Some(new_pos);
            }
            WindowEvent::Focused(false) => {
                self.keys_held.clear();
                self.keys_pressed.clear();
            }
            _ => {}
        }
    }

    /// Process device event for raw mouse motion (when cursor is grabbed)
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        if self.mouse_captured {
            self.mouse_delta.0 += delta.0 as f32;
            self.mouse_delta.1 += delta.1 as f32;
        }
    }

    /// Record a key going down. Key repeat does not count as a new press.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    /// Record a key going up
    pub fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
        self.keys_pressed.remove(&key);
    }

    /// Add a mouse movement in pixels regardless of capture state
    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Call at end of frame to reset per-frame state
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = (0.0, 0.0);
    }

    /// Check if key is currently held down
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if key was newly pressed this frame
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Get mouse delta in pixels since last frame
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    /// Set mouse captured state
    pub fn set_mouse_captured(&mut self, captured: bool) {
        self.mouse_captured = captured;
        self.mouse_delta = (0.0, 0.0);
        self.mouse_position = None;
    }

    /// Check if mouse is captured
    pub fn is_mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    /// Ask the frame loop to stop after the current event
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();

        assert!(!input.is_held(KeyCode::KeyW));

        input.press(KeyCode::KeyW);

        assert!(input.is_held(KeyCode::KeyW));
        assert!(input.is_pressed(KeyCode::KeyW));

        input.end_frame();

        assert!(input.is_held(KeyCode::KeyW));
        assert!(!input.is_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyA);
        input.end_frame();
        input.press(KeyCode::KeyA);
        assert!(input.is_held(KeyCode::KeyA));
        assert!(!input.is_pressed(KeyCode::KeyA));

        input.release(KeyCode::KeyA);
        assert!(!input.is_held(KeyCode::KeyA));
    }

    #[test]
    fn test_mouse_motion_only_when_captured() {
        let mut input = InputState::new();
        input.process_mouse_motion((4.0, -2.0));
        assert_eq!(input.mouse_delta(), (0.0, 0.0));

        input.set_mouse_captured(true);
        input.process_mouse_motion((4.0, -2.0));
        input.process_mouse_motion((1.0, 1.0));
        assert_eq!(input.mouse_delta(), (5.0, -1.0));

        input.end_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_exit_request_survives_end_frame() {
        let mut input = InputState::new();
        assert!(!input.exit_requested());
        input.request_exit();
        input.end_frame();
        assert!(input.exit_requested());
    }
}
