//! First-person camera controller

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use crate::core::camera::Camera;
use crate::core::input::InputState;
use crate::core::types::{Quat, Vec3};

/// How mouse deltas are turned into an orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Accumulate yaw and pitch angles, then rebuild the orientation as a yaw
    /// about world up followed by a pitch about the yaw-rotated right axis.
    /// Diagonal mouse motion visibly snaps with this composition. Pitch is
    /// not clamped, so looking past straight up flips the view over.
    #[default]
    Composed,
    /// Integrate per-frame quaternion deltas into the current orientation
    Incremental,
}

/// FPS-style camera controller with WASD movement and mouse look
pub struct CameraController {
    /// Movement speed in voxels per second
    pub movement_speed: f32,
    /// Rotation speed in radians per viewport-width of mouse travel per second
    pub rotate_speed: f32,
    /// Orientation integration mode
    pub mode: RotationMode,
    /// Current yaw (rotation around world Y) in radians
    yaw: f32,
    /// Current pitch (rotation around the yawed right axis) in radians
    pitch: f32,
}

impl CameraController {
    /// Create new controller
    pub fn new(movement_speed: f32, rotate_speed: f32, mode: RotationMode) -> Self {
        Self {
            movement_speed,
            rotate_speed,
            mode,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Update camera orientation and position from one frame of input
    pub fn update(&mut self, camera: &mut Camera, input: &InputState, dt: f32) {
        let (dx, dy) = input.mouse_delta();
        let (width, height) = camera.viewport();
        let rotate_delta = self.rotate_speed * dt;
        let yaw_delta = -(dx / width as f32) * rotate_delta;
        let pitch_delta = -(dy / height as f32) * rotate_delta;

        if yaw_delta != 0.0 || pitch_delta != 0.0 {
            camera.rotation = match self.mode {
                RotationMode::Composed => {
                    self.yaw += yaw_delta;
                    self.pitch += pitch_delta;
                    composed_rotation(self.yaw, self.pitch)
                }
                RotationMode::Incremental => {
                    let yaw = Quat::from_axis_angle(Vec3::Y, yaw_delta);
                    let pitch = Quat::from_axis_angle(Vec3::X, pitch_delta);
                    (yaw * camera.rotation * pitch).normalize()
                }
            };
        }

        // Movement uses the post-rotation basis so strafing matches facing
        let move_delta = self.movement_speed * dt;
        let forward = camera.forward();
        let right = camera.right();

        if input.is_held(KeyCode::KeyW) {
            camera.position += forward * move_delta;
        }
        if input.is_held(KeyCode::KeyS) {
            camera.position -= forward * move_delta;
        }
        if input.is_held(KeyCode::KeyD) {
            camera.position += right * move_delta;
        }
        if input.is_held(KeyCode::KeyA) {
            camera.position -= right * move_delta;
        }
    }

    /// Set orientation from angles (in radians) and apply it to the camera
    pub fn set_orientation(&mut self, camera: &mut Camera, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        camera.rotation = composed_rotation(self.yaw, self.pitch);
    }

    /// Get current yaw
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Get current pitch
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(10.0, 60.0, RotationMode::default())
    }
}

/// Yaw about world up, then pitch about the yaw-rotated right axis
pub fn composed_rotation(yaw: f32, pitch: f32) -> Quat {
    let yaw_rotation = Quat::from_axis_angle(Vec3::Y, yaw);
    let right = yaw_rotation * Vec3::X;
    let pitch_rotation = Quat::from_axis_angle(right, pitch);
    (pitch_rotation * yaw_rotation).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec3::splat(16.0), 800, 600)
    }

    #[test]
    fn test_no_input_is_idempotent() {
        for mode in [RotationMode::Composed, RotationMode::Incremental] {
            let mut controller = CameraController::new(10.0, 60.0, mode);
            let mut camera = camera();
            controller.set_orientation(&mut camera, 0.4, -0.2);
            let before = camera.clone();

            let input = InputState::new();
            for _ in 0..5 {
                controller.update(&mut camera, &input, 0.5);
            }

            assert_eq!(camera, before, "{mode:?} drifted without input");
        }
    }

    #[test]
    fn test_forward_moves_movement_speed_per_second() {
        let mut controller = CameraController::new(7.5, 60.0, RotationMode::Composed);
        let mut camera = camera();
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);

        controller.update(&mut camera, &input, 1.0);

        let moved = camera.position - Vec3::splat(16.0);
        assert!(moved.abs_diff_eq(Vec3::new(0.0, 0.0, -7.5), 1e-5), "moved {moved}");
    }

    #[test]
    fn test_strafe_follows_rotated_right_axis() {
        let mut controller = CameraController::default();
        let mut camera = camera();
        controller.set_orientation(&mut camera, std::f32::consts::FRAC_PI_2, 0.0);

        let mut input = InputState::new();
        input.press(KeyCode::KeyD);
        controller.update(&mut camera, &input, 0.1);

        // Yawed 90 degrees left, so right now points down -Z
        let moved = camera.position - Vec3::splat(16.0);
        assert!(moved.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5), "moved {moved}");
    }

    #[test]
    fn test_mouse_right_turns_right() {
        for mode in [RotationMode::Composed, RotationMode::Incremental] {
            let mut controller = CameraController::new(10.0, 1.0, mode);
            let mut camera = camera();
            let mut input = InputState::new();
            input.add_mouse_delta(80.0, 0.0);

            controller.update(&mut camera, &input, 1.0);

            let forward = camera.forward();
            assert!(forward.x > 0.0, "{mode:?} forward {forward}");
            assert!(camera.rotation.is_normalized());
        }
    }

    #[test]
    fn test_composed_pitch_accumulates_past_vertical() {
        let mut controller = CameraController::new(10.0, 1.0, RotationMode::Composed);
        let mut camera = camera();
        let mut input = InputState::new();
        // Two viewport heights of upward travel is two radians of pitch
        input.add_mouse_delta(0.0, -1200.0);

        controller.update(&mut camera, &input, 1.0);

        assert!((controller.pitch() - 2.0).abs() < 1e-5, "pitch {}", controller.pitch());
        let expected = Vec3::new(0.0, 2.0_f32.sin(), -2.0_f32.cos());
        assert!(camera.forward().abs_diff_eq(expected, 1e-5), "forward {}", camera.forward());
    }
}
