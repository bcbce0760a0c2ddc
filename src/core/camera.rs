//! First-person camera state

use crate::core::types::{Mat3, Quat, Vec3};

/// Camera with position, orientation and viewport size
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Position in chunk space (one unit per voxel)
    pub position: Vec3,
    /// Orientation as quaternion
    pub rotation: Quat,
    /// Viewport width in pixels
    width: u32,
    /// Viewport height in pixels
    height: u32,
}

impl Camera {
    /// Create a new camera looking down -Z
    pub fn new(position: Vec3, width: u32, height: u32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get right direction (positive X in camera space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get up direction (positive Y in camera space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Orthonormal rotation matrix (columns are right, up, back)
    pub fn rotation_matrix(&self) -> Mat3 {
        Mat3::from_quat(self.rotation)
    }

    /// Update viewport size (call on window resize)
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 800, 600)
    }
}
