//! Per-frame update order shared by the windowed and headless drivers

use glam::Vec3;

use crate::core::camera::Camera;
use crate::core::camera_controller::CameraController;
use crate::core::input::InputState;
use crate::core::types::Result;
use crate::lighting::backend::LightingBackend;
use crate::lighting::pipeline::LightingPipeline;
use crate::lighting::state::LitFrame;

/// Owns the camera and the lighting state machine together with the
/// backend that executes it. One [`FrameDriver::update`] is one frame:
/// camera first, then `RefreshSamples → Dispatch → Barrier → SwapIndex`.
pub struct FrameDriver<B: LightingBackend> {
    camera: Camera,
    controller: CameraController,
    lighting: LightingPipeline,
    backend: B,
}

impl<B: LightingBackend> FrameDriver<B> {
    pub fn new(
        camera: Camera,
        controller: CameraController,
        lighting: LightingPipeline,
        backend: B,
    ) -> Self {
        Self {
            camera,
            controller,
            lighting,
            backend,
        }
    }

    /// Advance one frame. A backend error is fatal to the caller's loop.
    pub fn update(&mut self, input: &InputState, dt: f32) -> Result<LitFrame> {
        self.controller.update(&mut self.camera, input, dt);
        self.lighting.run_frame(&mut self.backend)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lighting(&self) -> &LightingPipeline {
        &self.lighting
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Starting camera: centered on x and y, one voxel inside the +Z face,
/// looking down -Z across the chunk
pub fn spawn_camera(chunk_size: u32, width: u32, height: u32) -> Camera {
    let n = chunk_size as f32;
    Camera::new(Vec3::new(n / 2.0, n / 2.0, n - 1.5), width, height)
}
