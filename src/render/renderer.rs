//! Windowed frame: lighting compute pass, barrier, raymarch, present

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::camera_controller::CameraController;
use crate::core::config::AppConfig;
use crate::core::error::Error;
use crate::core::input::InputState;
use crate::core::types::Result;
use crate::frame::{FrameDriver, spawn_camera};
use crate::lighting::pipeline::LightingPipeline;
use crate::render::buffer::{CameraBuffer, ChunkBuffer};
use crate::render::context::GpuContext;
use crate::render::pipeline::{GpuLighting, RaymarchPipeline};
use crate::render::shader::ShaderLibrary;
use crate::voxel::{Chunk, SceneParams};

/// Everything the GPU needs to draw a frame
pub struct VoxelRenderer {
    driver: FrameDriver<GpuLighting>,
    camera_buffer: CameraBuffer,
    raymarch: RaymarchPipeline,
}

impl VoxelRenderer {
    /// Generate the scene, compile shaders and build both pipelines.
    /// Any failure here is fatal and happens before the first frame.
    pub fn new(gpu: &GpuContext, config: &AppConfig) -> Result<Self> {
        let grid = config.grid;
        grid.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("Scene {} with seed {}", config.scene, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let chunk = Chunk::generate(
            grid.chunk_size,
            config.scene,
            &SceneParams {
                emissive_rate: config.emissive_rate,
            },
            &mut rng,
        );

        let library = ShaderLibrary::new(config.shader_dir(), &grid);
        let light_program = library.compile("light_update")?;
        let raymarch_program = library.compile("raymarch")?;

        let chunk_buffer = ChunkBuffer::new(&gpu.device, &chunk)?;
        let camera_buffer = CameraBuffer::new(&gpu.device, grid.chunk_size);
        let backend = GpuLighting::new(&gpu.device, &gpu.queue, &light_program, &chunk_buffer, &grid)?;
        let raymarch = RaymarchPipeline::new(
            &gpu.device,
            gpu.format(),
            &raymarch_program,
            &chunk_buffer,
            &camera_buffer,
        )?;

        let lighting = LightingPipeline::new(grid, rng.random())?;
        let (width, height) = gpu.size();
        let controller = CameraController::new(
            config.camera.movement_speed,
            config.camera.rotate_speed,
            config.camera.rotation_mode,
        );
        let driver = FrameDriver::new(
            spawn_camera(grid.chunk_size, width, height),
            controller,
            lighting,
            backend,
        );

        Ok(Self {
            driver,
            camera_buffer,
            raymarch,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.driver.resize(width, height);
    }

    /// Run one frame. Returns `false` once the user asked to quit.
    pub fn update(&mut self, gpu: &GpuContext, input: &InputState, dt: f32) -> Result<bool> {
        if input.exit_requested() {
            return Ok(false);
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Skipped frames are not counted
                log::debug!("Surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return Ok(true);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface acquire timed out, skipping frame");
                return Ok(true);
            }
            Err(e) => return Err(Error::Gpu(e.to_string())),
        };

        let frame = self.driver.update(input, dt)?;
        self.camera_buffer.update(&gpu.queue, self.driver.camera(), &frame);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.driver.backend_mut().take_encoder()?;
        self.raymarch.render(&mut encoder, &view, &frame.barrier);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(true)
    }
}
