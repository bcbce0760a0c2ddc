//! Light propagation compute pipeline

use crate::core::error::Error;
use crate::core::types::Result;
use crate::lighting::backend::LightingBackend;
use crate::lighting::directions::{DirectionPool, PackedDirection};
use crate::lighting::grid::GridConfig;
use crate::lighting::state::LightParams;
use crate::render::buffer::ChunkBuffer;
use crate::render::shader::ShaderProgram;
use crate::voxel::Voxel;

/// wgpu backend for the lighting state machine.
///
/// `dispatch` opens a compute pass on the frame's command encoder and
/// `barrier` ends it. The render pass is then recorded into the same encoder
/// (see [`GpuLighting::take_encoder`]), after the compute pass has closed.
pub struct GpuLighting {
    // Dropped before `encoder`
    pass: Option<wgpu::ComputePass<'static>>,
    encoder: Option<wgpu::CommandEncoder>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    directions_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    direction_count: u32,
    group_count: u32,
}

impl GpuLighting {
    /// Create the compute pipeline over an uploaded chunk
    ///
    /// # Arguments
    /// * `program` - Compiled `light_update` program
    /// * `chunk` - Chunk storage buffer, rewritten in place every frame
    /// * `grid` - Dispatch grid the program was compiled against
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        program: &ShaderProgram,
        chunk: &ChunkBuffer,
        grid: &GridConfig,
    ) -> Result<Self> {
        grid.validate()?;
        program.expect_workgroup_size("main", [grid.workgroup_size; 3])?;
        program.expect_struct_layout("Voxel", size_of::<Voxel>(), &Voxel::GPU_MEMBERS)?;
        program.expect_struct_layout("LightParams", size_of::<LightParams>(), &LightParams::GPU_MEMBERS)?;
        if chunk.size() != grid.chunk_size {
            return Err(Error::Layout(format!(
                "chunk buffer is {}³ but the grid dispatches {}³",
                chunk.size(),
                grid.chunk_size
            )));
        }

        let shader = program.create_module(device);

        let directions_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light_directions"),
            size: (grid.direction_count as usize * std::mem::size_of::<PackedDirection>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light_params"),
            size: std::mem::size_of::<LightParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light_update_layout"),
            entries: &[
                // Voxels
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Direction pool
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Frame params
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light_update_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: chunk.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: directions_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("light_update_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("light_update_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            pass: None,
            encoder: None,
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            bind_group,
            directions_buffer,
            params_buffer,
            direction_count: grid.direction_count,
            group_count: grid.group_count(),
        })
    }

    /// Hand over the frame's encoder once the compute pass has ended
    pub fn take_encoder(&mut self) -> Result<wgpu::CommandEncoder> {
        if self.pass.is_some() {
            return Err(Error::Pipeline("compute pass still open, barrier missing".into()));
        }
        self.encoder
            .take()
            .ok_or_else(|| Error::Pipeline("no lighting work recorded this frame".into()))
    }
}

impl LightingBackend for GpuLighting {
    fn write_directions(&mut self, pool: &DirectionPool) -> Result<()> {
        if pool.len() != self.direction_count as usize {
            return Err(Error::Layout(format!(
                "direction pool has {} entries, buffer holds {}",
                pool.len(),
                self.direction_count
            )));
        }
        self.queue.write_buffer(&self.directions_buffer, 0, pool.as_bytes());
        Ok(())
    }

    fn dispatch(&mut self, params: &LightParams) -> Result<()> {
        if self.pass.is_some() {
            return Err(Error::Pipeline("previous compute pass was never ended".into()));
        }
        self.queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        let device = &self.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            })
        });

        let mut pass = encoder
            .begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("light_update_pass"),
                timestamp_writes: None,
            })
            .forget_lifetime();
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        // One invocation per voxel (matching the shader's @workgroup_size)
        pass.dispatch_workgroups(self.group_count, self.group_count, self.group_count);
        self.pass = Some(pass);
        Ok(())
    }

    fn barrier(&mut self) -> Result<()> {
        // Ending the pass orders its storage writes before later passes
        match self.pass.take() {
            Some(pass) => {
                drop(pass);
                Ok(())
            }
            None => Err(Error::Pipeline("barrier without an open compute pass".into())),
        }
    }
}
