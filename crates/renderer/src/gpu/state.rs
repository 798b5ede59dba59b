use anyhow::{anyhow, Result};
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::frame::{FrameCommands, UniformWrite};
use crate::geometry::CubeMesh;
use crate::program::Program;

use super::context::GpuContext;
use super::pipeline::CubePipeline;
use super::uniforms::UniformStaging;

/// GPU resources for the lifetime of the window.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: CubePipeline,
    vertex_buffer: wgpu::Buffer,
    position_range: (u64, u64),
    color_range: (u64, u64),
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: UniformStaging,
}

impl GpuState {
    /// Uploads `mesh` and builds the pipeline for `program`.
    pub fn new(context: GpuContext, program: &Program, mesh: &CubeMesh) -> Result<Self> {
        let block = program
            .uniform_block(0, 0)
            .ok_or_else(|| anyhow!("program declares no uniform block at group 0 binding 0"))?;
        let pipeline = CubePipeline::new(&context.device, program, block, context.surface_format)?;

        let vertex_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube vertices"),
                contents: mesh.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let position_range = (mesh.position_offset(), mesh.color_offset());
        let color_range = (mesh.color_offset(), mesh.byte_len());

        let uniforms = UniformStaging::for_block(block);
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("projection uniforms"),
            size: uniforms.len(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("projection bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: block.binding,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        debug!(
            vertex_bytes = mesh.byte_len(),
            color_offset = mesh.color_offset(),
            uniform_bytes = uniforms.len(),
            "uploaded cube geometry"
        );

        Ok(Self {
            context,
            pipeline,
            vertex_buffer,
            position_range,
            color_range,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
        })
    }

    /// Records uniform writes; they reach the GPU with the next frame.
    pub fn write_uniforms(&mut self, writes: &[UniformWrite]) {
        for write in writes {
            self.uniforms.apply(write);
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Re-applies the current surface configuration after a lost or outdated
    /// surface.
    pub fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Clears, draws and presents one frame.
    pub fn render(&mut self, commands: &FrameCommands) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(&commands.uniforms);
        if let Some(bytes) = self.uniforms.take_dirty() {
            self.context
                .queue
                .write_buffer(&self.uniform_buffer, 0, bytes);
        }

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(commands.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // The viewport must stay inside the attachment; a resize to zero
            // leaves the surface at its previous size.
            let width = commands.viewport.width.min(self.context.config.width);
            let height = commands.viewport.height.min(self.context.config.height);
            let x = commands.viewport.x.min(self.context.config.width - width);
            let y = commands.viewport.y.min(self.context.config.height - height);
            if width > 0 && height > 0 {
                render_pass.set_viewport(
                    x as f32,
                    y as f32,
                    width as f32,
                    height as f32,
                    0.0,
                    1.0,
                );
                render_pass.set_pipeline(&self.pipeline.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                let (start, end) = self.position_range;
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(start..end));
                let (start, end) = self.color_range;
                render_pass.set_vertex_buffer(1, self.vertex_buffer.slice(start..end));
                let first = commands.draw.first_vertex;
                render_pass.draw(first..first + commands.draw.vertex_count, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Releases the buffers and pipeline, then the device and surface.
    pub fn destroy(self) {
        let Self {
            context,
            pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            ..
        } = self;
        drop(uniform_bind_group);
        vertex_buffer.destroy();
        uniform_buffer.destroy();
        drop(pipeline);
        drop(context);
        debug!("gpu resources released");
    }
}
