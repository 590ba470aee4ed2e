//! Executes a [`FramePlan`] on the GPU.
//!
//! The renderer owns every GPU object the demo uses: meshes, textures, the
//! shadow map, pipelines, uniform buffers and the window depth buffer. One
//! frame is one command encoder holding the passes of
//! [`FramePlan::passes`]: the shadow depth pass when shadows are on, then the
//! colour pass.
//!
//! Per-draw uniforms for both passes are packed into a single uniform buffer
//! and selected with dynamic offsets, so the whole frame is written before
//! the encoder is submitted.

use std::num::NonZeroU64;

use crate::error::RenderError;
use crate::frame::{DrawCommand, FramePlan, PassKind, PassPlan, ScheduledPass};
use crate::gpu::GpuContext;
use crate::material::DrawUniforms;
use crate::mesh::{Geometry, Mesh};
use crate::resources::{MeshId, ResourceStore, TextureId};
use crate::shader::{BindLayouts, DEPTH_FORMAT, PipelineLibrary, ShaderSet};
use crate::shadow::ShadowMap;
use crate::texture::{DecodedImage, Texture};

/// Uniforms shared by every draw of one pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    /// Enabled flag, depth bias, map size.
    pub shadow: [f32; 4],
    /// Near and far plane of the light projection.
    pub light_planes: [f32; 4],
}

impl FrameUniforms {
    fn new(plan: &FramePlan, pass: &PassPlan) -> Self {
        let shadow = plan.shadow;
        Self {
            view_proj: pass.view_projection.to_cols_array_2d(),
            light_view_proj: plan.light_view_projection.to_cols_array_2d(),
            eye: pass.eye.extend(1.0).to_array(),
            shadow: [
                if shadow.enabled { 1.0 } else { 0.0 },
                shadow.bias,
                shadow.map_size as f32,
                0.0,
            ],
            light_planes: [shadow.depth_range.0, shadow.depth_range.1, 0.0, 0.0],
        }
    }
}

/// Rounds `size` up to the next multiple of `alignment`.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

struct FrameBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Uploaded texture plus its group 2 bind group.
struct TextureBinding {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    layouts: BindLayouts,
    pipelines: PipelineLibrary,
    shadow: ShadowMap,
    meshes: Vec<Mesh>,
    /// Index 0 is the white fallback bound for [`TextureId::NONE`].
    textures: Vec<TextureBinding>,
    color_frame: FrameBinding,
    depth_frame: FrameBinding,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,
    draw_stride: u64,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl Renderer {
    const INITIAL_DRAW_CAPACITY: usize = 256;

    /// Builds pipelines and allocates the shadow map. Every failure here is
    /// fatal.
    pub fn new(gpu: &GpuContext, shaders: &ShaderSet, shadow_map_size: u32) -> Result<Self, RenderError> {
        let device = &gpu.device;
        let layouts = BindLayouts::new(device);
        let pipelines = PipelineLibrary::new(gpu, &layouts, shaders)?;
        let shadow = ShadowMap::new(gpu, shadow_map_size)?;

        let frame_size = std::mem::size_of::<FrameUniforms>() as u64;
        let color_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Colour Frame Uniforms"),
            size: frame_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let color_frame = FrameBinding {
            bind_group: device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Colour Frame Bind Group"),
                layout: &layouts.frame,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: color_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&shadow.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                    },
                ],
            }),
            buffer: color_buffer,
        };

        let depth_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Depth Frame Uniforms"),
            size: frame_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let depth_frame = FrameBinding {
            bind_group: device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Depth Frame Bind Group"),
                layout: &layouts.depth_frame,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: depth_buffer.as_entire_binding(),
                }],
            }),
            buffer: depth_buffer,
        };

        let draw_stride = aligned_stride(
            std::mem::size_of::<DrawUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &layouts, Self::INITIAL_DRAW_CAPACITY, draw_stride);

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        let mut renderer = Self {
            layouts,
            pipelines,
            shadow,
            meshes: Vec::new(),
            textures: Vec::new(),
            color_frame,
            depth_frame,
            draw_buffer,
            draw_bind_group,
            draw_capacity: Self::INITIAL_DRAW_CAPACITY,
            draw_stride,
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        };
        let white = Texture::white(gpu);
        renderer.push_texture(gpu, white);

        log::info!("renderer ready ({} byte draw stride)", draw_stride);
        Ok(renderer)
    }

    /// A [`ResourceStore`] that uploads straight to this renderer.
    pub fn uploader<'a>(&'a mut self, gpu: &'a GpuContext) -> Uploader<'a> {
        Uploader {
            renderer: self,
            gpu,
        }
    }

    fn push_texture(&mut self, gpu: &GpuContext, texture: Texture) -> TextureId {
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Surface Texture Bind Group"),
            layout: &self.layouts.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        self.textures.push(TextureBinding {
            texture,
            bind_group,
        });
        TextureId(self.textures.len() - 1)
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layouts: &BindLayouts,
        capacity: usize,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout: &layouts.draw,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn ensure_draw_capacity(&mut self, gpu: &GpuContext, count: usize) {
        if count <= self.draw_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        log::debug!("growing draw uniform buffer to {capacity} slots");
        let (buffer, bind_group) =
            Self::create_draw_buffer(&gpu.device, &self.layouts, capacity, self.draw_stride);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreates the window depth buffer if the surface was resized.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Writes every draw's uniforms into its slot, in pass order.
    fn write_draw_uniforms(&mut self, gpu: &GpuContext, plan: &FramePlan) {
        let draws: Vec<&DrawCommand> = plan
            .passes()
            .into_iter()
            .flat_map(|pass| pass.plan.draws.iter())
            .collect();
        if draws.is_empty() {
            return;
        }
        self.ensure_draw_capacity(gpu, draws.len());

        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; draws.len() * stride];
        for (slot, draw) in bytes.chunks_exact_mut(stride).zip(&draws) {
            let uniforms = bytemuck::bytes_of(&draw.uniforms);
            slot[..uniforms.len()].copy_from_slice(uniforms);
        }
        gpu.queue.write_buffer(&self.draw_buffer, 0, &bytes);
    }

    fn draw_offset(&self, slot: usize) -> u32 {
        (slot as u64 * self.draw_stride) as u32
    }

    fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        let mesh = self.meshes.get(id.0);
        if mesh.is_none() {
            log::warn!("draw references unknown mesh {:?}", id);
        }
        mesh
    }

    /// Renders one frame. Lost or outdated surfaces are reconfigured and the
    /// frame skipped; running out of memory is fatal.
    pub fn render(&mut self, gpu: &GpuContext, plan: &FramePlan) -> Result<(), RenderError> {
        self.ensure_depth_size(gpu);

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::SurfaceOutOfMemory),
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.queue.write_buffer(
            &self.color_frame.buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(plan, &plan.color)),
        );
        if let Some(depth) = &plan.depth {
            gpu.queue.write_buffer(
                &self.depth_frame.buffer,
                0,
                bytemuck::bytes_of(&FrameUniforms::new(plan, depth)),
            );
        }
        self.write_draw_uniforms(gpu, plan);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        for pass in plan.passes() {
            match pass.kind {
                PassKind::Depth => self.depth_pass(&mut encoder, pass),
                PassKind::Color => self.color_pass(&mut encoder, &view, plan.clear_color, pass),
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Renders the casters into the shadow map from the light.
    fn depth_pass(&self, encoder: &mut wgpu::CommandEncoder, scheduled: ScheduledPass<'_>) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let size = self.shadow.size() as f32;
        pass.set_viewport(0.0, 0.0, size, size, 0.0, 1.0);
        pass.set_bind_group(0, &self.depth_frame.bind_group, &[]);

        for (index, draw) in scheduled.plan.draws.iter().enumerate() {
            let (Some(pipeline), Some(mesh)) = (self.pipelines.depth(draw.topology), self.mesh(draw.mesh))
            else {
                continue;
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &self.draw_bind_group, &[self.draw_offset(scheduled.first_slot + index)]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.draw(0..draw.vertex_count, 0..1);
        }
    }

    fn color_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear_color: wgpu::Color,
        scheduled: ScheduledPass<'_>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Colour Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_bind_group(0, &self.color_frame.bind_group, &[]);

        for (index, draw) in scheduled.plan.draws.iter().enumerate() {
            let Some(pipeline) = self.pipelines.color(draw.shader, draw.topology) else {
                log::debug!("no colour pipeline for {:?}, skipping draw", draw.shader);
                continue;
            };
            let Some(mesh) = self.mesh(draw.mesh) else {
                continue;
            };
            let texture = self
                .textures
                .get(draw.texture.0)
                .unwrap_or(&self.textures[TextureId::NONE.0]);

            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &self.draw_bind_group, &[self.draw_offset(scheduled.first_slot + index)]);
            pass.set_bind_group(2, &texture.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.draw(0..draw.vertex_count, 0..1);
        }
    }
}

/// Uploads geometry and textures into a [`Renderer`].
pub struct Uploader<'a> {
    renderer: &'a mut Renderer,
    gpu: &'a GpuContext,
}

impl ResourceStore for Uploader<'_> {
    fn add_mesh(&mut self, label: &str, geometry: &Geometry) -> MeshId {
        self.renderer.meshes.push(Mesh::new(self.gpu, geometry, label));
        MeshId(self.renderer.meshes.len() - 1)
    }

    fn add_texture(&mut self, label: &str, image: &DecodedImage) -> TextureId {
        let texture = Texture::from_image(self.gpu, image, label);
        self.renderer.push_texture(self.gpu, texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_slots_respect_offset_alignment() {
        let size = std::mem::size_of::<DrawUniforms>() as u64;
        assert_eq!(aligned_stride(size, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(size, 64) % 64, 0);
        assert!(aligned_stride(size, 64) >= size);
    }

    #[test]
    fn frame_uniforms_fill_whole_slots() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
    }
}
