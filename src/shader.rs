//! Shader sources, bind group layouts and the pipelines built from them.
//!
//! Every program shares one bind group scheme:
//! - **Group 0**: frame uniforms, plus the shadow map and its comparison
//!   sampler in the colour pass
//! - **Group 1**: per-draw uniforms at a dynamic offset
//! - **Group 2**: surface texture and sampler (colour pass only)
//!
//! One pipeline exists per colour [`ShaderKind`] and [`Topology`], and one
//! depth-only pipeline per topology for the shadow pass.

use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::path::PathBuf;

use crate::error::RenderError;
use crate::frame::Topology;
use crate::gpu::GpuContext;
use crate::material::{DrawUniforms, ShaderKind};
use crate::mesh::Vertex3d;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Where a program's WGSL comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderSource {
    /// Compiled into the binary.
    Embedded(&'static str),
    /// Read from disk at startup.
    Path(PathBuf),
}

impl ShaderSource {
    pub fn builtin(kind: ShaderKind) -> Self {
        ShaderSource::Embedded(match kind {
            ShaderKind::Lit => include_str!("shaders/lit.wgsl"),
            ShaderKind::Unlit => include_str!("shaders/unlit.wgsl"),
            ShaderKind::Grid => include_str!("shaders/grid.wgsl"),
            ShaderKind::Screen => include_str!("shaders/screen.wgsl"),
            ShaderKind::ShadowMapper => include_str!("shaders/shadow_mapper.wgsl"),
        })
    }

    pub fn load(&self) -> Result<Cow<'static, str>, RenderError> {
        match self {
            ShaderSource::Embedded(source) => Ok(Cow::Borrowed(source)),
            ShaderSource::Path(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| RenderError::ShaderRead {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// The source used for each program. Defaults to the embedded WGSL.
#[derive(Clone, Debug)]
pub struct ShaderSet {
    sources: HashMap<ShaderKind, ShaderSource>,
}

impl Default for ShaderSet {
    fn default() -> Self {
        let sources = ShaderKind::COLOR
            .into_iter()
            .chain([ShaderKind::ShadowMapper])
            .map(|kind| (kind, ShaderSource::builtin(kind)))
            .collect();
        Self { sources }
    }
}

impl ShaderSet {
    /// Replaces one program's source.
    pub fn with_source(mut self, kind: ShaderKind, source: ShaderSource) -> Self {
        self.sources.insert(kind, source);
        self
    }

    pub fn source(&self, kind: ShaderKind) -> ShaderSource {
        self.sources
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ShaderSource::builtin(kind))
    }
}

/// Compiles WGSL, turning validation errors into [`RenderError::ShaderCompilation`].
pub fn compile(gpu: &GpuContext, name: &str, source: &str) -> Result<wgpu::ShaderModule, RenderError> {
    let (module, error) = gpu.validated(|device| {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });
    match error {
        Some(error) => Err(RenderError::ShaderCompilation {
            name: name.to_string(),
            message: error.to_string(),
        }),
        None => Ok(module),
    }
}

fn uniform_entry(binding: u32, dynamic: bool, size: Option<NonZeroU64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: size,
        },
        count: None,
    }
}

/// Bind group layouts shared by all pipelines.
pub struct BindLayouts {
    /// Frame uniforms, shadow map and comparison sampler.
    pub frame: wgpu::BindGroupLayout,
    /// Frame uniforms alone, for the depth pass.
    pub depth_frame: wgpu::BindGroupLayout,
    pub draw: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
}

impl BindLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                uniform_entry(0, false, None),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let depth_frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Depth Frame Bind Group Layout"),
            entries: &[uniform_entry(0, false, None)],
        });

        let draw = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                true,
                NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
            )],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            frame,
            depth_frame,
            draw,
            texture,
        }
    }
}

/// Depth bias for triangle casters in the shadow pass. Lines and points
/// must render without bias.
fn depth_bias(topology: Topology) -> wgpu::DepthBiasState {
    if topology.is_triangles() {
        wgpu::DepthBiasState {
            constant: 2,
            slope_scale: 2.0,
            clamp: 0.0,
        }
    } else {
        wgpu::DepthBiasState::default()
    }
}

fn primitive(topology: Topology) -> wgpu::PrimitiveState {
    // Courts, nets and rackets are seen from both sides.
    wgpu::PrimitiveState {
        topology: topology.to_wgpu(),
        cull_mode: None,
        front_face: wgpu::FrontFace::Ccw,
        ..Default::default()
    }
}

/// Every render pipeline the renderer can bind.
pub struct PipelineLibrary {
    color: HashMap<(ShaderKind, Topology), wgpu::RenderPipeline>,
    depth: HashMap<Topology, wgpu::RenderPipeline>,
}

impl PipelineLibrary {
    pub fn new(gpu: &GpuContext, layouts: &BindLayouts, shaders: &ShaderSet) -> Result<Self, RenderError> {
        let device = &gpu.device;

        let color_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Colour Pipeline Layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.draw, &layouts.texture],
            push_constant_ranges: &[],
        });
        let depth_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Pipeline Layout"),
            bind_group_layouts: &[&layouts.depth_frame, &layouts.draw],
            push_constant_ranges: &[],
        });

        let mut color = HashMap::new();
        for kind in ShaderKind::COLOR {
            let source = shaders.source(kind).load()?;
            let module = compile(gpu, kind.name(), &source)?;
            for topology in Topology::ALL {
                let pipeline = Self::color_pipeline(gpu, &color_layout, &module, kind, topology)?;
                color.insert((kind, topology), pipeline);
            }
        }

        let kind = ShaderKind::ShadowMapper;
        let source = shaders.source(kind).load()?;
        let module = compile(gpu, kind.name(), &source)?;
        let mut depth = HashMap::new();
        for topology in Topology::ALL {
            depth.insert(topology, Self::depth_pipeline(gpu, &depth_layout, &module, topology)?);
        }

        log::debug!(
            "built {} colour and {} depth pipelines",
            color.len(),
            depth.len()
        );
        Ok(Self { color, depth })
    }

    fn color_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        module: &wgpu::ShaderModule,
        kind: ShaderKind,
        topology: Topology,
    ) -> Result<wgpu::RenderPipeline, RenderError> {
        let label = format!("{} {:?} Pipeline", kind.name(), topology);
        let (pipeline, error) = gpu.validated(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: primitive(topology),
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });
        match error {
            Some(error) => Err(RenderError::ShaderCompilation {
                name: label,
                message: error.to_string(),
            }),
            None => Ok(pipeline),
        }
    }

    fn depth_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        module: &wgpu::ShaderModule,
        topology: Topology,
    ) -> Result<wgpu::RenderPipeline, RenderError> {
        let label = format!("shadow_mapper {:?} Pipeline", topology);
        let (pipeline, error) = gpu.validated(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: primitive(topology),
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: depth_bias(topology),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });
        match error {
            Some(error) => Err(RenderError::ShaderCompilation {
                name: label,
                message: error.to_string(),
            }),
            None => Ok(pipeline),
        }
    }

    pub fn color(&self, kind: ShaderKind, topology: Topology) -> Option<&wgpu::RenderPipeline> {
        self.color.get(&(kind, topology))
    }

    pub fn depth(&self, topology: Topology) -> Option<&wgpu::RenderPipeline> {
        self.depth.get(&topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_has_an_embedded_source() {
        let set = ShaderSet::default();
        for kind in ShaderKind::COLOR.into_iter().chain([ShaderKind::ShadowMapper]) {
            let source = set.source(kind).load().unwrap();
            assert!(source.contains("fn vs"), "{} has no vertex entry", kind.name());
        }
        let depth = set.source(ShaderKind::ShadowMapper).load().unwrap();
        assert!(!depth.contains("@fragment"));
    }

    #[test]
    fn missing_shader_file_is_a_read_error() {
        let set = ShaderSet::default().with_source(
            ShaderKind::Lit,
            ShaderSource::Path(PathBuf::from("shaders/does_not_exist.wgsl")),
        );
        let err = set.source(ShaderKind::Lit).load().unwrap_err();
        assert!(matches!(err, RenderError::ShaderRead { .. }));
        assert!(err.to_string().contains("does_not_exist.wgsl"));
    }

    #[test]
    fn only_triangles_get_depth_bias() {
        assert_ne!(depth_bias(Topology::Triangles), wgpu::DepthBiasState::default());
        for topology in [Topology::Points, Topology::Lines, Topology::LineStrip] {
            assert_eq!(depth_bias(topology), wgpu::DepthBiasState::default());
        }
    }
}
