use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::shader::DEPTH_FORMAT;

/// The depth target rendered from the light and sampled by lit materials.
///
/// Allocated once at a fixed square resolution and cleared every frame.
pub struct ShadowMap {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    size: u32,
}

/// Rejects sizes the device cannot allocate as a 2D texture.
pub fn check_size(size: u32, max_dimension: u32) -> Result<(), RenderError> {
    if size == 0 {
        return Err(RenderError::IncompleteShadowTarget(
            "shadow map size must be non-zero".into(),
        ));
    }
    if size > max_dimension {
        return Err(RenderError::IncompleteShadowTarget(format!(
            "shadow map size {size} exceeds the device limit of {max_dimension}"
        )));
    }
    Ok(())
}

impl ShadowMap {
    pub fn new(gpu: &GpuContext, size: u32) -> Result<Self, RenderError> {
        check_size(size, gpu.device.limits().max_texture_dimension_2d)?;

        let (texture, error) = gpu.validated(|device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Shadow Map"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        });
        if let Some(error) = error {
            return Err(RenderError::IncompleteShadowTarget(error.to_string()));
        }
        if texture.format() != DEPTH_FORMAT {
            return Err(RenderError::IncompleteShadowTarget(format!(
                "expected a {DEPTH_FORMAT:?} texture, got {:?}",
                texture.format()
            )));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Map Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        log::info!("shadow map allocated at {size}x{size}");
        Ok(Self {
            texture,
            view,
            sampler,
            size,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_must_fit_device_limits() {
        assert!(check_size(2048, 8192).is_ok());
        assert!(check_size(8192, 8192).is_ok());
        assert!(matches!(
            check_size(16384, 8192),
            Err(RenderError::IncompleteShadowTarget(_))
        ));
        assert!(check_size(0, 8192).is_err());
    }
}
