use std::path::Path;

use crate::error::TextureError;
use crate::gpu::GpuContext;

/// Pixels decoded from an image file, expanded to RGBA8.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file (1, 2, 3 or 4).
    pub channels: u8,
    pub rgba: Vec<u8>,
}

/// Decodes an image file.
pub fn decode_image(path: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let channels = image.color().channel_count();
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(DecodedImage {
        width,
        height,
        channels,
        rgba: rgba.into_raw(),
    })
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    ///
    /// Surfaces tile, so the sampler repeats and filters linearly with
    /// mipmaps off.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    pub fn from_image(gpu: &GpuContext, image: &DecodedImage, label: &str) -> Self {
        Self::from_rgba(gpu, &image.rgba, image.width, image.height, label)
    }

    /// 1×1 white texture bound for untextured draws.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "Default White Texture")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_expands_to_rgba() {
        let dir = std::env::temp_dir().join("courtlight-texture-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gray.png");
        image::GrayImage::from_pixel(3, 2, image::Luma([128])).save(&path).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!((decoded.width, decoded.height, decoded.channels), (3, 2, 1));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[128, 128, 128, 255]);
    }

    #[test]
    fn decode_reports_path_on_failure() {
        let err = decode_image(Path::new("no/such/clay.jpg")).unwrap_err();
        assert!(err.to_string().contains("no/such/clay.jpg"));
    }
}
