use std::path::PathBuf;

use crate::camera::CameraConfig;
use crate::light::LightConfig;
use crate::logging::LoggingConfig;
use crate::material::ShaderKind;
use crate::shader::{ShaderSet, ShaderSource};

/// Startup configuration for the demo window and scene.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
    pub ground_texture: PathBuf,
    pub ball_texture: PathBuf,
    /// Depth offset used when comparing against the shadow map.
    pub shadow_bias: f32,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub shaders: ShaderSet,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Courtlight".to_string(),
            width: 1280,
            height: 720,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            ground_texture: PathBuf::from("assets/clay_texture.jpg"),
            ball_texture: PathBuf::from("assets/fuzz.jpg"),
            shadow_bias: 0.005,
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            shaders: ShaderSet::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Square resolution of the shadow map, fixed for the lifetime of the
    /// renderer.
    pub fn shadow_map_size(mut self, size: u32) -> Self {
        self.light.shadow_map_size = size;
        self
    }

    pub fn shadow_bias(mut self, bias: f32) -> Self {
        self.shadow_bias = bias;
        self
    }

    pub fn textures(mut self, ground: impl Into<PathBuf>, ball: impl Into<PathBuf>) -> Self {
        self.ground_texture = ground.into();
        self.ball_texture = ball.into();
        self
    }

    pub fn camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn light(mut self, light: LightConfig) -> Self {
        self.light = light;
        self
    }

    /// Loads one program from disk instead of the embedded WGSL.
    pub fn shader_path(mut self, kind: ShaderKind, path: impl Into<PathBuf>) -> Self {
        self.shaders = self.shaders.with_source(kind, ShaderSource::Path(path.into()));
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
