//! Error types for GPU setup and resource loading.
//!
//! Everything that goes wrong while bringing the renderer up is a
//! [`RenderError`] and stops the application. Texture loading is the one
//! place where failure is soft: a [`TextureError`] is logged and the caller
//! receives [`TextureId::NONE`](crate::TextureId::NONE) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures raised while initializing or driving the renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter: {0}")]
    AdapterUnavailable(String),
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(String),
    #[error("failed to create window surface: {0}")]
    SurfaceCreation(String),
    #[error("failed to read shader `{}`: {source}", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader `{name}` failed to compile: {message}")]
    ShaderCompilation { name: String, message: String },
    #[error("shadow map target is incomplete: {0}")]
    IncompleteShadowTarget(String),
    #[error("surface is out of memory")]
    SurfaceOutOfMemory,
    #[error("window creation failed: {0}")]
    Window(String),
    #[error("event loop error: {0}")]
    EventLoop(String),
}

/// Failure to turn an image file into texture data.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not load texture file `{}`: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture `{}` has zero size", path.display())]
    Empty { path: PathBuf },
}
