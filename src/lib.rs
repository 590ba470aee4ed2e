//! # Courtlight
//!
//! **A tennis court rendered from cubes, spheres and lines, lit by a single
//! moving light that casts real-time shadows.**
//!
//! Three players, each a racket-shaped hierarchy of scaled cubes holding a
//! letter and a ball, stand on a clay court beside a net. Every frame is
//! drawn twice: once from the light into a depth texture, then from the
//! camera with that depth texture deciding what is in shadow.
//!
//! ## Quick Start
//!
//! ```no_run
//! use courtlight::{AppConfig, init_logging, run};
//!
//! let config = AppConfig::new().size(1600, 900);
//! init_logging(config.logging.clone());
//! run(config).unwrap();
//! ```
//!
//! ## Layout
//!
//! - [`Scene`] owns all state and turns it into a [`FramePlan`] with no GPU
//!   access, so scene logic tests run headless through [`HeadlessStore`].
//! - [`Renderer`] executes plans: shadow depth pass, then colour pass.
//! - [`collect_intents`] maps keyboard and mouse state to [`Intent`]s that
//!   the scene applies.

mod app;
mod camera;
mod characters;
mod config;
mod controls;
mod error;
mod frame;
mod gpu;
mod hierarchy;
mod input;
mod light;
mod logging;
mod material;
mod mesh;
mod renderer;
mod resources;
mod scene;
mod shader;
mod shadow;
mod texture;
mod transform;
mod visual;

pub use app::run;
pub use camera::{Camera, CameraConfig, CameraMove};
pub use characters::{DEFAULT_ARM_ROTATION, Player, RacketRig, net, slot};
pub use config::AppConfig;
pub use controls::{Intent, collect_intents};
pub use error::{RenderError, TextureError};
pub use frame::{DrawCommand, FramePlan, PassKind, PassPlan, ScheduledPass, ShadowSettings, Topology};
pub use gpu::GpuContext;
pub use hierarchy::{CompositeBuilder, NodeId, PartDraw, PartShape, PartTopology, PartTree, Segment};
pub use input::Input;
pub use light::{Light, LightConfig, LightParams};
pub use logging::{LoggingConfig, init_logging};
pub use material::{DrawUniforms, Material, ShaderKind};
pub use mesh::{Geometry, Mesh, Vertex3d};
pub use renderer::{Renderer, Uploader};
pub use resources::{HeadlessStore, MeshId, ResourceStore, TextureId, load_texture};
pub use scene::{Racket, Scene, SceneState};
pub use shader::{ShaderSet, ShaderSource};
pub use shadow::ShadowMap;
pub use texture::{DecodedImage, Texture, decode_image};
pub use transform::{Transform, TransformChain, rotate_degrees};
pub use visual::{PartShapes, VisualObject, draw_composite};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
