//! Handles to uploaded geometry and textures, and the store that hands them out.
//!
//! The scene never touches GPU objects directly. It asks a [`ResourceStore`]
//! to keep a piece of geometry or an image and gets back a [`MeshId`] or
//! [`TextureId`]. The renderer's uploader implements the trait against the
//! device; [`HeadlessStore`] keeps everything on the CPU so frames can be
//! planned without a window.

use std::path::Path;

use crate::mesh::Geometry;
use crate::texture::{DecodedImage, decode_image};

/// Type-safe handle to an uploaded mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Type-safe handle to an uploaded texture.
///
/// [`TextureId::NONE`] is the sentinel returned when loading fails; the
/// renderer binds a 1×1 white texture for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub(crate) usize);

impl TextureId {
    pub const NONE: TextureId = TextureId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Somewhere meshes and textures can be registered.
pub trait ResourceStore {
    fn add_mesh(&mut self, label: &str, geometry: &Geometry) -> MeshId;

    /// Stores decoded pixels. Never returns [`TextureId::NONE`].
    fn add_texture(&mut self, label: &str, image: &DecodedImage) -> TextureId;
}

/// Decodes `path` and registers it, or logs the failure and returns
/// [`TextureId::NONE`] without touching the store.
pub fn load_texture(store: &mut impl ResourceStore, path: impl AsRef<Path>) -> TextureId {
    let path = path.as_ref();
    match decode_image(path) {
        Ok(image) => {
            log::info!(
                "loaded texture {} ({}x{}, {} channels)",
                path.display(),
                image.width,
                image.height,
                image.channels
            );
            store.add_texture(&path.display().to_string(), &image)
        }
        Err(err) => {
            log::error!("{err}");
            TextureId::NONE
        }
    }
}

/// CPU-side store that records what was registered.
#[derive(Debug, Default)]
pub struct HeadlessStore {
    /// Label and vertex count of every mesh.
    pub meshes: Vec<(String, u32)>,
    /// Label and size of every texture.
    pub textures: Vec<(String, u32, u32)>,
}

impl HeadlessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceStore for HeadlessStore {
    fn add_mesh(&mut self, label: &str, geometry: &Geometry) -> MeshId {
        self.meshes.push((label.to_string(), geometry.vertex_count()));
        MeshId(self.meshes.len() - 1)
    }

    fn add_texture(&mut self, label: &str, image: &DecodedImage) -> TextureId {
        self.textures
            .push((label.to_string(), image.width, image.height));
        // Slot 0 is reserved for the sentinel.
        TextureId(self.textures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_returns_sentinel() {
        let mut store = HeadlessStore::new();
        let id = load_texture(&mut store, "definitely/not/here.jpg");
        assert!(id.is_none());
        assert!(store.textures.is_empty());
    }

    #[test]
    fn stored_textures_are_never_the_sentinel() {
        let mut store = HeadlessStore::new();
        let image = DecodedImage {
            width: 1,
            height: 1,
            channels: 4,
            rgba: vec![255; 4],
        };
        let id = store.add_texture("white", &image);
        assert!(!id.is_none());
        assert_eq!(store.textures, vec![("white".to_string(), 1, 1)]);
    }

    #[test]
    fn meshes_get_sequential_ids() {
        let mut store = HeadlessStore::new();
        let a = store.add_mesh("a", &Geometry::line(glam::Vec3::ZERO, glam::Vec3::X));
        let b = store.add_mesh("b", &Geometry::line(glam::Vec3::ZERO, glam::Vec3::Y));
        assert_ne!(a, b);
        assert_eq!(store.meshes[b.0], ("b".to_string(), 2));
    }
}
