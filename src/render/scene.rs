//! Rendering capabilities consumed by the sync engine.
//!
//! The scene graph, mesh and GPU texture objects belong to the host renderer.
//! The engine only sees them through these traits.

use garment_types::{DecalKind, ImageSource, Rgb};

use super::textures::TextureError;

/// The garment's base material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            roughness: 1.0,
        }
    }
}

/// Opaque id of a texture resource owned by a [`TextureLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Sampler options a texture is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureOptions {
    pub anisotropy: Option<u8>,
}

/// A texture overlay projected onto the garment mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    pub kind: DecalKind,
    pub texture: TextureHandle,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
    pub depth_test: bool,
}

/// The live garment in the host scene.
pub trait GarmentScene {
    /// Base material of the garment mesh, `None` until the asset has loaded.
    fn material_mut(&mut self) -> Option<&mut Material>;

    /// Replace the decals projected onto the mesh. Later entries draw on top.
    fn set_decals(&mut self, decals: &[Decal]);
}

/// Creates and destroys texture resources.
///
/// Every handle returned by `load` is passed back to `release` exactly once.
pub trait TextureLoader {
    fn load(
        &mut self,
        source: &ImageSource,
        options: TextureOptions,
    ) -> Result<TextureHandle, TextureError>;

    fn release(&mut self, handle: TextureHandle);
}
