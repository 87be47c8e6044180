//! Render-state synchronization
//!
//! [`RenderStateStore`] holds what the user picked; [`MaterialSyncEngine`]
//! turns it into material color and decal overlays on the live garment,
//! one frame at a time.

pub mod damping;
pub mod scene;
pub mod settings;
pub mod store;
pub mod sync;
pub mod textures;

pub use damping::{ColorDamper, DampConfig};
pub use scene::{Decal, GarmentScene, Material, TextureHandle, TextureLoader, TextureOptions};
pub use settings::{DecalPlacement, RenderSettings};
pub use store::{
    RenderSnapshot, RenderState, RenderStatePatch, RenderStateStore, RenderStateWatcher,
};
pub use sync::{MaterialSyncEngine, MaterialView};
pub use textures::{DataUrlTextureLoader, Texture, TextureCache, TextureError, TextureKey};
