//! MaterialSyncEngine - per-frame bridge from RenderState to the live scene.
//!
//! Call [`MaterialSyncEngine::tick`] once per rendered frame. Each tick:
//!
//! 1. damps the garment material color toward `base_color` (skipped while the
//!    material is not loaded yet);
//! 2. derives the decal list from the enable flags (full texture first, logo
//!    on top), loading textures on demand and releasing the ones no overlay
//!    uses any more;
//! 3. pushes the decal list to the scene if it differs from the last push.
//!
//! Nothing in a tick fails: an image that does not load simply has no
//! overlay.

use garment_types::{DecalKind, Rgb};

use super::damping::{ColorDamper, DampConfig};
use super::scene::{Decal, GarmentScene, TextureLoader, TextureOptions};
use super::settings::RenderSettings;
use super::store::{RenderState, RenderStateStore, RenderStateWatcher};
use super::textures::{TextureCache, TextureKey};

/// What the garment looks like after a tick. Derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialView {
    /// Current (interpolated) material color, `None` while the material is absent.
    pub color: Option<Rgb>,
    /// Active overlays in draw order.
    pub decals: Vec<Decal>,
}

pub struct MaterialSyncEngine {
    watcher: RenderStateWatcher,
    state: RenderState,
    loader: Box<dyn TextureLoader>,
    textures: TextureCache,
    damper: ColorDamper,
    settings: RenderSettings,
    applied: Option<Vec<Decal>>,
}

impl MaterialSyncEngine {
    pub fn new(
        store: &RenderStateStore,
        loader: Box<dyn TextureLoader>,
        settings: RenderSettings,
    ) -> Self {
        let damper = ColorDamper::new(DampConfig {
            smooth_time: settings.color_smooth_time,
            epsilon: settings.color_snap_epsilon,
        });
        let watcher = store.subscribe();
        let state = watcher.borrow().state.clone();
        Self {
            watcher,
            state,
            loader,
            textures: TextureCache::new(),
            damper,
            settings,
            applied: None,
        }
    }

    /// Advance one frame. `dt` is the frame delta in seconds.
    pub fn tick(&mut self, scene: &mut dyn GarmentScene, dt: f32) -> MaterialView {
        self.refresh_state();

        let color = self.sync_color(scene, dt);
        let decals = self.compose_decals();

        if self.applied.as_deref() != Some(decals.as_slice()) {
            tracing::debug!(count = decals.len(), "Applying garment decals");
            scene.set_decals(&decals);
            self.applied = Some(decals.clone());
        }

        MaterialView { color, decals }
    }

    /// Number of texture resources held for active overlays.
    pub fn live_textures(&self) -> usize {
        self.textures.live_count()
    }

    fn refresh_state(&mut self) {
        // Sender gone means the session is over; keep rendering the last state
        if self.watcher.has_changed().unwrap_or(false) {
            self.state = self.watcher.borrow_and_update().state.clone();
        }
    }

    fn sync_color(&mut self, scene: &mut dyn GarmentScene, dt: f32) -> Option<Rgb> {
        let material = scene.material_mut()?;
        material.roughness = self.settings.material_roughness;
        material.color = self
            .damper
            .step(material.color, self.state.base_color, dt);
        Some(material.color)
    }

    fn wanted_key(&self, kind: DecalKind) -> Option<TextureKey> {
        if !self.state.is_enabled(kind) {
            return None;
        }
        let source = self.state.texture(kind)?;
        let options = TextureOptions {
            anisotropy: self.settings.placement(kind).anisotropy,
        };
        Some(TextureKey::new(source.clone(), options))
    }

    fn compose_decals(&mut self) -> Vec<Decal> {
        let layers: Vec<(DecalKind, TextureKey)> = [DecalKind::Full, DecalKind::Logo]
            .into_iter()
            .filter_map(|kind| self.wanted_key(kind).map(|key| (kind, key)))
            .collect();

        let wanted: Vec<TextureKey> = layers.iter().map(|(_, key)| key.clone()).collect();
        self.textures.retain(self.loader.as_mut(), &wanted);

        let mut decals = Vec::with_capacity(layers.len());
        for (kind, key) in &layers {
            let Some(texture) = self.textures.resolve(self.loader.as_mut(), key) else {
                continue;
            };
            let placement = self.settings.placement(*kind);
            decals.push(Decal {
                kind: *kind,
                texture,
                position: placement.position,
                rotation: placement.rotation,
                scale: placement.scale,
                depth_test: placement.depth_test,
            });
        }
        decals
    }
}

impl Drop for MaterialSyncEngine {
    fn drop(&mut self) {
        self.textures.release_all(self.loader.as_mut());
    }
}
