//! RenderStateStore - the garment configuration shared by UI and renderer.
//!
//! A single mutable [`RenderState`] behind a `tokio::sync::watch` channel.
//! UI handlers mutate it through [`RenderStateStore::set`] with a partial
//! [`RenderStatePatch`]; the material sync engine (and anything else) holds a
//! [`RenderStateWatcher`] and reads the latest snapshot each frame.
//!
//! ## Notification contract
//!
//! - `set` merges the patch and notifies subscribers before it returns.
//! - A patch that leaves the state structurally equal is dropped: no
//!   notification, no revision bump.
//! - Writers are serialized by the channel's lock, so clones of the store may
//!   be mutated from several threads.

use garment_types::{DecalKind, ImageSource, Rgb};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Default garment color.
pub const DEFAULT_BASE_COLOR: &str = "#EFBD48";

/// Scene configuration for the garment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub base_color: Rgb,
    pub full_texture: Option<ImageSource>,
    pub logo_texture: Option<ImageSource>,
    pub full_texture_enabled: bool,
    pub logo_texture_enabled: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            base_color: Rgb::from_u8(0xEF, 0xBD, 0x48),
            full_texture: None,
            logo_texture: None,
            full_texture_enabled: false,
            logo_texture_enabled: false,
        }
    }
}

impl RenderState {
    pub fn texture(&self, kind: DecalKind) -> Option<&ImageSource> {
        match kind {
            DecalKind::Full => self.full_texture.as_ref(),
            DecalKind::Logo => self.logo_texture.as_ref(),
        }
    }

    pub fn is_enabled(&self, kind: DecalKind) -> bool {
        match kind {
            DecalKind::Full => self.full_texture_enabled,
            DecalKind::Logo => self.logo_texture_enabled,
        }
    }
}

// =============================================================================
// PATCH
// =============================================================================

/// Distinguishes an explicit `null` (clear) from an absent field (keep).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial update of a [`RenderState`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<Rgb>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_texture: Option<Option<ImageSource>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub logo_texture: Option<Option<ImageSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_texture_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_texture_enabled: Option<bool>,
}

impl RenderStatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_color(mut self, color: Rgb) -> Self {
        self.base_color = Some(color);
        self
    }

    /// Set (or clear with `None`) the image of one decal slot.
    pub fn texture(mut self, kind: DecalKind, source: Option<ImageSource>) -> Self {
        match kind {
            DecalKind::Full => self.full_texture = Some(source),
            DecalKind::Logo => self.logo_texture = Some(source),
        }
        self
    }

    pub fn enabled(mut self, kind: DecalKind, enabled: bool) -> Self {
        match kind {
            DecalKind::Full => self.full_texture_enabled = Some(enabled),
            DecalKind::Logo => self.logo_texture_enabled = Some(enabled),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, state: &mut RenderState) {
        if let Some(color) = self.base_color {
            state.base_color = color;
        }
        if let Some(full) = &self.full_texture {
            state.full_texture = full.clone();
        }
        if let Some(logo) = &self.logo_texture {
            state.logo_texture = logo.clone();
        }
        if let Some(enabled) = self.full_texture_enabled {
            state.full_texture_enabled = enabled;
        }
        if let Some(enabled) = self.logo_texture_enabled {
            state.logo_texture_enabled = enabled;
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Value carried by the watch channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    /// Incremented on every change that altered the state.
    pub revision: u64,
    pub state: RenderState,
}

/// Subscriber handle - yields a new snapshot on every change.
pub type RenderStateWatcher = watch::Receiver<RenderSnapshot>;

/// Shared, observable garment state. Clones share the same state.
#[derive(Debug, Clone)]
pub struct RenderStateStore {
    sender: Arc<watch::Sender<RenderSnapshot>>,
}

impl Default for RenderStateStore {
    fn default() -> Self {
        Self::new(RenderState::default())
    }
}

impl RenderStateStore {
    pub fn new(initial: RenderState) -> Self {
        let (sender, _rx) = watch::channel(RenderSnapshot {
            revision: 0,
            state: initial,
        });
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Immutable copy of the current state.
    pub fn get(&self) -> RenderState {
        self.sender.borrow().state.clone()
    }

    pub fn revision(&self) -> u64 {
        self.sender.borrow().revision
    }

    /// Merge `patch` into the state and notify subscribers.
    ///
    /// Returns `false` (and notifies nobody) when the merged state equals the
    /// current one.
    pub fn set(&self, patch: RenderStatePatch) -> bool {
        self.update(|state| patch.apply_to(state))
    }

    /// Mutate the state with a callback. Same suppression rule as [`set`].
    ///
    /// [`set`]: RenderStateStore::set
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut RenderState),
    {
        let mut revision = 0;
        let changed = self.sender.send_if_modified(|snapshot| {
            let mut next = snapshot.state.clone();
            f(&mut next);
            if next == snapshot.state {
                return false;
            }
            snapshot.state = next;
            snapshot.revision += 1;
            revision = snapshot.revision;
            true
        });

        if changed {
            debug!(revision, "Render state changed");
        }
        changed
    }

    /// Flip one decal's enable flag.
    pub fn toggle(&self, kind: DecalKind) -> bool {
        self.update(|state| match kind {
            DecalKind::Full => state.full_texture_enabled = !state.full_texture_enabled,
            DecalKind::Logo => state.logo_texture_enabled = !state.logo_texture_enabled,
        })
    }

    /// Install a generated PNG (base64, as returned by the generation API) as
    /// the image of `kind` and switch that decal on.
    pub fn apply_generated(&self, kind: DecalKind, photo_base64: &str) -> bool {
        self.set(
            RenderStatePatch::new()
                .texture(kind, Some(ImageSource::from_png_base64(photo_base64)))
                .enabled(kind, true),
        )
    }

    /// Subscribe to state changes.
    ///
    /// The receiver starts out marked as seen; `has_changed()` turns true on
    /// the next effective `set`.
    pub fn subscribe(&self) -> RenderStateWatcher {
        self.sender.subscribe()
    }
}
