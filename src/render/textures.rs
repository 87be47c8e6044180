//! Decal texture bookkeeping
//!
//! [`TextureCache`] keeps one texture resource per (image, options) pair for
//! as long as an active overlay wants it and hands it back to the loader the
//! moment nothing does. Load failures are remembered per key so a broken
//! image is reported once, not every frame, and are forgotten when the key
//! stops being requested so re-enabling the decal tries again.
//!
//! [`DataUrlTextureLoader`] is the in-process loader for `data:` references,
//! which is how generated images reach the garment.

use base64::Engine as _;
use garment_types::ImageSource;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

use super::scene::{TextureHandle, TextureLoader, TextureOptions};

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("unsupported image source: {0}")]
    UnsupportedSource(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("texture backend error: {0}")]
    Backend(String),
}

/// Identity of a texture resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub source: ImageSource,
    pub options: TextureOptions,
}

impl TextureKey {
    pub fn new(source: ImageSource, options: TextureOptions) -> Self {
        Self { source, options }
    }
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Debug, Default)]
pub struct TextureCache {
    live: HashMap<TextureKey, TextureHandle>,
    failed: HashSet<TextureKey>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `key`, loading it on first use.
    ///
    /// Returns `None` if the image cannot be loaded. The failure is logged
    /// the first time only.
    pub fn resolve(
        &mut self,
        loader: &mut dyn TextureLoader,
        key: &TextureKey,
    ) -> Option<TextureHandle> {
        if let Some(handle) = self.live.get(key) {
            return Some(*handle);
        }
        if self.failed.contains(key) {
            return None;
        }

        match loader.load(&key.source, key.options) {
            Ok(handle) => {
                debug!(source = %key.source, handle = handle.0, "Loaded decal texture");
                self.live.insert(key.clone(), handle);
                Some(handle)
            }
            Err(e) => {
                warn!(
                    source = %key.source,
                    error = %e,
                    "Decal texture failed to load, omitting overlay"
                );
                self.failed.insert(key.clone());
                None
            }
        }
    }

    /// Release every texture whose key is not in `wanted`.
    pub fn retain(&mut self, loader: &mut dyn TextureLoader, wanted: &[TextureKey]) {
        self.live.retain(|key, handle| {
            let keep = wanted.contains(key);
            if !keep {
                debug!(source = %key.source, handle = handle.0, "Releasing decal texture");
                loader.release(*handle);
            }
            keep
        });
        self.failed.retain(|key| wanted.contains(key));
    }

    /// Release everything.
    pub fn release_all(&mut self, loader: &mut dyn TextureLoader) {
        self.retain(loader, &[]);
    }

    /// Number of texture resources currently held.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[cfg(test)]
    pub(crate) fn has_failed(&self, key: &TextureKey) -> bool {
        self.failed.contains(key)
    }
}

// =============================================================================
// DATA URL LOADER
// =============================================================================

/// CPU-side decoded texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels.
    pub rgba: Vec<u8>,
    pub options: TextureOptions,
}

/// Decodes `data:image/...;base64,` references into RGBA textures.
///
/// Plain URLs are rejected with [`TextureError::UnsupportedSource`]; hosts
/// that fetch over the network provide their own [`TextureLoader`].
#[derive(Debug, Default)]
pub struct DataUrlTextureLoader {
    textures: HashMap<TextureHandle, Texture>,
    next_id: u64,
}

impl DataUrlTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(source: &ImageSource) -> Result<(u32, u32, Vec<u8>), TextureError> {
        let (mime, payload) = source
            .data_url_parts()
            .ok_or_else(|| TextureError::UnsupportedSource(source.to_string()))?;
        if !mime.starts_with("image/") {
            return Err(TextureError::UnsupportedSource(source.to_string()));
        }

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        let decoded = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok((width, height, decoded.into_raw()))
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(&handle)
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }
}

impl TextureLoader for DataUrlTextureLoader {
    fn load(
        &mut self,
        source: &ImageSource,
        options: TextureOptions,
    ) -> Result<TextureHandle, TextureError> {
        let (width, height, rgba) = Self::decode(source)?;

        self.next_id += 1;
        let handle = TextureHandle(self.next_id);
        self.textures.insert(
            handle,
            Texture {
                width,
                height,
                rgba,
                options,
            },
        );
        Ok(handle)
    }

    fn release(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle);
    }
}
