//! Shared types for garment-studio
//!
//! Everything that crosses a boundary lives here: the HTTP bodies of the
//! image-generation endpoint and the value types the UI writes into the
//! render-state store (colors, image references, decal kinds).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// COLOR
// =============================================================================

/// Error returned when a color string is not `#RRGGBB`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid color '{0}': expected #RRGGBB")]
pub struct ParseColorError(pub String);

/// An RGB color with normalized `f32` channels.
///
/// Channels are nominally in `[0, 1]`. On the wire the color is a `#RRGGBB`
/// hex string, which is what color pickers produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseColorError(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ParseColorError(hex.to_string()))
        };
        Ok(Self::from_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as `#RRGGBB`, clamping channels into range.
    pub fn to_hex(&self) -> String {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b)
        )
    }

    pub fn channels(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_channels([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// =============================================================================
// IMAGE REFERENCES
// =============================================================================

/// Reference to an image used as a decal texture.
///
/// Either a URL/path the host knows how to fetch, or an inline
/// `data:<mime>;base64,<payload>` blob (what generated images become).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

impl ImageSource {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Wrap a base64 PNG payload as returned by `POST /api/v1/dalle`.
    pub fn from_png_base64(payload: &str) -> Self {
        Self(format!("data:image/png;base64,{}", payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a `data:` URL into `(mime, base64 payload)`.
    ///
    /// Returns `None` for plain URLs and for data URLs that are not base64.
    pub fn data_url_parts(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        Some((mime, payload))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Inline blobs can be megabytes long
        if let Some((mime, payload)) = self.data_url_parts() {
            write!(f, "data:{};base64,<{} bytes>", mime, payload.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

/// The two decal slots a garment can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecalKind {
    /// Full-surface texture covering the front of the garment.
    Full,
    /// Small logo anchored at chest height.
    Logo,
}

// =============================================================================
// IMAGE GENERATION API
// =============================================================================

/// Body of `POST /api/v1/dalle`.
///
/// A missing or `null` prompt deserializes as the empty string; prompts are
/// forwarded to the provider without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prompt: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Success body of `POST /api/v1/dalle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoResponse {
    /// Base64-encoded PNG.
    pub photo: String,
}

/// Body of the liveness probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Provider details echoed back to the client on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: Option<String>,
    pub param: Option<String>,
}

/// Failure body of `POST /api/v1/dalle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: ErrorDetail,
}
