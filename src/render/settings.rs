//! Render tuning loaded from `config/render_settings.yaml`.
//!
//! Every field has a built-in default, so a missing file or a partial file is
//! fine. The defaults reproduce the shipped garment: a quarter-second color
//! settle, a matte material and a chest-height logo.

use anyhow::{Context, Result};
use garment_types::DecalKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where and how a decal is projected onto the garment mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecalPlacement {
    /// Offset from the mesh origin.
    pub position: [f32; 3],
    /// Euler rotation in radians.
    pub rotation: [f32; 3],
    /// Uniform scale relative to the full garment front.
    pub scale: f32,
    /// When false the decal draws over everything else on the mesh.
    pub depth_test: bool,
    /// Anisotropic filtering level requested for the decal texture.
    pub anisotropy: Option<u8>,
}

impl DecalPlacement {
    /// Identity transform covering the whole front face.
    pub const FULL: Self = Self {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0],
        scale: 1.0,
        depth_test: true,
        anisotropy: None,
    };

    /// Small overlay forward of and above the origin (chest height).
    pub const LOGO: Self = Self {
        position: [0.0, 0.04, 0.15],
        rotation: [0.0, 0.0, 0.0],
        scale: 0.15,
        depth_test: false,
        anisotropy: Some(16),
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Approximate time in seconds for the base color to settle on a new target.
    pub color_smooth_time: f32,
    /// Channel distance below which the color snaps onto the target.
    pub color_snap_epsilon: f32,
    /// Roughness pinned onto the garment material.
    pub material_roughness: f32,
    pub full_decal: DecalPlacement,
    pub logo_decal: DecalPlacement,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            color_smooth_time: 0.25,
            color_snap_epsilon: 0.001,
            material_roughness: 1.0,
            full_decal: DecalPlacement::FULL,
            logo_decal: DecalPlacement::LOGO,
        }
    }
}

impl RenderSettings {
    pub fn placement(&self, kind: DecalKind) -> &DecalPlacement {
        match kind {
            DecalKind::Full => &self.full_decal,
            DecalKind::Logo => &self.logo_decal,
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Parsing render settings")
    }

    /// Load from a YAML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("Parsing {}", path.display()))
    }

    /// Load from `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No render settings file, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = RenderSettings::from_yaml_str("color_smooth_time: 0.5\n").unwrap();
        assert_eq!(settings.color_smooth_time, 0.5);
        assert_eq!(settings.logo_decal, DecalPlacement::LOGO);
        assert_eq!(settings.material_roughness, 1.0);
    }

    #[test]
    fn test_placement_override() {
        let yaml = r#"
logo_decal:
  position: [0.0, 0.1, 0.15]
  rotation: [0.0, 0.0, 0.0]
  scale: 0.2
  depth_test: false
"#;
        let settings = RenderSettings::from_yaml_str(yaml).unwrap();
        let logo = settings.placement(DecalKind::Logo);
        assert_eq!(logo.position, [0.0, 0.1, 0.15]);
        assert_eq!(logo.scale, 0.2);
        assert_eq!(logo.anisotropy, None);
        assert_eq!(settings.placement(DecalKind::Full), &DecalPlacement::FULL);
    }

    #[test]
    fn test_shipped_settings_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/render_settings.yaml");
        let settings = RenderSettings::load_from_file(&path).unwrap();
        let defaults = RenderSettings::default();

        let close = |a: f32, b: f32| (a - b).abs() < 1e-6;
        assert!(close(settings.color_smooth_time, defaults.color_smooth_time));
        assert!(close(settings.color_snap_epsilon, defaults.color_snap_epsilon));
        for kind in [DecalKind::Full, DecalKind::Logo] {
            let (got, want) = (settings.placement(kind), defaults.placement(kind));
            assert!(got.position.iter().zip(want.position).all(|(a, b)| close(*a, b)));
            assert!(close(got.scale, want.scale));
            assert_eq!(got.depth_test, want.depth_test);
            assert_eq!(got.anisotropy, want.anisotropy);
        }
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings =
            RenderSettings::load_or_default(Path::new("/nonexistent/render_settings.yaml"))
                .unwrap();
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(RenderSettings::from_yaml_str("color_smooth_time: [").is_err());
    }
}
