//! Material and finish tables and the pure shading derivation.
//!
//! A letter's shading is resolved in three layers: the material profile gives
//! base roughness/metalness/opacity, the finish profile overrides whichever of
//! those it defines, and the color is picked per letter (override color when
//! multi-color is on, then the Gold finish color, then the configured color).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::{ColorKeying, ViewerConfig};
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Plastic,
    Metal,
    Wood,
    Glass,
    Acrylic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishKind {
    Standard,
    Painted,
    Chrome,
    Gold,
    Brushed,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 5] = [
        MaterialKind::Plastic,
        MaterialKind::Metal,
        MaterialKind::Wood,
        MaterialKind::Glass,
        MaterialKind::Acrylic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MaterialKind::Plastic => "plastic",
            MaterialKind::Metal => "metal",
            MaterialKind::Wood => "wood",
            MaterialKind::Glass => "glass",
            MaterialKind::Acrylic => "acrylic",
        }
    }

    pub fn profile(self) -> MaterialProfile {
        match self {
            MaterialKind::Plastic => MaterialProfile::opaque(0.7, 0.0),
            MaterialKind::Metal => MaterialProfile::opaque(0.3, 0.9),
            MaterialKind::Wood => MaterialProfile::opaque(0.9, 0.0),
            MaterialKind::Glass => MaterialProfile::translucent(0.1, 0.0, 0.4),
            MaterialKind::Acrylic => MaterialProfile::translucent(0.2, 0.0, 0.85),
        }
    }
}

impl FinishKind {
    pub const ALL: [FinishKind; 5] = [
        FinishKind::Standard,
        FinishKind::Painted,
        FinishKind::Chrome,
        FinishKind::Gold,
        FinishKind::Brushed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FinishKind::Standard => "Standard",
            FinishKind::Painted => "Painted",
            FinishKind::Chrome => "Chrome",
            FinishKind::Gold => "Gold",
            FinishKind::Brushed => "Brushed",
        }
    }

    pub fn profile(self) -> FinishProfile {
        match self {
            FinishKind::Standard => FinishProfile::default(),
            FinishKind::Painted => FinishProfile {
                roughness: Some(0.5),
                metalness: Some(0.1),
                color: None,
            },
            FinishKind::Chrome => FinishProfile {
                roughness: Some(0.05),
                metalness: Some(1.0),
                color: None,
            },
            FinishKind::Gold => FinishProfile {
                roughness: Some(0.25),
                metalness: Some(1.0),
                color: Some(GOLD),
            },
            FinishKind::Brushed => FinishProfile {
                roughness: Some(0.45),
                metalness: Some(0.85),
                color: None,
            },
        }
    }
}

pub const GOLD: Rgb = Rgb::new(0xff, 0xd7, 0x00);

/// Fraction of the base color emitted when LED lighting is on.
pub const LED_EMISSIVE: f32 = 0.6;

impl FromStr for MaterialKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownMaterial(s.to_string()))
    }
}

impl FromStr for FinishKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownFinish(s.to_string()))
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for FinishKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base shading parameters of a physical material category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialProfile {
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transparent: bool,
}

impl MaterialProfile {
    const fn opaque(roughness: f32, metalness: f32) -> Self {
        Self {
            roughness,
            metalness,
            opacity: 1.0,
            transparent: false,
        }
    }

    const fn translucent(roughness: f32, metalness: f32, opacity: f32) -> Self {
        Self {
            roughness,
            metalness,
            opacity,
            transparent: true,
        }
    }
}

/// Surface treatment layered over a material; `None` fields leave the material value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FinishProfile {
    pub roughness: Option<f32>,
    pub metalness: Option<f32>,
    pub color: Option<Rgb>,
}

/// Fully resolved shading parameters for one letter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub base_color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transparent: bool,
    /// Sample the baked environment cube map for reflections.
    pub env_reflections: bool,
    pub emissive: f32,
}

/// Whether a material/finish pair receives the reflective environment map.
#[inline]
pub fn uses_environment(material: MaterialKind, finish: FinishKind) -> bool {
    material == MaterialKind::Metal || matches!(finish, FinishKind::Chrome | FinishKind::Gold)
}

/// Derive the shading of the letter at `ordinal` (index among non-space
/// characters) whose character is `ch`.
pub fn derive_material(config: &ViewerConfig, ordinal: usize, ch: char) -> MaterialParams {
    let base = config.material.profile();
    let finish = config.finish.profile();

    let mut buf = [0u8; 4];
    let by_char = &*ch.encode_utf8(&mut buf);
    let letter_override = if config.multi_color {
        match config.color_keying {
            // Hosts that key by the letter itself still match in index mode.
            ColorKeying::Index => config
                .letter_colors
                .get(&ordinal.to_string())
                .or_else(|| config.letter_colors.get(by_char)),
            ColorKeying::Character => config.letter_colors.get(by_char),
        }
    } else {
        None
    };
    let base_color = letter_override
        .copied()
        .or(finish.color)
        .unwrap_or(config.color);

    MaterialParams {
        base_color,
        roughness: finish.roughness.unwrap_or(base.roughness),
        metalness: finish.metalness.unwrap_or(base.metalness),
        opacity: base.opacity,
        transparent: base.transparent,
        env_reflections: uses_environment(config.material, config.finish),
        emissive: if config.led_lighting { LED_EMISSIVE } else { 0.0 },
    }
}
