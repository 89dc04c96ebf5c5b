//! Viewer configuration: the validated, fully-populated [`ViewerConfig`], the
//! all-optional [`ConfigUpdate`] accepted at every update boundary, and the
//! construction-time [`ViewerOptions`].
//!
//! Updates are merged field by field. A field that fails validation keeps its
//! previous value and is reported back as a [`ConfigError`] warning; the rest
//! of the update still applies.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::Rgb;
use crate::constants::*;
use crate::error::ConfigError;
use crate::material::{FinishKind, MaterialKind};

/// Per-letter override colors, keyed by letter ordinal or by character.
pub type LetterColors = BTreeMap<String, Rgb>;

/// How keys in `letterColors` are matched to letters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorKeying {
    /// `"0"`, `"1"`, ... index among the non-space characters. A key that
    /// names no index is tried as a character.
    #[default]
    Index,
    /// The character itself, so every `A` shares one color.
    Character,
}

impl FromStr for ColorKeying {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" => Ok(ColorKeying::Index),
            "character" | "char" => Ok(ColorKeying::Character),
            _ => Err(ConfigError::UnknownColorKeying(s.to_string())),
        }
    }
}

impl fmt::Display for ColorKeying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorKeying::Index => "index",
            ColorKeying::Character => "character",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    pub letters: String,
    pub height: f32,
    pub depth: f32,
    pub material: MaterialKind,
    pub finish: FinishKind,
    pub color: Rgb,
    pub multi_color: bool,
    pub letter_colors: LetterColors,
    pub font: String,
    pub letter_spacing: f32,
    pub background_color: Rgb,
    pub led_lighting: bool,
    pub color_keying: ColorKeying,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            letters: DEFAULT_LETTERS.to_string(),
            height: DEFAULT_HEIGHT,
            depth: DEFAULT_DEPTH,
            material: MaterialKind::Plastic,
            finish: FinishKind::Standard,
            color: DEFAULT_COLOR,
            multi_color: false,
            letter_colors: LetterColors::new(),
            font: DEFAULT_FONT_KEY.to_string(),
            letter_spacing: DEFAULT_LETTER_SPACING,
            background_color: DEFAULT_BACKGROUND,
            led_lighting: false,
            color_keying: ColorKeying::Index,
        }
    }
}

/// A partial configuration. Absent fields leave the current value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigUpdate {
    pub letters: Option<String>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
    pub material: Option<String>,
    pub finish: Option<String>,
    pub color: Option<String>,
    pub multi_color: Option<bool>,
    pub letter_colors: Option<BTreeMap<String, String>>,
    pub font: Option<String>,
    pub letter_spacing: Option<f32>,
    pub background_color: Option<String>,
    pub led_lighting: Option<bool>,
    pub color_keying: Option<String>,
}

impl ConfigUpdate {
    /// Parse a JSON object. Only unparseable JSON is an error; mistyped
    /// fields come back as warnings.
    pub fn from_json(json: &str) -> Result<(Self, Vec<ConfigError>), ConfigError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::MalformedMessage(e.to_string()))?;
        Ok(Self::from_value(value))
    }

    /// Decode a host-supplied object one field at a time.
    ///
    /// A field of the wrong JSON type is dropped with a warning and the other
    /// fields still apply. `null` counts as absent, unknown keys are skipped.
    pub fn from_value(value: Value) -> (Self, Vec<ConfigError>) {
        let mut warnings = Vec::new();
        let update = match value {
            Value::Object(map) => Self::from_map(map, &mut warnings),
            Value::Null => ConfigUpdate::default(),
            other => {
                warnings.push(ConfigError::MalformedMessage(format!(
                    "config must be an object, got {}",
                    other
                )));
                ConfigUpdate::default()
            }
        };
        (update, warnings)
    }

    fn from_map(map: Map<String, Value>, w: &mut Vec<ConfigError>) -> Self {
        let mut update = ConfigUpdate::default();
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "letters" => update.letters = json_field("letters", value, w),
                "height" => update.height = json_number("height", value, w),
                "depth" => update.depth = json_number("depth", value, w),
                "letterSpacing" => update.letter_spacing = json_number("letterSpacing", value, w),
                "material" => update.material = json_field("material", value, w),
                "finish" => update.finish = json_field("finish", value, w),
                "color" => update.color = json_field("color", value, w),
                "multiColor" => update.multi_color = json_field("multiColor", value, w),
                "letterColors" => match serde_json::from_value(value) {
                    Ok(map) => update.letter_colors = Some(map),
                    Err(e) => w.push(ConfigError::MalformedLetterColors(e.to_string())),
                },
                "font" => update.font = json_field("font", value, w),
                "backgroundColor" => {
                    update.background_color = json_field("backgroundColor", value, w)
                }
                "ledLighting" => update.led_lighting = json_field("ledLighting", value, w),
                "colorKeying" => update.color_keying = json_field("colorKeying", value, w),
                other => log::debug!("[config] ignoring field '{}'", other),
            }
        }
        update
    }

    /// Seed an update from already URL-decoded query parameters.
    ///
    /// Unparseable values are skipped with a warning so a bad parameter never
    /// aborts initialization.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> (Self, Vec<ConfigError>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut update = ConfigUpdate::default();
        let mut warnings = Vec::new();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "letters" => update.letters = Some(value.to_string()),
                "height" => update.height = parse_number("height", value, &mut warnings),
                "depth" => update.depth = parse_number("depth", value, &mut warnings),
                "letterSpacing" => {
                    update.letter_spacing = parse_number("letterSpacing", value, &mut warnings)
                }
                "material" => update.material = Some(value.to_string()),
                "finish" => update.finish = Some(value.to_string()),
                "font" => update.font = Some(value.to_string()),
                "color" => update.color = Some(value.to_string()),
                "backgroundColor" => update.background_color = Some(value.to_string()),
                "colorKeying" => update.color_keying = Some(value.to_string()),
                "multiColor" => update.multi_color = Some(value == "true"),
                "ledLighting" => update.led_lighting = Some(value == "true"),
                "letterColors" => {
                    match serde_json::from_str::<BTreeMap<String, String>>(value) {
                        Ok(map) => update.letter_colors = Some(map),
                        Err(e) => {
                            warnings.push(ConfigError::MalformedLetterColors(e.to_string()))
                        }
                    }
                }
                other => log::debug!("[config] ignoring query parameter '{}'", other),
            }
        }
        (update, warnings)
    }
}

fn parse_number(field: &'static str, value: &str, warnings: &mut Vec<ConfigError>) -> Option<f32> {
    match value.trim().parse::<f32>() {
        Ok(v) => Some(v),
        Err(_) => {
            warnings.push(ConfigError::InvalidNumber {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

fn json_number(field: &'static str, value: Value, warnings: &mut Vec<ConfigError>) -> Option<f32> {
    match value.as_f64() {
        Some(v) => Some(v as f32),
        None => {
            warnings.push(ConfigError::InvalidNumber {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

fn json_field<T: DeserializeOwned>(
    field: &'static str,
    value: Value,
    warnings: &mut Vec<ConfigError>,
) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warnings.push(ConfigError::MalformedMessage(format!("{}: {}", field, e)));
            None
        }
    }
}

fn positive(field: &'static str, v: f32) -> Result<f32, ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ConfigError::InvalidDimension { field, value: v })
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<f32, ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(ConfigError::InvalidDimension { field, value: v })
    }
}

fn color(field: &'static str, s: &str) -> Result<Rgb, ConfigError> {
    Rgb::from_hex(s).ok_or_else(|| ConfigError::InvalidColor {
        field,
        value: s.to_string(),
    })
}

/// Apply `result` to `slot` on success, otherwise record the warning.
#[inline]
fn apply<T>(slot: &mut T, result: Result<T, ConfigError>, warnings: &mut Vec<ConfigError>) {
    match result {
        Ok(v) => *slot = v,
        Err(e) => warnings.push(e),
    }
}

impl ViewerConfig {
    pub fn from_update(update: ConfigUpdate) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let warnings = config.merge(update);
        (config, warnings)
    }

    /// Merge `update` into this configuration, returning rejected fields.
    pub fn merge(&mut self, update: ConfigUpdate) -> Vec<ConfigError> {
        let mut warnings = Vec::new();
        let w = &mut warnings;

        if let Some(letters) = update.letters {
            self.letters = letters;
        }
        if let Some(v) = update.height {
            apply(&mut self.height, positive("height", v), w);
        }
        if let Some(v) = update.depth {
            apply(&mut self.depth, positive("depth", v), w);
        }
        if let Some(v) = update.letter_spacing {
            apply(&mut self.letter_spacing, non_negative("letterSpacing", v), w);
        }
        if let Some(name) = update.material {
            apply(&mut self.material, name.parse(), w);
        }
        if let Some(name) = update.finish {
            apply(&mut self.finish, name.parse(), w);
        }
        if let Some(hex) = update.color {
            apply(&mut self.color, color("color", &hex), w);
        }
        if let Some(hex) = update.background_color {
            apply(&mut self.background_color, color("backgroundColor", &hex), w);
        }
        if let Some(on) = update.multi_color {
            self.multi_color = on;
        }
        if let Some(map) = update.letter_colors {
            self.letter_colors = validate_letter_colors(map, w);
        }
        if let Some(font) = update.font {
            let font = font.trim();
            if font.is_empty() {
                self.font = DEFAULT_FONT_KEY.to_string();
            } else {
                self.font = font.to_string();
            }
        }
        if let Some(on) = update.led_lighting {
            self.led_lighting = on;
        }
        if let Some(keying) = update.color_keying {
            apply(&mut self.color_keying, keying.parse(), w);
        }
        warnings
    }
}

/// Keep the valid entries of a raw letter-color map; invalid colors are dropped.
pub fn validate_letter_colors(
    raw: BTreeMap<String, String>,
    warnings: &mut Vec<ConfigError>,
) -> LetterColors {
    raw.into_iter()
        .filter_map(|(key, hex)| match Rgb::from_hex(&hex) {
            Some(c) => Some((key, c)),
            None => {
                warnings.push(ConfigError::InvalidColor {
                    field: "letterColors",
                    value: hex,
                });
                None
            }
        })
        .collect()
}

/// Bevel applied to every extruded glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BevelProfile {
    pub thickness: f32,
    pub size: f32,
    pub offset: f32,
    pub segments: u32,
}

impl Default for BevelProfile {
    fn default() -> Self {
        Self {
            thickness: BEVEL_THICKNESS,
            size: BEVEL_SIZE,
            offset: 0.0,
            segments: BEVEL_SEGMENTS,
        }
    }
}

/// What to do when a typeface load completes after a newer one was requested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaleLoadPolicy {
    /// Every completion rebuilds the scene; the last one to finish wins.
    #[default]
    LastCompletionWins,
    /// Completions for anything but the newest request are dropped.
    DiscardStale,
}

/// Which embedding origins may push configuration through the host bridge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    #[default]
    Any,
    AllowList(Vec<String>),
}

impl OriginPolicy {
    pub fn accepts(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::Any => true,
            OriginPolicy::AllowList(allowed) => allowed.iter().any(|o| o == origin),
        }
    }
}

/// Construction-time settings that do not change with configuration updates.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerOptions {
    pub ground_plane: bool,
    pub bevel: BevelProfile,
    pub curve_segments: u32,
    pub font_base_url: String,
    pub loading_timeout_ms: u32,
    pub stale_loads: StaleLoadPolicy,
    pub origins: OriginPolicy,
    pub auto_rotate: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            ground_plane: true,
            bevel: BevelProfile::default(),
            curve_segments: CURVE_SEGMENTS,
            font_base_url: DEFAULT_FONT_BASE_URL.to_string(),
            loading_timeout_ms: LOADING_TIMEOUT_MS,
            stale_loads: StaleLoadPolicy::default(),
            origins: OriginPolicy::default(),
            auto_rotate: true,
        }
    }
}
