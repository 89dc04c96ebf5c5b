//! Typeface-description assets: the JSON glyph-outline format produced by
//! facetype.js and consumed by three.js' font loader.
//!
//! Outline strings are whitespace-separated commands in font units:
//! `m x y`, `l x y`, `q x y cx cy`, `b x y c1x c1y c2x c2y`, `z`.
//! Curve commands list the end point before the control points.

use std::collections::HashMap;

use fnv::FnvHashMap;
use glam::Vec2;
use serde::Deserialize;

use crate::error::TypefaceError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutlineCmd {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
    Close,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GlyphData {
    /// Horizontal advance in font units.
    #[serde(default)]
    pub ha: f32,
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeface {
    glyphs: HashMap<String, GlyphData>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default = "default_resolution")]
    resolution: f32,
    #[serde(default)]
    ascender: f32,
    #[serde(default)]
    descender: f32,
}

fn default_resolution() -> f32 {
    1000.0
}

#[derive(Clone, Debug)]
pub struct Typeface {
    pub family_name: String,
    pub resolution: f32,
    pub ascender: f32,
    pub descender: f32,
    glyphs: FnvHashMap<char, GlyphData>,
}

impl Typeface {
    pub fn from_json(json: &str) -> Result<Self, TypefaceError> {
        let raw: RawTypeface = serde_json::from_str(json)?;
        let glyphs = raw
            .glyphs
            .into_iter()
            .filter_map(|(k, g)| {
                let mut chars = k.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((c, g)),
                    _ => None,
                }
            })
            .collect();
        Ok(Self {
            family_name: raw.family_name.unwrap_or_default(),
            resolution: if raw.resolution > 0.0 {
                raw.resolution
            } else {
                default_resolution()
            },
            ascender: raw.ascender,
            descender: raw.descender,
            glyphs,
        })
    }

    pub fn glyph(&self, ch: char) -> Option<&GlyphData> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Scale from font units to world units for a given cap size.
    #[inline]
    pub fn scale_for(&self, size: f32) -> f32 {
        size / self.resolution
    }
}

impl GlyphData {
    /// Parse the outline, scaling every coordinate by `scale`.
    pub fn outline(&self, ch: char, scale: f32) -> Result<Vec<OutlineCmd>, TypefaceError> {
        let Some(src) = self.o.as_deref() else {
            return Ok(Vec::new());
        };
        let mut tokens = src.split_whitespace();
        let mut cmds = Vec::new();
        while let Some(tok) = tokens.next() {
            let command = match tok {
                "m" | "l" | "q" | "b" | "z" => tok.chars().next().unwrap_or('z'),
                other => {
                    return Err(TypefaceError::UnknownCommand {
                        glyph: ch,
                        command: other.to_string(),
                    })
                }
            };
            let mut point = || -> Result<Vec2, TypefaceError> {
                let x = number(tokens.next(), ch, command)?;
                let y = number(tokens.next(), ch, command)?;
                Ok(Vec2::new(x, y) * scale)
            };
            let cmd = match command {
                'm' => OutlineCmd::MoveTo(point()?),
                'l' => OutlineCmd::LineTo(point()?),
                'q' => {
                    let to = point()?;
                    let ctrl = point()?;
                    OutlineCmd::QuadTo { ctrl, to }
                }
                'b' => {
                    let to = point()?;
                    let ctrl1 = point()?;
                    let ctrl2 = point()?;
                    OutlineCmd::CubicTo { ctrl1, ctrl2, to }
                }
                _ => OutlineCmd::Close,
            };
            cmds.push(cmd);
        }
        Ok(cmds)
    }
}

fn number(tok: Option<&str>, glyph: char, command: char) -> Result<f32, TypefaceError> {
    let tok = tok.ok_or(TypefaceError::Truncated { glyph, command })?;
    tok.parse::<f32>().map_err(|_| TypefaceError::BadNumber {
        glyph,
        token: tok.to_string(),
    })
}
