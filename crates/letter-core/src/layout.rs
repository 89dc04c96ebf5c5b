//! Left-to-right placement of extruded glyphs.
//!
//! A space advances the pen by `height * 0.5` without producing a mesh.
//! Every other character becomes exactly one [`LetterMesh`]; a glyph missing
//! from the typeface falls back to `?`, and to an empty mesh if `?` is missing
//! too. Glyph widths are measured after extrusion, consecutive glyphs are
//! separated by `letterSpacing`, and the visible glyphs are centered on the
//! origin. Leading and trailing spaces take no room.

use glam::{Mat4, Vec3};

use crate::config::{ViewerConfig, ViewerOptions};
use crate::constants::SPACE_ADVANCE_FACTOR;
use crate::error::ViewerError;
use crate::geometry::{extrude_glyph, Aabb, ExtrudeSettings, MeshData};
use crate::material::{derive_material, MaterialParams};
use crate::typeface::Typeface;

const FALLBACK_GLYPH: char = '?';

#[derive(Clone, Debug, PartialEq)]
pub struct LetterMesh {
    /// Position among the non-space characters.
    pub ordinal: usize,
    pub character: char,
    pub mesh: MeshData,
    /// Bounds of `mesh` in glyph space.
    pub local_bounds: Aabb,
    /// Translation from glyph space into the letter group.
    pub offset: Vec3,
    pub material: MaterialParams,
}

impl LetterMesh {
    /// Bounds inside the (unrotated) letter group.
    pub fn bounds(&self) -> Aabb {
        self.local_bounds.translated(self.offset)
    }

    /// Model matrix for a letter group rotated by `group_rotation` around Y.
    pub fn model_matrix(&self, group_rotation: f32) -> Mat4 {
        Mat4::from_rotation_y(group_rotation) * Mat4::from_translation(self.offset)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slot {
    Glyph { width: f32 },
    Space { advance: f32 },
}

/// Left edge of every glyph slot (in order) and the run width from the first
/// glyph's left edge to the last glyph's right edge.
///
/// The run starts at 0; callers center it by subtracting `total / 2`.
pub fn place_slots(slots: &[Slot], spacing: f32) -> (Vec<f32>, f32) {
    let mut lefts = Vec::with_capacity(slots.len());
    let mut cursor = 0.0;
    let mut end = 0.0;
    for slot in slots {
        match *slot {
            Slot::Glyph { width } => {
                lefts.push(cursor);
                end = cursor + width;
                cursor = end + spacing;
            }
            // Spaces before the first glyph take no room.
            Slot::Space { advance } if !lefts.is_empty() => cursor += advance,
            Slot::Space { .. } => {}
        }
    }
    (lefts, f32::max(end, 0.0))
}

pub fn extrude_settings(config: &ViewerConfig, options: &ViewerOptions) -> ExtrudeSettings {
    ExtrudeSettings {
        depth: config.depth,
        bevel: options.bevel,
        curve_segments: options.curve_segments,
    }
}

fn glyph_mesh(
    typeface: &Typeface,
    ch: char,
    config: &ViewerConfig,
    settings: &ExtrudeSettings,
) -> Result<MeshData, ViewerError> {
    let glyph = match typeface.glyph(ch) {
        Some(g) => g,
        None => match typeface.glyph(FALLBACK_GLYPH) {
            Some(g) => {
                log::warn!("[font] no glyph for '{}', using '{}'", ch, FALLBACK_GLYPH);
                g
            }
            None => {
                log::warn!("[font] no glyph for '{}' and no fallback", ch);
                return Ok(MeshData::default());
            }
        },
    };
    let outline = glyph.outline(ch, typeface.scale_for(config.height))?;
    Ok(extrude_glyph(&outline, settings, ch)?)
}

/// Build one mesh per non-space character of `config.letters`.
pub fn build_letters(
    typeface: &Typeface,
    config: &ViewerConfig,
    options: &ViewerOptions,
) -> Result<Vec<LetterMesh>, ViewerError> {
    let settings = extrude_settings(config, options);
    let mut slots = Vec::new();
    let mut letters = Vec::new();

    for ch in config.letters.chars() {
        if ch == ' ' {
            slots.push(Slot::Space {
                advance: config.height * SPACE_ADVANCE_FACTOR,
            });
            continue;
        }
        let mesh = glyph_mesh(typeface, ch, config, &settings)?;
        let local_bounds = mesh.bounds();
        slots.push(Slot::Glyph {
            width: local_bounds.size().x,
        });
        let ordinal = letters.len();
        letters.push(LetterMesh {
            ordinal,
            character: ch,
            mesh,
            local_bounds,
            offset: Vec3::ZERO,
            material: derive_material(config, ordinal, ch),
        });
    }

    let (lefts, total) = place_slots(&slots, config.letter_spacing);
    let start = -total * 0.5;
    for (letter, left) in letters.iter_mut().zip(lefts) {
        let glyph_min_x = if letter.local_bounds.is_empty() {
            0.0
        } else {
            letter.local_bounds.min.x
        };
        letter.offset = Vec3::new(start + left - glyph_min_x, 0.0, 0.0);
    }
    Ok(letters)
}

/// Union of all letter bounds in group space.
pub fn letters_bounds(letters: &[LetterMesh]) -> Aabb {
    letters
        .iter()
        .fold(Aabb::EMPTY, |acc, l| acc.union(&l.bounds()))
}
