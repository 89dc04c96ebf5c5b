//! Error types shared by the preview core.
//!
//! Configuration problems are never fatal: the viewer keeps the previous (or
//! default) value and reports the rejected input as a [`ConfigError`] warning.
//! Typeface and geometry failures abort the current rebuild and surface through
//! the viewer's load outcome.

use thiserror::Error;

/// A rejected configuration value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("unknown finish '{0}'")]
    UnknownFinish(String),

    #[error("invalid color '{value}' for {field}")]
    InvalidColor { field: &'static str, value: String },

    #[error("invalid {field}: {value}")]
    InvalidDimension { field: &'static str, value: f32 },

    #[error("invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unknown color keying '{0}'")]
    UnknownColorKeying(String),

    #[error("malformed letterColors: {0}")]
    MalformedLetterColors(String),

    #[error("malformed host message: {0}")]
    MalformedMessage(String),
}

/// Failure to read a typeface-description asset.
#[derive(Error, Debug)]
pub enum TypefaceError {
    #[error("typeface JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("glyph '{glyph}': unknown outline command '{command}'")]
    UnknownCommand { glyph: char, command: String },

    #[error("glyph '{glyph}': truncated outline after '{command}'")]
    Truncated { glyph: char, command: char },

    #[error("glyph '{glyph}': bad number '{token}'")]
    BadNumber { glyph: char, token: String },
}

/// Failure while turning an outline into a mesh.
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("tessellation failed for '{glyph}': {reason}")]
    Tessellation { glyph: char, reason: String },
}

/// Umbrella error for viewer operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Typeface(#[from] TypefaceError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
