pub mod bridge;
pub mod camera;
pub mod color;
pub mod config;
pub mod constants;
pub mod controls;
pub mod envmap;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod lights;
pub mod material;
pub mod typeface;
pub mod viewer;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use bridge::{InboundMessage, OutboundMessage, ReadyLatch};
pub use camera::{Camera, OrbitCamera};
pub use color::Rgb;
pub use config::*;
pub use controls::{ControlAction, ControlPanel, PanelVisibility};
pub use error::*;
pub use fonts::{FontResolver, ResolvedFont, KNOWN_FONTS};
pub use geometry::{Aabb, MeshData, Vertex};
pub use layout::LetterMesh;
pub use lights::LightRig;
pub use material::{FinishKind, MaterialKind, MaterialParams};
pub use typeface::Typeface;
pub use viewer::*;
