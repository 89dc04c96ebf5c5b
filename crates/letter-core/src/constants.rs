use crate::color::Rgb;

// Shared scene/tuning constants used by the core and the web frontend.

// Configuration defaults
pub const DEFAULT_LETTERS: &str = "LOGO";
pub const DEFAULT_HEIGHT: f32 = 2.0;
pub const DEFAULT_DEPTH: f32 = 0.6;
pub const DEFAULT_COLOR: Rgb = Rgb::new(0x34, 0x98, 0xdb);
pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(0xf0, 0xf0, 0xf0);
pub const DEFAULT_LETTER_SPACING: f32 = 0.1;
pub const DEFAULT_FONT_KEY: &str = "helvetiker_bold";
pub const DEFAULT_FONT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/three@0.160.0/examples/fonts/";

// Glyph extrusion
pub const BEVEL_THICKNESS: f32 = 0.1;
pub const BEVEL_SIZE: f32 = 0.05;
pub const BEVEL_SEGMENTS: u32 = 5;
pub const CURVE_SEGMENTS: u32 = 12;
pub const SPACE_ADVANCE_FACTOR: f32 = 0.5; // a space advances by height * factor

// Camera
pub const FOV_Y_DEGREES: f32 = 75.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;
pub const INITIAL_CAMERA_DISTANCE: f32 = 10.0;
pub const FRAME_MARGIN: f32 = 1.2; // slack around the framed bounding box
pub const MIN_CAMERA_DISTANCE: f32 = 0.5;
pub const ZOOM_IN_FACTOR: f32 = 0.8;
pub const ZOOM_OUT_FACTOR: f32 = 1.2;
pub const DAMPING_FACTOR: f32 = 0.05;
pub const ROTATE_SPEED: f32 = 1.0; // radians per viewport height of drag
pub const PAN_SPEED: f32 = 1.0;
pub const DOLLY_STEP: f32 = 0.95; // per wheel notch

// Animation
pub const ROTATION_STEP_RAD: f32 = 0.005; // letter group rotation per frame

// Lighting presets: ambient, key, fill, back
pub const LIGHTS_BRIGHT: [f32; 4] = [0.5, 0.8, 0.5, 0.8];
pub const LIGHTS_DIM: [f32; 4] = [0.1, 0.2, 0.1, 0.3];

// Ground plane (shadow catcher)
pub const GROUND_GAP: f32 = 0.01; // below the lowest letter
pub const GROUND_SIZE_FACTOR: f32 = 4.0; // ground half-extent vs scene size
pub const SHADOW_OPACITY: f32 = 0.3;

// Loading
pub const LOADING_TIMEOUT_MS: u32 = 5000;

// Environment map
pub const ENV_FACE_SIZE: u32 = 32;
