// DOM ids, class names and user-facing text for the web frontend.
// Kept free of imports so host-side tests can `include!` it.

// Container used by the self-booting page
pub const DEFAULT_CONTAINER_ID: &str = "letter-preview";

// Elements created inside the container
pub const CANVAS_CLASS: &str = "letter-preview-canvas";
pub const SPINNER_CLASS: &str = "letter-preview-loading";
pub const PANEL_CLASS: &str = "letter-preview-controls";
pub const ERROR_BANNER_CLASS: &str = "letter-preview-error";
pub const HIDDEN_CLASS: &str = "hidden";

// Messages
pub const SPINNER_TEXT: &str = "Loading 3D preview...";
pub const FONT_FAILURE_MESSAGE: &str =
    "Unable to load the 3D preview font. Please refresh the page to try again.";
pub const ERROR_BANNER_PREFIX: &str = "3D preview error: ";

// Inline styles applied when the page ships no stylesheet
pub const CANVAS_STYLE: &str = "display:block;width:100%;height:100%;touch-action:none;";
pub const SPINNER_STYLE: &str = "position:absolute;inset:0;display:flex;align-items:center;\
justify-content:center;font:14px system-ui;color:#555;background:rgba(255,255,255,0.6);";
pub const PANEL_STYLE: &str = "position:absolute;left:8px;bottom:8px;display:flex;gap:6px;";
pub const ERROR_BANNER_STYLE: &str = "position:absolute;left:0;right:0;top:0;padding:8px 12px;\
background:#c0392b;color:#fff;font:13px system-ui;";
pub const FAILURE_STYLE: &str = "display:flex;align-items:center;justify-content:center;\
height:100%;padding:16px;text-align:center;font:14px system-ui;color:#c0392b;";

// Pointer input
pub const WHEEL_LINE_PX: f32 = 16.0; // deltaMode=1 lines to pixels
pub const RIGHT_BUTTON: i16 = 2;
