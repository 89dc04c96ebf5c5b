//! Control panel actions and visibility.
//!
//! The panel starts hidden, appears after the first successful render, hides
//! again whenever a rebuild starts and is force-shown when a load outlives the
//! loading timeout.

use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlAction {
    ResetView,
    ToggleRotation,
    ToggleLights,
    ZoomIn,
    ZoomOut,
}

impl ControlAction {
    pub const ALL: [ControlAction; 5] = [
        ControlAction::ResetView,
        ControlAction::ToggleRotation,
        ControlAction::ToggleLights,
        ControlAction::ZoomIn,
        ControlAction::ZoomOut,
    ];

    /// DOM id of the button bound to this action.
    pub fn element_id(self) -> &'static str {
        match self {
            ControlAction::ResetView => "reset-view",
            ControlAction::ToggleRotation => "toggle-rotation",
            ControlAction::ToggleLights => "toggle-lights",
            ControlAction::ZoomIn => "zoom-in",
            ControlAction::ZoomOut => "zoom-out",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            ControlAction::ResetView => "Reset View",
            ControlAction::ToggleRotation => rotation_label(true),
            ControlAction::ToggleLights => lights_label(true),
            ControlAction::ZoomIn => "Zoom In",
            ControlAction::ZoomOut => "Zoom Out",
        }
    }
}

impl FromStr for ControlAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.element_id() == s)
            .ok_or(())
    }
}

/// Label of the rotation button while rotation is `animating`.
pub fn rotation_label(animating: bool) -> &'static str {
    if animating {
        "Pause Rotation"
    } else {
        "Resume Rotation"
    }
}

/// Label of the lights button while lights are `on`.
pub fn lights_label(on: bool) -> &'static str {
    if on {
        "Dim Lights"
    } else {
        "Brighten Lights"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelVisibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlPanel {
    visibility: PanelVisibility,
    loading: bool,
    /// Generation of the load currently in progress.
    loading_generation: Option<u64>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn visibility(&self) -> PanelVisibility {
        self.visibility
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility == PanelVisibility::Visible
    }

    /// Whether the spinner overlay should be showing.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_loading(&mut self, generation: u64) {
        self.loading = true;
        self.loading_generation = Some(generation);
        self.visibility = PanelVisibility::Hidden;
    }

    pub fn finish_loading(&mut self) {
        self.loading = false;
        self.loading_generation = None;
        self.visibility = PanelVisibility::Visible;
    }

    /// A failed load dismisses the spinner; the panel stays hidden.
    pub fn fail_loading(&mut self) {
        self.loading = false;
        self.loading_generation = None;
    }

    /// Stuck-load safeguard. Returns true if the panel was force-revealed.
    ///
    /// The spinner is left as is.
    pub fn loading_timed_out(&mut self, generation: u64) -> bool {
        if self.loading && self.loading_generation == Some(generation) && !self.is_visible() {
            self.visibility = PanelVisibility::Visible;
            log::warn!("[panel] loading still in progress after timeout, showing controls");
            true
        } else {
            false
        }
    }
}
