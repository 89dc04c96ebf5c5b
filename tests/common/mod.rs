// Shared fixtures for the host-side tests of the preview core.

#![allow(dead_code)]

use letter_core::{
    ConfigUpdate, FontRequest, LoadOutcome, RebuildPlan, Typeface, Viewer, ViewerOptions,
    Viewport,
};

pub const MINI_TYPEFACE: &str = include_str!("../fixtures/mini.typeface.json");

pub fn mini_typeface() -> Typeface {
    Typeface::from_json(MINI_TYPEFACE).expect("fixture typeface parses")
}

pub fn viewport() -> Viewport {
    Viewport {
        width: 800,
        height: 600,
    }
}

pub fn letters(text: &str) -> ConfigUpdate {
    ConfigUpdate {
        letters: Some(text.to_string()),
        ..Default::default()
    }
}

pub fn expect_request(plan: RebuildPlan) -> FontRequest {
    match plan {
        RebuildPlan::NeedsTypeface(req) => req,
        other => panic!("expected a typeface request, got {:?}", other),
    }
}

/// A viewer that has completed its first build against the fixture typeface.
pub fn ready_viewer_with(options: ViewerOptions, initial: ConfigUpdate) -> Viewer {
    let (mut viewer, warnings) = Viewer::new(options, initial, viewport());
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    let req = expect_request(viewer.rebuild());
    let outcome = viewer.complete_font_load(&req, Ok(mini_typeface()));
    assert_eq!(outcome, LoadOutcome::Rendered { first_ready: true });
    viewer
}

pub fn ready_viewer(text: &str) -> Viewer {
    ready_viewer_with(ViewerOptions::default(), letters(text))
}
