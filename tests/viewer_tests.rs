// End-to-end tests of the viewer state machine against a small fixture typeface.

mod common;

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use common::*;
use glam::Vec3;
use letter_core::bridge::parse_inbound;
use letter_core::constants::{LIGHTS_BRIGHT, LIGHTS_DIM, ROTATION_STEP_RAD, Z_NEAR};
use letter_core::material::GOLD;
use letter_core::{
    ConfigError, ConfigUpdate, ControlAction, IgnoreReason, InboundMessage, LoadOutcome,
    MaterialKind, RebuildPlan, Rgb, StaleLoadPolicy, Typeface, Viewer, ViewerOptions,
};
use serde_json::json;

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn builds_one_mesh_per_letter_with_default_material() {
    let viewer = ready_viewer("AB");
    let letters = viewer.letters();
    assert_eq!(letters.len(), 2);
    assert_eq!(letters[0].character, 'A');
    assert_eq!(letters[1].character, 'B');

    let blue = Rgb::from_hex("#3498db").unwrap();
    for letter in letters {
        assert!(!letter.mesh.is_empty());
        assert_eq!(letter.material.base_color, blue);
        assert_relative_eq!(letter.material.roughness, 0.7);
        assert_relative_eq!(letter.material.metalness, 0.0);
        assert!(!letter.material.transparent);
    }
    assert!(viewer.is_ready());
    assert!(viewer.panel().is_visible());
    assert!(!viewer.panel().is_loading());
}

#[test]
fn first_request_uses_default_font() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let req = expect_request(viewer.rebuild());
    assert_eq!(req.font.key, "helvetiker_bold");
    assert!(req.url().ends_with("helvetiker_bold.typeface.json"));
    assert_eq!(req.generation, 1);
    assert!(viewer.panel().is_loading());
    assert!(!viewer.panel().is_visible());
}

#[test]
fn spaces_produce_no_meshes_and_default_framing() {
    for text in ["   ", ""] {
        let viewer = ready_viewer(text);
        assert!(viewer.letters().is_empty());
        assert!(viewer.bounds().is_empty());
        assert!(close(viewer.camera().target, Vec3::ZERO));
        assert_relative_eq!(viewer.camera().distance(), 10.0);
        let ground = viewer.ground().unwrap();
        assert!(close(ground.center, Vec3::ZERO));
    }
}

#[test]
fn spaces_widen_the_run_without_meshes() {
    let tight = ready_viewer("II");
    let spaced = ready_viewer("I I");
    assert_eq!(spaced.letters().len(), 2);
    let w_tight = tight.bounds().size().x;
    let w_spaced = spaced.bounds().size().x;
    // height 2 * 0.5 per space
    assert_relative_eq!(w_spaced - w_tight, 1.0, epsilon = 1e-4);
}

#[test]
fn edge_spaces_do_not_shift_the_centering() {
    let plain = ready_viewer("AB");
    for text in ["AB ", " AB", "  AB  "] {
        let padded = ready_viewer(text);
        assert_eq!(padded.letters().len(), 2);
        assert!(close(padded.bounds().center(), plain.bounds().center()));
        assert_relative_eq!(padded.bounds().center().x, 0.0, epsilon = 1e-4);
    }
}

#[test]
fn only_the_space_character_is_blank() {
    let viewer = ready_viewer("A\tB");
    assert_eq!(viewer.letters().len(), 3);
    // A tab has no glyph of its own and falls back to '?'.
    assert_eq!(viewer.letters()[1].character, '\t');
    assert!(!viewer.letters()[1].mesh.is_empty());
}

#[test]
fn run_is_centered_and_camera_targets_its_center() {
    let viewer = ready_viewer("ABOI");
    let bounds = viewer.bounds();
    assert_relative_eq!(bounds.center().x, 0.0, epsilon = 1e-4);
    assert!(close(viewer.camera().target, bounds.center()));
    assert!(viewer.camera().distance() > bounds.max_dim());
}

#[test]
fn letters_do_not_overlap_and_keep_spacing() {
    let viewer = ready_viewer("AB");
    let a = viewer.letters()[0].bounds();
    let b = viewer.letters()[1].bounds();
    assert_relative_eq!(b.min.x - a.max.x, 0.1, epsilon = 1e-4);
}

#[test]
fn missing_glyph_falls_back_to_question_mark() {
    let viewer = ready_viewer("AZ");
    let question = ready_viewer("?");
    assert_eq!(viewer.letters().len(), 2);
    assert_eq!(viewer.letters()[1].character, 'Z');
    assert_eq!(viewer.letters()[1].mesh, question.letters()[0].mesh);
}

#[test]
fn missing_glyph_without_fallback_yields_empty_mesh() {
    let json = r#"{"glyphs":{"I":{"ha":400,"o":"m 100 0 l 100 1000 l 300 1000 l 300 0 z"}},"resolution":1000}"#;
    let typeface = Typeface::from_json(json).unwrap();
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("IZ"), viewport());
    let req = expect_request(viewer.rebuild());
    let outcome = viewer.complete_font_load(&req, Ok(typeface));
    assert_eq!(outcome, LoadOutcome::Rendered { first_ready: true });
    assert_eq!(viewer.letters().len(), 2);
    assert!(viewer.letters()[1].mesh.is_empty());
    assert!(!viewer.bounds().is_empty());
}

#[test]
fn cached_typeface_rebuilds_immediately() {
    let mut viewer = ready_viewer("AB");
    let geometry = viewer.geometry_revision();
    let change = viewer.set_letters("ABBA");
    assert!(change.warnings.is_empty());
    assert_eq!(
        change.plan,
        RebuildPlan::Immediate(LoadOutcome::Rendered { first_ready: false })
    );
    assert_eq!(viewer.letters().len(), 4);
    assert!(viewer.geometry_revision() > geometry);

    let change = viewer.set_font("droid_serif_bold");
    let req = expect_request(change.plan);
    assert_eq!(req.font.key, "droid_serif_bold");
}

#[test]
fn font_url_is_requested_verbatim() {
    let mut viewer = ready_viewer("AB");
    let url = "https://fonts.example.com/custom.typeface.json";
    let req = expect_request(viewer.set_font(url).plan);
    assert_eq!(req.url(), url);
}

#[test]
fn ready_fires_once() {
    let mut viewer = ready_viewer("AB");
    let change = viewer.set_dimensions(3.0, 1.0);
    assert_eq!(
        change.plan,
        RebuildPlan::Immediate(LoadOutcome::Rendered { first_ready: false })
    );
    assert_relative_eq!(viewer.config().height, 3.0);
    assert_relative_eq!(viewer.config().depth, 1.0);
}

#[test]
fn rejected_dimensions_keep_previous_values() {
    let mut viewer = ready_viewer("AB");
    let change = viewer.set_dimensions(-1.0, 0.0);
    assert_eq!(change.warnings.len(), 2);
    assert_relative_eq!(viewer.config().height, 2.0);
    assert_relative_eq!(viewer.config().depth, 0.6);
}

#[test]
fn initial_warnings_are_reported() {
    let update = ConfigUpdate {
        height: Some(-2.0),
        material: Some("stone".into()),
        ..Default::default()
    };
    let (viewer, warnings) = Viewer::new(ViewerOptions::default(), update, viewport());
    assert_eq!(warnings.len(), 2);
    assert_relative_eq!(viewer.config().height, 2.0);
    assert_eq!(viewer.config().material, MaterialKind::Plastic);
}

#[test]
fn last_completion_wins_by_default() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let first = expect_request(viewer.rebuild());
    let second = expect_request(viewer.set_font("droid_serif_bold").plan);
    assert_ne!(first.generation, second.generation);

    let a = viewer.complete_font_load(&first, Ok(mini_typeface()));
    assert_eq!(a, LoadOutcome::Rendered { first_ready: true });
    let b = viewer.complete_font_load(&second, Ok(mini_typeface()));
    assert_eq!(b, LoadOutcome::Rendered { first_ready: false });
}

#[test]
fn stale_loads_can_be_discarded() {
    let options = ViewerOptions {
        stale_loads: StaleLoadPolicy::DiscardStale,
        ..Default::default()
    };
    let (mut viewer, _) = Viewer::new(options, letters("AB"), viewport());
    let first = expect_request(viewer.rebuild());
    let second = expect_request(viewer.set_font("droid_serif_bold").plan);

    let stale = viewer.complete_font_load(&first, Ok(mini_typeface()));
    assert_eq!(stale, LoadOutcome::Ignored(IgnoreReason::Stale));
    assert!(viewer.letters().is_empty());
    assert!(!viewer.is_ready());

    let fresh = viewer.complete_font_load(&second, Ok(mini_typeface()));
    assert_eq!(fresh, LoadOutcome::Rendered { first_ready: true });
    assert_eq!(viewer.letters().len(), 2);
}

#[test]
fn failed_load_reports_and_keeps_panel_hidden() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let req = expect_request(viewer.rebuild());
    let outcome = viewer.complete_font_load(&req, Err("HTTP 404".into()));
    assert_eq!(outcome, LoadOutcome::Failed("HTTP 404".into()));
    assert_eq!(viewer.last_error(), Some("HTTP 404"));
    assert!(!viewer.panel().is_visible());
    assert!(!viewer.panel().is_loading());
    assert!(!viewer.is_ready());

    // Nothing was cached, so a retry fetches again.
    let retry = expect_request(viewer.rebuild());
    let outcome = viewer.complete_font_load(&retry, Ok(mini_typeface()));
    assert_eq!(outcome, LoadOutcome::Rendered { first_ready: true });
    assert_eq!(viewer.last_error(), None);
}

#[test]
fn superseded_failure_does_not_fail_the_viewer() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let first = expect_request(viewer.rebuild());
    let second = expect_request(viewer.set_font("droid_serif_bold").plan);

    let stale = viewer.complete_font_load(&first, Err("HTTP 500".into()));
    assert_eq!(stale, LoadOutcome::Ignored(IgnoreReason::Stale));
    assert_eq!(viewer.last_error(), None);
    assert!(viewer.panel().is_loading());

    let fresh = viewer.complete_font_load(&second, Ok(mini_typeface()));
    assert_eq!(fresh, LoadOutcome::Rendered { first_ready: true });
    assert_eq!(viewer.letters().len(), 2);

    // Late failures after a newer success are dropped as well.
    let third = expect_request(viewer.set_font("optimer_bold").plan);
    let fourth = expect_request(viewer.set_font("gentilis_bold").plan);
    viewer.complete_font_load(&fourth, Ok(mini_typeface()));
    let late = viewer.complete_font_load(&third, Err("timeout".into()));
    assert_eq!(late, LoadOutcome::Ignored(IgnoreReason::Stale));
    assert_eq!(viewer.letters().len(), 2);
}

#[test]
fn timeout_force_reveals_panel_once() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let req = expect_request(viewer.rebuild());
    assert!(viewer.loading_timed_out(req.generation));
    assert!(viewer.panel().is_visible());
    assert!(viewer.panel().is_loading());
    assert!(!viewer.loading_timed_out(req.generation));

    viewer.complete_font_load(&req, Ok(mini_typeface()));
    assert!(!viewer.panel().is_loading());
    assert!(!viewer.loading_timed_out(req.generation));
}

#[test]
fn timeout_for_superseded_rebuild_is_ignored() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let first = expect_request(viewer.rebuild());
    let _second = expect_request(viewer.rebuild());
    assert!(!viewer.loading_timed_out(first.generation));
    assert!(!viewer.panel().is_visible());
}

#[test]
fn dispose_is_idempotent_and_ignores_late_loads() {
    let (mut viewer, _) = Viewer::new(ViewerOptions::default(), letters("AB"), viewport());
    let req = expect_request(viewer.rebuild());
    assert!(viewer.dispose());
    assert!(!viewer.dispose());
    assert!(viewer.is_disposed());

    let late = viewer.complete_font_load(&req, Ok(mini_typeface()));
    assert_eq!(late, LoadOutcome::Ignored(IgnoreReason::Disposed));
    assert!(viewer.letters().is_empty());
    assert!(!viewer.is_ready());
    assert!(!viewer.loading_timed_out(req.generation));

    let change = viewer.set_letters("XYZ");
    assert_eq!(
        change.plan,
        RebuildPlan::Immediate(LoadOutcome::Ignored(IgnoreReason::Disposed))
    );
}

#[test]
fn dispose_releases_meshes() {
    let mut viewer = ready_viewer("AB");
    let geometry = viewer.geometry_revision();
    assert!(viewer.dispose());
    assert!(viewer.letters().is_empty());
    assert!(viewer.geometry_revision() > geometry);
    let frame = viewer.tick();
    assert_relative_eq!(frame.rotation, 0.0);
}

#[test]
fn material_updates_after_dispose_are_ignored() {
    let mut viewer = ready_viewer("AB");
    assert!(viewer.dispose());
    let material = viewer.material_revision();
    let config = viewer.config().clone();

    viewer.set_material("metal").unwrap();
    viewer.set_finish("Gold").unwrap();
    viewer.set_color("#00ff00").unwrap();
    assert!(viewer.set_multi_color(true, None).is_empty());
    viewer.set_led_lighting(true);

    assert_eq!(viewer.material_revision(), material);
    assert_eq!(viewer.config(), &config);
}

#[test]
fn render_fault_halts_once() {
    let mut viewer = ready_viewer("AB");
    viewer.set_animation(true);
    viewer.tick();
    let rotation = viewer.rotation();

    assert!(viewer.fault("rendering failed (Out of memory)"));
    assert!(!viewer.fault("rendering failed (Timeout)"));
    assert!(viewer.is_faulted());
    assert!(!viewer.is_animating());
    assert_eq!(viewer.last_error(), Some("rendering failed (Out of memory)"));

    viewer.set_animation(true);
    viewer.tick();
    assert_relative_eq!(viewer.rotation(), rotation);
}

#[test]
fn fault_after_dispose_is_not_reported() {
    let mut viewer = ready_viewer("AB");
    viewer.dispose();
    assert!(!viewer.fault("late"));
    assert!(!viewer.is_faulted());
}

#[test]
fn zoom_in_then_out_scales_distance() {
    let mut viewer = ready_viewer("AB");
    let d0 = viewer.camera().distance();
    viewer.zoom_in();
    assert_relative_eq!(viewer.camera().distance(), d0 * 0.8, epsilon = 1e-4);
    viewer.zoom_out();
    assert_relative_eq!(viewer.camera().distance(), d0 * 0.96, epsilon = 1e-4);
}

#[test]
fn zoom_never_goes_below_near_plane() {
    let mut viewer = ready_viewer("I");
    for _ in 0..100 {
        viewer.zoom_in();
    }
    assert!(viewer.camera().distance() >= Z_NEAR);
}

#[test]
fn animation_toggle_alternates() {
    let mut viewer = ready_viewer("AB");
    assert!(viewer.is_animating());
    assert!(!viewer.toggle_animation());
    assert!(viewer.toggle_animation());
    assert!(!viewer.toggle_animation());
    viewer.set_animation(true);
    assert!(viewer.is_animating());
}

#[test]
fn rotation_advances_only_while_animating() {
    let mut viewer = ready_viewer("AB");
    let frame = viewer.tick();
    assert_relative_eq!(frame.rotation, ROTATION_STEP_RAD);
    viewer.toggle_animation();
    viewer.tick();
    viewer.tick();
    assert_relative_eq!(viewer.rotation(), ROTATION_STEP_RAD);
}

#[test]
fn lights_toggle_between_two_presets() {
    let mut viewer = ready_viewer("AB");
    assert!(viewer.lights().is_on());
    assert!(!viewer.toggle_lights());
    assert_eq!(viewer.lights().intensities(), LIGHTS_DIM);
    assert!(viewer.toggle_lights());
    assert_eq!(viewer.lights().intensities(), LIGHTS_BRIGHT);
    viewer.set_lights(false);
    assert_eq!(viewer.lights().intensities(), LIGHTS_DIM);
}

#[test]
fn finish_overrides_material_without_rebuilding_geometry() {
    let mut viewer = ready_viewer("AB");
    let (geometry, material) = (viewer.geometry_revision(), viewer.material_revision());
    viewer.set_finish("Gold").unwrap();
    for letter in viewer.letters() {
        assert_eq!(letter.material.base_color, GOLD);
        assert_relative_eq!(letter.material.metalness, 1.0);
        assert_relative_eq!(letter.material.roughness, 0.25);
        assert!(letter.material.env_reflections);
    }
    assert_eq!(viewer.geometry_revision(), geometry);
    assert_eq!(viewer.material_revision(), material + 1);
}

#[test]
fn invalid_material_names_are_rejected() {
    let mut viewer = ready_viewer("AB");
    let err = viewer.set_material("unobtainium").unwrap_err();
    assert_eq!(err, ConfigError::UnknownMaterial("unobtainium".into()));
    assert_eq!(viewer.config().material, MaterialKind::Plastic);
    assert!(viewer.set_finish("Sparkly").is_err());
    assert!(viewer.set_material("GLASS").is_ok());
    assert!(viewer.letters()[0].material.transparent);
}

#[test]
fn color_updates_apply_to_every_letter() {
    let mut viewer = ready_viewer("AB");
    viewer.set_color("#00ff00").unwrap();
    for letter in viewer.letters() {
        assert_eq!(letter.material.base_color, Rgb::new(0, 255, 0));
    }
    let err = viewer.set_color("green").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidColor { field: "color", .. }));
    assert_eq!(viewer.config().color, Rgb::new(0, 255, 0));
}

#[test]
fn multi_color_overrides_take_precedence() {
    let mut viewer = ready_viewer("AB");
    let mut colors = BTreeMap::new();
    colors.insert("0".to_string(), "#ff0000".to_string());
    colors.insert("1".to_string(), "nope".to_string());
    let warnings = viewer.set_multi_color(true, Some(colors));
    assert_eq!(warnings.len(), 1);

    let red = Rgb::new(255, 0, 0);
    let blue = Rgb::from_hex("#3498db").unwrap();
    assert_eq!(viewer.letters()[0].material.base_color, red);
    assert_eq!(viewer.letters()[1].material.base_color, blue);

    viewer.set_finish("Gold").unwrap();
    assert_eq!(viewer.letters()[0].material.base_color, red);
    assert_eq!(viewer.letters()[1].material.base_color, GOLD);

    viewer.set_multi_color(false, None);
    assert_eq!(viewer.letters()[0].material.base_color, GOLD);
    assert!(viewer.config().letter_colors.contains_key("0"));
}

#[test]
fn host_colors_keyed_by_letter_apply() {
    let mut viewer = ready_viewer("AB");
    let msg = parse_inbound(json!({
        "type": "update_config",
        "config": { "multiColor": true, "letterColors": { "A": "#ff0000" } }
    }));
    let Some(InboundMessage::UpdateConfig { update, warnings }) = msg else {
        panic!("expected an update");
    };
    assert!(warnings.is_empty());
    let change = viewer.set_config(update);
    assert!(matches!(change.plan, RebuildPlan::Immediate(_)));
    assert_eq!(viewer.letters()[0].material.base_color, Rgb::new(255, 0, 0));
    assert_eq!(
        viewer.letters()[1].material.base_color,
        Rgb::from_hex("#3498db").unwrap()
    );
}

#[test]
fn led_lighting_makes_letters_emissive() {
    let mut viewer = ready_viewer("AB");
    assert_relative_eq!(viewer.letters()[0].material.emissive, 0.0);
    viewer.set_led_lighting(true);
    assert!(viewer.letters()[0].material.emissive > 0.0);
}

#[test]
fn reset_view_undoes_orbit_and_zoom() {
    let mut viewer = ready_viewer("AB");
    let target = viewer.camera().target;
    let distance = viewer.camera().distance();
    viewer.camera_mut().rotate(120.0, 40.0, 600.0);
    viewer.camera_mut().pan(50.0, 0.0, 600.0);
    for _ in 0..30 {
        viewer.camera_mut().update();
    }
    viewer.apply_action(ControlAction::ZoomIn);
    assert!(!close(viewer.camera().target, target));

    viewer.apply_action(ControlAction::ResetView);
    assert!(close(viewer.camera().target, target));
    assert_relative_eq!(viewer.camera().distance(), distance, epsilon = 1e-4);
}

#[test]
fn framing_follows_the_rotated_group() {
    let mut viewer = ready_viewer("ABOI");
    for _ in 0..200 {
        viewer.tick();
    }
    viewer.zoom_to_fit();
    assert!(close(viewer.camera().target, viewer.bounds().center()));
}

#[test]
fn panel_actions_drive_the_same_state() {
    let mut viewer = ready_viewer("AB");
    viewer.apply_action(ControlAction::ToggleRotation);
    assert!(!viewer.is_animating());
    viewer.apply_action(ControlAction::ToggleLights);
    assert!(!viewer.lights().is_on());
    let d = viewer.camera().distance();
    viewer.apply_action(ControlAction::ZoomOut);
    assert_relative_eq!(viewer.camera().distance(), d * 1.2, epsilon = 1e-4);
}

#[test]
fn resize_updates_aspect() {
    let mut viewer = ready_viewer("AB");
    viewer.on_resize(400, 400);
    assert_relative_eq!(viewer.camera().aspect, 1.0);
    assert_eq!(viewer.viewport().width, 400);
    viewer.on_resize(0, 0);
    assert!(viewer.camera().aspect.is_finite());
}

#[test]
fn ground_sits_just_below_the_letters() {
    let viewer = ready_viewer("I");
    let bounds = viewer.bounds();
    let ground = viewer.ground().unwrap();
    assert_relative_eq!(ground.center.y, bounds.min.y - 0.01, epsilon = 1e-5);
    assert!(ground.half_extent >= bounds.max_dim());

    let options = ViewerOptions {
        ground_plane: false,
        ..Default::default()
    };
    let viewer = ready_viewer_with(options, letters("I"));
    assert!(viewer.ground().is_none());
}
