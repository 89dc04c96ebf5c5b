// Host-side tests for the control panel and the host message codec.

use letter_core::bridge::{parse_inbound, parse_inbound_str, VIEWER_READY};
use letter_core::controls::{lights_label, rotation_label};
use letter_core::{
    ConfigError, ConfigUpdate, ControlAction, ControlPanel, InboundMessage, OutboundMessage,
    PanelVisibility, ReadyLatch,
};
use serde_json::json;

#[test]
fn actions_round_trip_through_element_ids() {
    for action in ControlAction::ALL {
        assert_eq!(action.element_id().parse::<ControlAction>(), Ok(action));
        assert!(!action.default_label().is_empty());
    }
    assert!("self-destruct".parse::<ControlAction>().is_err());
}

#[test]
fn toggle_labels_describe_the_next_action() {
    assert_eq!(rotation_label(true), "Pause Rotation");
    assert_eq!(rotation_label(false), "Resume Rotation");
    assert_eq!(lights_label(true), "Dim Lights");
    assert_eq!(lights_label(false), "Brighten Lights");
}

#[test]
fn panel_hides_while_loading_and_shows_after() {
    let mut panel = ControlPanel::new();
    assert_eq!(panel.visibility(), PanelVisibility::Hidden);
    panel.begin_loading(1);
    assert!(panel.is_loading());
    assert!(!panel.is_visible());
    panel.finish_loading();
    assert!(panel.is_visible());
    assert!(!panel.is_loading());

    panel.begin_loading(2);
    assert!(!panel.is_visible());
}

#[test]
fn failed_load_leaves_panel_hidden() {
    let mut panel = ControlPanel::new();
    panel.begin_loading(1);
    panel.fail_loading();
    assert!(!panel.is_loading());
    assert!(!panel.is_visible());
    assert!(!panel.loading_timed_out(1));
}

#[test]
fn timeout_reveals_only_the_current_load() {
    let mut panel = ControlPanel::new();
    panel.begin_loading(4);
    assert!(!panel.loading_timed_out(3));
    assert!(panel.loading_timed_out(4));
    assert!(panel.is_visible());
    assert!(panel.is_loading());
}

#[test]
fn update_config_message_decodes() {
    let msg = parse_inbound(json!({
        "type": "update_config",
        "config": { "letters": "SALE", "finish": "Chrome" }
    }));
    let Some(InboundMessage::UpdateConfig { update, warnings }) = msg else {
        panic!("expected an update");
    };
    assert!(warnings.is_empty());
    assert_eq!(update.letters.as_deref(), Some("SALE"));
    assert_eq!(update.finish.as_deref(), Some("Chrome"));
    assert_eq!(update.height, None);
}

#[test]
fn missing_or_null_config_is_an_empty_update() {
    for value in [
        json!({"type": "update_config"}),
        json!({"type": "update_config", "config": null}),
    ] {
        let Some(InboundMessage::UpdateConfig { update, warnings }) = parse_inbound(value) else {
            panic!("expected an update");
        };
        assert_eq!(update, ConfigUpdate::default());
        assert!(warnings.is_empty());
    }
}

#[test]
fn foreign_messages_are_ignored() {
    for value in [
        json!({"type": "resize", "width": 10}),
        json!({"config": {}}),
        json!({"type": 7}),
        json!("update_config"),
        json!([1, 2, 3]),
        json!(null),
    ] {
        assert_eq!(parse_inbound(value), None);
    }
}

#[test]
fn mistyped_field_is_dropped_and_the_rest_applies() {
    let msg = parse_inbound_str(
        r##"{"type":"update_config","config":{"letters":"NEW","height":"12","color":"#ff0000"}}"##,
    )
    .unwrap();
    let Some(InboundMessage::UpdateConfig { update, warnings }) = msg else {
        panic!("expected an update");
    };
    assert_eq!(update.letters.as_deref(), Some("NEW"));
    assert_eq!(update.color.as_deref(), Some("#ff0000"));
    assert_eq!(update.height, None);
    assert_eq!(
        warnings,
        vec![ConfigError::InvalidNumber {
            field: "height",
            value: "\"12\"".to_string(),
        }]
    );
}

#[test]
fn non_object_config_is_reported() {
    let Some(InboundMessage::UpdateConfig { update, warnings }) =
        parse_inbound(json!({"type": "update_config", "config": "SALE"}))
    else {
        panic!("expected an update");
    };
    assert_eq!(update, ConfigUpdate::default());
    assert!(matches!(warnings.as_slice(), [ConfigError::MalformedMessage(_)]));
}

#[test]
fn unparseable_message_text_is_an_error() {
    assert!(matches!(
        parse_inbound_str("{oops"),
        Err(ConfigError::MalformedMessage(_))
    ));
    assert_eq!(parse_inbound_str(r#"{"type":"ping"}"#).unwrap(), None);
}

#[test]
fn ready_message_shape() {
    let json = OutboundMessage::ViewerReady.to_json().unwrap();
    assert_eq!(json, format!(r#"{{"type":"{}"}}"#, VIEWER_READY));
}

#[test]
fn ready_latch_fires_once() {
    let mut latch = ReadyLatch::default();
    assert!(!latch.has_fired());
    assert!(latch.fire());
    assert!(!latch.fire());
    assert!(latch.has_fired());
}
