// Host-side tests for configuration parsing and merging.

use approx::assert_relative_eq;
use letter_core::{
    ColorKeying, ConfigError, ConfigUpdate, FinishKind, MaterialKind, OriginPolicy, Rgb,
    ViewerConfig,
};

#[test]
fn defaults_match_the_documented_configuration() {
    let config = ViewerConfig::default();
    assert_eq!(config.letters, "LOGO");
    assert_relative_eq!(config.height, 2.0);
    assert_relative_eq!(config.depth, 0.6);
    assert_eq!(config.material, MaterialKind::Plastic);
    assert_eq!(config.finish, FinishKind::Standard);
    assert_eq!(config.color, Rgb::new(0x34, 0x98, 0xdb));
    assert!(!config.multi_color);
    assert!(config.letter_colors.is_empty());
    assert_eq!(config.font, "helvetiker_bold");
    assert_relative_eq!(config.letter_spacing, 0.1);
    assert_eq!(config.background_color, Rgb::new(0xf0, 0xf0, 0xf0));
    assert!(!config.led_lighting);
    assert_eq!(config.color_keying, ColorKeying::Index);
}

#[test]
fn hex_colors_parse_in_both_lengths() {
    assert_eq!(Rgb::from_hex("#3498db"), Some(Rgb::new(0x34, 0x98, 0xdb)));
    assert_eq!(Rgb::from_hex("#3498DB"), Some(Rgb::new(0x34, 0x98, 0xdb)));
    assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::WHITE));
    assert_eq!(Rgb::from_hex("  #000 "), Some(Rgb::BLACK));
    assert_eq!(Rgb::from_hex("3498db"), None);
    assert_eq!(Rgb::from_hex("#12345"), None);
    assert_eq!(Rgb::from_hex("#ggg"), None);
    assert_eq!(Rgb::from_hex(""), None);
}

#[test]
fn linear_conversion_keeps_endpoints() {
    assert_eq!(Rgb::BLACK.to_linear(), [0.0, 0.0, 0.0]);
    let white = Rgb::WHITE.to_linear();
    for c in white {
        assert_relative_eq!(c, 1.0, epsilon = 1e-5);
    }
    let mid = Rgb::new(128, 128, 128).to_linear()[0];
    assert!(mid > 0.2 && mid < 0.25);
}

#[test]
fn json_update_uses_camel_case_fields() {
    let json = r##"{
        "letters": "HI",
        "height": 3,
        "multiColor": true,
        "letterColors": { "0": "#f00" },
        "backgroundColor": "#000000",
        "ledLighting": true,
        "someFutureField": 1
    }"##;
    let (update, decode_warnings) = ConfigUpdate::from_json(json).unwrap();
    assert!(decode_warnings.is_empty());
    let (config, warnings) = ViewerConfig::from_update(update);
    assert!(warnings.is_empty());
    assert_eq!(config.letters, "HI");
    assert_relative_eq!(config.height, 3.0);
    assert!(config.multi_color);
    assert_eq!(config.letter_colors.get("0"), Some(&Rgb::new(255, 0, 0)));
    assert_eq!(config.background_color, Rgb::BLACK);
    assert!(config.led_lighting);
}

#[test]
fn malformed_json_update_is_an_error() {
    let err = ConfigUpdate::from_json(r#"{"height": 3"#).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedMessage(_)));
}

#[test]
fn mistyped_json_fields_are_dropped_one_by_one() {
    let json = r##"{
        "letters": "OPEN",
        "height": "tall",
        "multiColor": "yes",
        "letterColors": ["#f00"],
        "color": "#00ff00",
        "depth": null
    }"##;
    let (update, warnings) = ConfigUpdate::from_json(json).unwrap();
    assert_eq!(update.letters.as_deref(), Some("OPEN"));
    assert_eq!(update.color.as_deref(), Some("#00ff00"));
    assert_eq!(update.height, None);
    assert_eq!(update.multi_color, None);
    assert_eq!(update.letter_colors, None);
    assert_eq!(update.depth, None);
    assert_eq!(warnings.len(), 3);
    assert!(warnings.contains(&ConfigError::InvalidNumber {
        field: "height",
        value: "\"tall\"".to_string(),
    }));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ConfigError::MalformedLetterColors(_))));

    let (config, warnings) = ViewerConfig::from_update(update);
    assert!(warnings.is_empty());
    assert_eq!(config.letters, "OPEN");
    assert_eq!(config.color, Rgb::new(0, 255, 0));
    assert_relative_eq!(config.height, ViewerConfig::default().height);
}

#[test]
fn invalid_fields_keep_previous_values() {
    let mut config = ViewerConfig::default();
    let warnings = config.merge(ConfigUpdate {
        height: Some(-1.0),
        depth: Some(f32::NAN),
        letter_spacing: Some(-0.5),
        color: Some("blue".into()),
        material: Some("stone".into()),
        finish: Some("Matte".into()),
        letters: Some("OK".into()),
        ..Default::default()
    });
    assert_eq!(warnings.len(), 6);
    assert_relative_eq!(config.height, 2.0);
    assert_relative_eq!(config.depth, 0.6);
    assert_relative_eq!(config.letter_spacing, 0.1);
    assert_eq!(config.color, Rgb::new(0x34, 0x98, 0xdb));
    assert_eq!(config.material, MaterialKind::Plastic);
    assert_eq!(config.finish, FinishKind::Standard);
    // Valid fields of the same update still apply.
    assert_eq!(config.letters, "OK");
}

#[test]
fn zero_spacing_is_allowed() {
    let mut config = ViewerConfig::default();
    let warnings = config.merge(ConfigUpdate {
        letter_spacing: Some(0.0),
        ..Default::default()
    });
    assert!(warnings.is_empty());
    assert_relative_eq!(config.letter_spacing, 0.0);
}

#[test]
fn absent_fields_leave_config_untouched() {
    let mut config = ViewerConfig::default();
    config.merge(ConfigUpdate {
        letters: Some("SIGN".into()),
        material: Some("metal".into()),
        ..Default::default()
    });
    let before = config.clone();
    let warnings = config.merge(ConfigUpdate::default());
    assert!(warnings.is_empty());
    assert_eq!(config, before);
}

#[test]
fn blank_font_selects_default() {
    let mut config = ViewerConfig::default();
    config.merge(ConfigUpdate {
        font: Some("optimer_bold".into()),
        ..Default::default()
    });
    assert_eq!(config.font, "optimer_bold");
    config.merge(ConfigUpdate {
        font: Some("   ".into()),
        ..Default::default()
    });
    assert_eq!(config.font, "helvetiker_bold");
}

#[test]
fn invalid_letter_colors_are_dropped_individually() {
    let mut config = ViewerConfig::default();
    let warnings = config.merge(ConfigUpdate {
        letter_colors: Some(
            [("0", "#ff0000"), ("1", "red"), ("2", "#00f")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        ..Default::default()
    });
    assert_eq!(warnings.len(), 1);
    assert_eq!(config.letter_colors.len(), 2);
    assert!(!config.letter_colors.contains_key("1"));
}

#[test]
fn query_pairs_seed_an_update() {
    let pairs = [
        ("letters", "OPEN 24"),
        ("height", "1.5"),
        ("depth", "0.25"),
        ("letterSpacing", "0"),
        ("material", "Wood"),
        ("finish", "Painted"),
        ("font", "gentilis_bold"),
        ("color", "#112233"),
        ("multiColor", "true"),
        ("ledLighting", "false"),
        ("colorKeying", "character"),
        ("letterColors", r##"{"O":"#ff0000"}"##),
        ("utm_source", "newsletter"),
    ];
    let (update, warnings) = ConfigUpdate::from_query_pairs(pairs);
    assert!(warnings.is_empty());
    let (config, warnings) = ViewerConfig::from_update(update);
    assert!(warnings.is_empty());
    assert_eq!(config.letters, "OPEN 24");
    assert_relative_eq!(config.height, 1.5);
    assert_relative_eq!(config.depth, 0.25);
    assert_relative_eq!(config.letter_spacing, 0.0);
    assert_eq!(config.material, MaterialKind::Wood);
    assert_eq!(config.finish, FinishKind::Painted);
    assert_eq!(config.font, "gentilis_bold");
    assert_eq!(config.color, Rgb::new(0x11, 0x22, 0x33));
    assert!(config.multi_color);
    assert!(!config.led_lighting);
    assert_eq!(config.color_keying, ColorKeying::Character);
    assert_eq!(config.letter_colors.get("O"), Some(&Rgb::new(255, 0, 0)));
}

#[test]
fn malformed_letter_colors_in_query_leave_map_empty() {
    let (update, warnings) =
        ConfigUpdate::from_query_pairs([("letterColors", "{not json"), ("multiColor", "true")]);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], ConfigError::MalformedLetterColors(_)));
    let (config, _) = ViewerConfig::from_update(update);
    assert!(config.multi_color);
    assert!(config.letter_colors.is_empty());
}

#[test]
fn unparseable_numbers_in_query_are_skipped() {
    let (update, warnings) = ConfigUpdate::from_query_pairs([("height", "tall"), ("depth", "1")]);
    assert_eq!(
        warnings,
        vec![ConfigError::InvalidNumber {
            field: "height",
            value: "tall".into()
        }]
    );
    assert_eq!(update.height, None);
    assert_eq!(update.depth, Some(1.0));
}

#[test]
fn color_keying_names() {
    assert_eq!("index".parse::<ColorKeying>().unwrap(), ColorKeying::Index);
    assert_eq!("Char".parse::<ColorKeying>().unwrap(), ColorKeying::Character);
    assert!("ordinal".parse::<ColorKeying>().is_err());
    assert_eq!(ColorKeying::Character.to_string(), "character");
}

#[test]
fn origin_policy_filters_hosts() {
    assert!(OriginPolicy::Any.accepts("https://anything.example"));
    let allow = OriginPolicy::AllowList(vec!["https://shop.example".into()]);
    assert!(allow.accepts("https://shop.example"));
    assert!(!allow.accepts("https://evil.example"));
}

#[test]
fn config_serializes_with_camel_case_keys() {
    let value = serde_json::to_value(ViewerConfig::default()).unwrap();
    assert_eq!(value["letters"], "LOGO");
    assert_eq!(value["color"], "#3498db");
    assert_eq!(value["letterSpacing"].as_f64().map(|v| (v * 10.0).round()), Some(1.0));
    assert_eq!(value["colorKeying"], "index");
}
