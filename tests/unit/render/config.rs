use super::*;

#[test]
fn defaults_match_documented_values() {
    let c = RenderConfig::default();
    assert_eq!(c.render_threads, 1);
    assert_eq!(c.resolve_threads, 8);
    assert_eq!(c.lock_timeout(), Duration::from_secs(1));
    assert_eq!(c.fill_areas_distance, 10_000_000.0);
    assert_eq!(c.use_strokes_distance, 1_000_000.0);
    assert_eq!(c.max_node_size(), 5);
    assert!(c.fill_selected_node && c.fill_tagged_node);
    assert!(!c.fill_unselected_node && !c.fill_connection_node);
    assert!(c.validate().is_ok());
}

#[test]
fn partial_json_keeps_other_defaults() {
    let c = RenderConfig::from_json_str(
        r##"{ "render_threads": 4, "colors": { "background": "#102030" } }"##,
    )
    .unwrap();
    assert_eq!(c.render_threads, 4);
    assert_eq!(c.colors.background, Rgba8::rgb(0x10, 0x20, 0x30));
    assert_eq!(c.colors.selected, RenderColors::default().selected);
    assert_eq!(c.resolve_threads, 8);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = RenderConfig::from_json_str(r#"{ "render_thread": 4 }"#).unwrap_err();
    assert!(err.to_string().contains("invalid render config"));
}

#[test]
fn validation_rejects_bad_values() {
    let c = RenderConfig {
        resolve_threads: 0,
        ..RenderConfig::default()
    };
    assert!(c.validate().is_err());

    let c = RenderConfig {
        highlight_width: f32::NAN,
        ..RenderConfig::default()
    };
    assert!(c.validate().is_err());

    let c = RenderConfig {
        partial_fill_extent: Some(f32::INFINITY),
        ..RenderConfig::default()
    };
    assert!(c.validate().is_err());

    let c = RenderConfig {
        show_names_distance: f64::NAN,
        ..RenderConfig::default()
    };
    assert!(c.validate().is_err());
}

#[test]
fn render_thread_zero_uses_available_parallelism() {
    let c = RenderConfig {
        render_threads: 0,
        ..RenderConfig::default()
    };
    assert!(c.effective_render_threads() >= 1);
}

#[test]
fn frame_settings_follow_zoom() {
    let c = RenderConfig::default();
    let near = FrameSettings::new(&c, 100.0);
    assert!(near.draw_area && near.draw_multipolygon && near.use_strokes);
    assert!(near.show_names && near.show_icons && near.draw_restriction);

    let far = FrameSettings::new(&c, 20_000_000.0);
    assert!(!far.draw_area && !far.draw_multipolygon && !far.use_strokes);
    assert!(!far.show_names && !far.show_icons);

    let no_mp = RenderConfig {
        multipolygon: false,
        ..RenderConfig::default()
    };
    let s = FrameSettings::new(&no_mp, 100.0);
    assert!(s.draw_area && !s.draw_multipolygon);
}
