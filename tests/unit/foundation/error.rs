use super::*;

fn context() -> FrameContext {
    FrameContext {
        dataset: 3,
        circum: 120.5,
        scale: 0.25,
        width: 64,
        height: 48,
        render_threads: 4,
    }
}

#[test]
fn display_prefixes_are_stable() {
    let cases = [
        (MapPaintError::validation("x"), "validation error:"),
        (MapPaintError::resolve(PrimitiveId(7), "x"), "style resolution error:"),
        (MapPaintError::geometry("x"), "geometry error:"),
        (MapPaintError::paint("x"), "paint error:"),
        (MapPaintError::image("x"), "image error:"),
    ];
    for (err, prefix) in cases {
        assert!(err.to_string().starts_with(prefix), "{err}");
    }
}

#[test]
fn frame_wrapping_keeps_context_and_source() {
    let err = MapPaintError::paint("context lost").in_frame(context());
    let msg = err.to_string();
    assert!(msg.contains("frame aborted"));
    assert!(msg.contains("dataset=3"));
    assert!(msg.contains("render_threads=4"));
    assert!(msg.contains("context lost"));

    let again = err.in_frame(context());
    let MapPaintError::Frame { source, .. } = again else {
        panic!("expected frame error");
    };
    assert!(matches!(*source, MapPaintError::Paint(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MapPaintError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn panic_payloads_become_messages() {
    let payload = std::panic::catch_unwind(|| panic!("tile {} broke", 3)).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "tile 3 broke");
    let payload = std::panic::catch_unwind(|| panic!("static text")).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "static text");
    let payload = std::panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "unknown panic");
}
