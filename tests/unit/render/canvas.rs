use kurbo::Shape;

use super::*;

fn px(pixels: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
    let i = (y * width + x) * 4;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
fn background_and_rect_fill() {
    let area = ScreenRect::from_size(8, 8);
    let mut canvas = Canvas::new(area, Rgba8::rgb(0, 0, 255), true).unwrap();
    canvas.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Rgba8::rgb(255, 0, 0));
    let (pixels, width) = canvas.finish();
    assert_eq!(width, 8);
    assert_eq!(pixels.len(), 8 * 8 * 4);
    assert_eq!(px(&pixels, width, 0, 0), [0, 0, 255, 255]);
    assert_eq!(px(&pixels, width, 3, 3), [255, 0, 0, 255]);
    assert_eq!(px(&pixels, width, 7, 7), [0, 0, 255, 255]);
}

#[test]
fn shifted_canvas_renders_the_same_pixels() {
    let mut path = BezPath::new();
    path.move_to((1.3, 2.7));
    path.line_to((17.9, 11.2));
    path.line_to((4.4, 18.6));
    let stroke = StrokeStyle::new(2.5, LineCap::Round, LineJoin::Round, 10.0);
    let pattern = rgba_premul_to_image(&[255, 0, 0, 255, 0, 0, 255, 255], 2, 1).unwrap();

    let draw = |area: ScreenRect| {
        let mut c = Canvas::new(area, Rgba8::BLACK, true).unwrap();
        let orange = Ink::Color(Rgba8::rgba(200, 120, 40, 200));
        c.stroke(&path, orange, &stroke, false);
        c.fill(&path, Ink::Color(Rgba8::rgba(10, 200, 90, 128)), true, true);
        c.fill(
            &Rect::new(0.0, 14.0, 20.0, 20.0).to_path(0.1),
            Ink::Pattern(&pattern),
            false,
            true,
        );
        c.finish()
    };
    let (full, fw) = draw(ScreenRect::from_size(20, 20));
    let tile = ScreenRect::new(7, 5, 9, 11);
    let (part, pw) = draw(tile);
    assert_eq!(pw, 9);
    assert_eq!(part.len(), 9 * 11 * 4);
    for y in 0..11 {
        for x in 0..9 {
            let (sx, sy) = (x + 7, y + 5);
            let expected = px(&full, fw, sx, sy);
            assert_eq!(px(&part, pw, x, y), expected, "pixel {sx},{sy}");
        }
    }
}

#[test]
fn oversized_canvas_is_rejected() {
    assert!(Canvas::new(ScreenRect::from_size(70_000, 10), Rgba8::BLACK, true).is_err());
}

#[test]
fn image_wrapping_validates_length() {
    assert!(rgba_premul_to_image(&[0; 15], 2, 2).is_err());
    assert!(rgba_premul_to_image(&[0; 16], 2, 2).is_ok());
}
