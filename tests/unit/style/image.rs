use std::io::Cursor;

use super::*;

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn target_size_rules() {
    assert_eq!(target_size(64, 64, None, None), (16, 16));
    assert_eq!(target_size(96, 48, None, None), (96, 48));
    assert_eq!(target_size(100, 50, None, None), (16, 8));
    assert_eq!(target_size(48, 48, None, None), (48, 48));
    assert_eq!(target_size(49, 49, None, None), (16, 16));
    assert_eq!(target_size(200, 48, None, None), (200, 48));
    assert_eq!(target_size(100, 60, None, None), (16, 10));
    assert_eq!(target_size(20, 10, Some(40), None), (40, 20));
    assert_eq!(target_size(20, 10, None, Some(5)), (10, 5));
    assert_eq!(target_size(20, 10, Some(3), Some(7)), (3, 7));
}

#[test]
fn pixels_are_premultiplied_and_disabled_variant_is_grey() {
    let img = MapImage::from_rgba8("px", 1, 1, vec![200, 0, 0, 128]).unwrap();
    let red = ((200u16 * 128 + 127) / 255) as u8;
    assert_eq!(img.pixels(), &[red, 0, 0, 128]);
    let d = img.disabled_pixels();
    assert_eq!(d[0], d[1]);
    assert_eq!(d[1], d[2]);
    assert_eq!(d[3], 128);
}

#[test]
fn large_png_is_rescaled_to_map_size() {
    let img = MapImage::decode("big.png", &png(64, 64, [0, 0, 255, 255]), None, None).unwrap();
    assert_eq!((img.width(), img.height()), (MAP_ICON_SIZE, MAP_ICON_SIZE));

    let sized = MapImage::decode("big.png", &png(64, 64, [0, 0, 255, 255]), Some(8), None).unwrap();
    assert_eq!((sized.width(), sized.height()), (8, 8));
}

#[test]
fn svg_is_rasterized_at_its_size() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
        <rect width="20" height="10" fill="red"/>
    </svg>"#;
    let img = MapImage::decode("icon", svg, None, None).unwrap();
    assert_eq!((img.width(), img.height()), (20, 10));
    assert_eq!(img.pixels().len(), 20 * 10 * 4);
    assert_eq!(&img.pixels()[..4], &[255, 0, 0, 255]);
}

#[test]
fn draw_origin_centres_the_image() {
    let img = MapImage::from_rgba8("o", 5, 3, vec![0; 60])
        .unwrap()
        .with_offset(1, 2);
    assert_eq!(img.draw_origin(), (-1, 1));
}

#[test]
fn undecodable_bytes_are_image_errors() {
    let err = MapImage::decode("bad.png", b"not an image", None, None).unwrap_err();
    assert!(err.to_string().contains("image error:"));

    let err = MapImage::from_rgba8("short", 2, 2, vec![0; 3]).unwrap_err();
    assert!(err.to_string().contains("expected 16"));
}
