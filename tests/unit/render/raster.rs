use super::*;

fn rasterizer() -> Rasterizer {
    Rasterizer::new(Arc::new(usvg::fontdb::Database::new()), Rgba8::WHITE)
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

#[test]
fn raster_matches_declared_size_over_opaque_background() {
    let doc = Document::parse(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30"><rect x="0" y="0" width="10" height="10" fill="#ff0000"/></svg>"##,
    )
    .unwrap();
    let out = rasterizer().rasterize(&doc).unwrap();
    assert_eq!((out.width, out.height), (40, 30));

    let img = decode(&out.png);
    assert_eq!(img.dimensions(), (40, 30));
    assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(30, 20).0, [255, 255, 255, 255]);
}

#[test]
fn custom_background_fills_uncovered_pixels() {
    let doc =
        Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#).unwrap();
    let bg = Rgba8 {
        r: 0,
        g: 0,
        b: 255,
        a: 255,
    };
    let out = Rasterizer::new(Arc::new(usvg::fontdb::Database::new()), bg)
        .rasterize(&doc)
        .unwrap();
    assert_eq!(decode(&out.png).get_pixel(1, 1).0, [0, 0, 255, 255]);
}

#[test]
fn translucent_background_is_flattened_to_opaque() {
    let doc =
        Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg" width="3" height="3"/>"#).unwrap();
    let clear = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };
    let out = Rasterizer::new(Arc::new(usvg::fontdb::Database::new()), clear)
        .rasterize(&doc)
        .unwrap();
    let img = decode(&out.png);
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));

    let half = Rgba8 {
        r: 10,
        g: 200,
        b: 30,
        a: 64,
    };
    let out = Rasterizer::new(Arc::new(usvg::fontdb::Database::new()), half)
        .rasterize(&doc)
        .unwrap();
    assert_eq!(decode(&out.png).get_pixel(0, 0).0, [10, 200, 30, 255]);
}

#[test]
fn view_box_content_is_scaled_to_declared_size() {
    let doc = Document::parse(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 10 10"><rect width="5" height="5" fill="#000000"/></svg>"##,
    )
    .unwrap();
    let img = decode(&rasterizer().rasterize(&doc).unwrap().png);
    assert_eq!(img.get_pixel(8, 8).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(12, 12).0, [255, 255, 255, 255]);
}

#[test]
fn size_falls_back_to_view_box() {
    let doc = Document::parse(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 12 7"><rect width="1" height="1"/></svg>"#,
    )
    .unwrap();
    let out = rasterizer().rasterize(&doc).unwrap();
    assert_eq!((out.width, out.height), (12, 7));
}

#[test]
fn oversized_documents_are_rejected() {
    let doc = Document::parse(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="20000" height="10"><rect width="1" height="1"/></svg>"#,
    )
    .unwrap();
    let err = rasterizer().rasterize(&doc).unwrap_err();
    assert!(matches!(err, CollageError::Rasterization(_)), "{err}");
}

#[test]
fn px_bounds() {
    assert_eq!(to_px(10.2).unwrap(), 11);
    assert_eq!(to_px(16_384.0).unwrap(), MAX_DIM);
    assert!(to_px(0.0).is_err());
    assert!(to_px(-3.0).is_err());
    assert!(to_px(f64::NAN).is_err());
    assert!(to_px(16_384.5).is_err());
}

#[test]
fn external_images_are_not_drawn() {
    let doc = Document::parse(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="8" height="8"><image xlink:href="http://example.invalid/a.png" width="8" height="8"/></svg>"#,
    )
    .unwrap();
    let img = decode(&rasterizer().rasterize(&doc).unwrap().png);
    assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
}

#[test]
fn inline_images_are_drawn() {
    let red = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(red)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let href = crate::assets::data_url::encode_data_url(&png, None);

    let doc = Document::parse(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><image href="{href}" width="8" height="8" preserveAspectRatio="none"/></svg>"#
    ))
    .unwrap();
    let img = decode(&rasterizer().rasterize(&doc).unwrap().png);
    assert_eq!(img.get_pixel(4, 4).0, [255, 0, 0, 255]);
}
