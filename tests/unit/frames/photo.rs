use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use kurbo::{Affine, Point};

use super::*;
use crate::assets::data_url::encode_data_url;
use crate::assets::fetch::{FetchedResource, HttpFetcher};
use crate::foundation::transform::parse_transform;

struct NoFetch;

impl ResourceFetcher for NoFetch {
    fn fetch(&self, url: &str) -> CollageResult<FetchedResource> {
        Err(CollageError::asset_fetch(url, "network disabled in tests"))
    }
}

/// Serves one PNG for every URL and counts the calls.
struct CountingFetcher {
    png: Vec<u8>,
    calls: AtomicUsize,
}

impl ResourceFetcher for CountingFetcher {
    fn fetch(&self, _url: &str) -> CollageResult<FetchedResource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedResource::new(self.png.clone(), Some("image/png".to_owned())))
    }
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, vec![255u8; (w * h * 4) as usize]).unwrap();
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn doc_with(body: &str) -> Document {
    Document::parse(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="300" height="200">
  <defs id="defs">
    <clipPath id="none-inside"><circle r="5"/></clipPath>
    <clipPath id="one"><rect x="20" y="30" width="40" height="50" transform="translate(5,0)"/></clipPath>
    <clipPath id="two"><rect width="1" height="1"/><rect width="2" height="2"/></clipPath>
  </defs>
  <g id="photos">{body}</g>
</svg>"##
    ))
    .unwrap()
}

fn frame_attrs(doc: &Document, id: &str) -> (String, String, String, String, Affine) {
    let n = doc.get_element_by_id(id).unwrap();
    let el = doc.element(n).unwrap();
    let get = |k: &str| el.attr(k).unwrap().to_owned();
    (
        get("x"),
        get("y"),
        get("width"),
        get("height"),
        parse_transform(el.attr("transform")).unwrap(),
    )
}

#[test]
fn unclipped_image_gets_frame_of_own_bounds() {
    let mut doc = doc_with(
        r#"<image id="img" href="a.png" x="10" y="10" width="100" height="80" transform="rotate(5)"/>"#,
    );
    let frames = PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut doc, "photos")
        .unwrap();
    assert_eq!(frames.len(), 1);

    let (x, y, w, h, t) = frame_attrs(&doc, "img_frame");
    assert_eq!((x.as_str(), y.as_str(), w.as_str(), h.as_str()), ("7", "7", "106", "86"));
    assert_eq!(t, parse_transform(Some("rotate(5)")).unwrap());
}

#[test]
fn frame_is_inserted_immediately_before_image() {
    let mut doc = doc_with(
        r#"<rect id="before"/><image id="img" href="a.png" width="1" height="1"/><rect id="after"/>"#,
    );
    PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut doc, "photos")
        .unwrap();

    let layer = doc.layer("photos").unwrap();
    let ids: Vec<_> = doc
        .element_children(layer)
        .map(|n| doc.id_or_synthetic(n))
        .collect();
    assert_eq!(ids, ["before", "img_frame", "img", "after"]);
}

#[test]
fn single_rect_clip_uses_rect_bounds_and_composed_transform() {
    let mut doc = doc_with(
        r#"<image id="img" href="a.png" x="0" y="0" width="500" height="500" clip-path="url(#one)" transform="scale(2)"/>"#,
    );
    PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut doc, "photos")
        .unwrap();

    let (x, y, w, h, t) = frame_attrs(&doc, "img_frame");
    assert_eq!((x.as_str(), y.as_str(), w.as_str(), h.as_str()), ("17", "27", "46", "56"));

    // Clip rect transform applies first, then the image's.
    assert_eq!(t, Affine::scale(2.0) * Affine::translate((5.0, 0.0)));
    assert_eq!(t * Point::new(20.0, 30.0), Point::new(50.0, 60.0));
}

#[test]
fn clip_without_rects_behaves_like_no_clip() {
    let mut clipped = doc_with(
        r#"<image id="img" href="a.png" x="1" y="2" width="3" height="4" clip-path="url(#none-inside)"/>"#,
    );
    let mut plain =
        doc_with(r#"<image id="img" href="a.png" x="1" y="2" width="3" height="4"/>"#);

    PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut clipped, "photos")
        .unwrap();
    PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut plain, "photos")
        .unwrap();
    assert_eq!(
        frame_attrs(&clipped, "img_frame"),
        frame_attrs(&plain, "img_frame")
    );
}

#[test]
fn clip_with_two_rects_is_ambiguous() {
    let mut doc = doc_with(
        r#"<image id="img" href="photos/beach.jpg" width="1" height="1" clip-path="url(#two)"/>"#,
    );
    let err = PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut doc, "photos")
        .unwrap_err();
    match err {
        CollageError::AmbiguousClip { source_url } => assert_eq!(source_url, "photos/beach.jpg"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_or_dangling_clip_is_invalid() {
    for clip in ["#one", "url(one)", "url(#missing)"] {
        let mut doc = doc_with(&format!(
            r#"<image id="img" href="b.jpg" width="1" height="1" clip-path="{clip}"/>"#
        ));
        let err = PhotoFramer::new(3.0, &NoFetch)
            .apply(&mut doc, "photos")
            .unwrap_err();
        assert!(
            matches!(&err, CollageError::InvalidClipReference { source_url, .. } if source_url == "b.jpg"),
            "clip {clip}: {err}"
        );
    }
}

#[test]
fn clip_reference_syntax() {
    assert_eq!(parse_clip_ref("url(#a)"), Some("a"));
    assert_eq!(parse_clip_ref(" url( '#a' ) "), Some("a"));
    assert_eq!(parse_clip_ref(r##"url("#clip-1")"##), Some("clip-1"));
    assert_eq!(parse_clip_ref("url(#)"), None);
    assert_eq!(parse_clip_ref("url(a)"), None);
    assert_eq!(parse_clip_ref("a"), None);
}

#[test]
fn undeclared_size_is_decoded_before_framing() {
    let img = image::RgbaImage::from_raw(4, 2, vec![255u8; 4 * 2 * 4]).unwrap();
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let href = encode_data_url(&png, None);

    let mut doc = doc_with(&format!(r#"<image id="img" x="10" y="10" href="{href}"/>"#));
    PhotoFramer::new(1.0, &HttpFetcher::new())
        .apply(&mut doc, "photos")
        .unwrap();

    let (x, y, w, h, _) = frame_attrs(&doc, "img_frame");
    assert_eq!((x.as_str(), y.as_str(), w.as_str(), h.as_str()), ("9", "9", "6", "4"));
    let n = doc.get_element_by_id("img").unwrap();
    assert_eq!(doc.element(n).unwrap().attr("width"), Some("4"));
}

#[test]
fn decoded_remote_image_is_inlined_with_fetched_bytes() {
    let fetcher = CountingFetcher {
        png: png(3, 5),
        calls: AtomicUsize::new(0),
    };
    let mut doc = doc_with(r#"<image id="img" xlink:href="https://cdn.example/a.png"/>"#);
    PhotoFramer::new(1.0, &fetcher)
        .apply(&mut doc, "photos")
        .unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    let el = doc.element(doc.get_element_by_id("img").unwrap()).unwrap();
    assert_eq!((el.attr("width"), el.attr("height")), (Some("3"), Some("5")));
    assert_eq!(el.href(), Some(encode_data_url(&fetcher.png, Some("image/png")).as_str()));
}

#[test]
fn sized_images_are_not_fetched_while_framing() {
    let fetcher = CountingFetcher {
        png: png(1, 1),
        calls: AtomicUsize::new(0),
    };
    let mut doc = doc_with(
        r#"<image id="img" xlink:href="https://cdn.example/a.png" width="10" height="10"/>"#,
    );
    PhotoFramer::new(1.0, &fetcher)
        .apply(&mut doc, "photos")
        .unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    let el = doc.element(doc.get_element_by_id("img").unwrap()).unwrap();
    assert_eq!(el.href(), Some("https://cdn.example/a.png"));
}

#[test]
fn missing_layer_frames_nothing() {
    let mut doc = Document::new();
    let frames = PhotoFramer::new(3.0, &NoFetch)
        .apply(&mut doc, "photos")
        .unwrap();
    assert!(frames.is_empty());
}
