use super::*;

fn l(v: f64) -> Length {
    Length::Scalar(v)
}

#[test]
fn frame_grows_symmetrically_by_thickness() {
    for &(x, y, w, h) in &[
        (10.0, 10.0, 100.0, 80.0),
        (-5.0, 3.5, 0.0, 12.0),
        (0.0, 0.0, 1.0, 1.0),
    ] {
        for &t in &[0.0, 1.0, 3.0, 7.25] {
            let f = FrameSpec::around("t", &l(x), &l(y), &l(w), &l(h), t, None).unwrap();
            assert_eq!(f.origin.x, x - t);
            assert_eq!(f.origin.y, y - t);
            assert_eq!(f.size.width, w + 2.0 * t);
            assert_eq!(f.size.height, h + 2.0 * t);
        }
    }
}

#[test]
fn zero_thickness_matches_target() {
    let f = FrameSpec::around("t", &l(1.0), &l(2.0), &l(3.0), &l(4.0), 0.0, None).unwrap();
    assert_eq!(f.rect(), Rect::new(1.0, 2.0, 4.0, 6.0));
}

#[test]
fn list_lengths_use_first_component() {
    let f = FrameSpec::around(
        "note",
        &Length::List(vec![10.0, 99.0]),
        &Length::List(vec![20.0]),
        &l(50.0),
        &l(30.0),
        5.0,
        Some("#ff0000"),
    )
    .unwrap();
    assert_eq!(f.origin, Point::new(5.0, 15.0));
    assert_eq!(f.fill, "#ff0000");
    assert_eq!(f.id, "note_frame");
}

#[test]
fn negative_thickness_is_rejected() {
    assert!(FrameSpec::around("t", &l(0.0), &l(0.0), &l(1.0), &l(1.0), -1.0, None).is_err());
    assert!(FrameSpec::around("t", &l(0.0), &l(0.0), &l(1.0), &l(1.0), f64::NAN, None).is_err());
}

#[test]
fn created_element_is_detached_rect_with_style() {
    let mut doc = Document::new();
    let node = create_frame(
        &mut doc,
        "img1",
        &l(10.0),
        &l(10.0),
        &l(100.0),
        &l(80.0),
        3.0,
        None,
    )
    .unwrap();
    assert_eq!(doc.parent(node), None);

    let el = doc.element(node).unwrap();
    assert_eq!(el.tag(), "rect");
    assert_eq!(el.id(), Some("img1_frame"));
    assert_eq!(el.attr("x"), Some("7"));
    assert_eq!(el.attr("y"), Some("7"));
    assert_eq!(el.attr("width"), Some("106"));
    assert_eq!(el.attr("height"), Some("86"));
    assert_eq!(el.style_property("fill").as_deref(), Some(DEFAULT_FRAME_FILL));
    assert_eq!(el.style_property("stroke-linejoin").as_deref(), Some("round"));
    assert_eq!(el.style_property("stroke-dasharray").as_deref(), Some("none"));
}
