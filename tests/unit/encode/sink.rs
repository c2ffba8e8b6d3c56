use super::*;

#[test]
fn in_memory_sink_keeps_saves_in_order() {
    let mut sink = InMemorySink::new();
    sink.save("a.png", &[1]).unwrap();
    sink.save("b.png", &[2, 3]).unwrap();
    assert_eq!(
        sink.saved(),
        &[("a.png".to_owned(), vec![1]), ("b.png".to_owned(), vec![2, 3])]
    );
}

#[test]
fn file_sink_creates_dir_and_writes() {
    let dir = PathBuf::from("target").join("sink_unit").join("nested");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = FileSink::new(&dir);
    sink.save("collage.png", b"png").unwrap();

    let path = dir.join("collage.png");
    assert_eq!(std::fs::read(&path).unwrap(), b"png");
    assert_eq!(sink.written(), &[path]);
}

#[test]
fn file_sink_rejects_paths_as_names() {
    let mut sink = FileSink::new(PathBuf::from("target").join("sink_unit"));
    for name in ["../escape.png", "sub/x.png", "..", ""] {
        let err = sink.save(name, b"x").unwrap_err();
        assert!(matches!(err, CollageError::Validation(_)), "{name}: {err}");
    }
    assert!(sink.written().is_empty());
}
