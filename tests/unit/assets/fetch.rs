use std::path::PathBuf;

use super::*;

fn scratch_file(name: &str, bytes: &[u8]) -> PathBuf {
    let dir = PathBuf::from("target").join("fetch_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn fetches_data_urls_inline() {
    let res = HttpFetcher::new().fetch("data:text/plain;base64,aGk=").unwrap();
    assert_eq!(res.bytes, b"hi");
    assert_eq!(res.content_type.as_deref(), Some("text/plain"));
}

#[test]
fn fetches_file_urls_and_bare_paths() {
    let path = scratch_file("bytes.bin", &[1, 2, 3]);
    let bare = path.to_string_lossy().to_string();

    let res = HttpFetcher::new().fetch(&bare).unwrap();
    assert_eq!(res.bytes, vec![1, 2, 3]);
    assert_eq!(res.content_type, None);

    let res = HttpFetcher::new().fetch(&format!("file://{bare}")).unwrap();
    assert_eq!(res.bytes, vec![1, 2, 3]);
}

#[test]
fn missing_file_is_an_asset_fetch_error() {
    let err = HttpFetcher::new()
        .fetch("target/fetch_unit/definitely-missing.png")
        .unwrap_err();
    match err {
        CollageError::AssetFetch { url, .. } => {
            assert_eq!(url, "target/fetch_unit/definitely-missing.png");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn long_locators_are_truncated_for_logs() {
    let long = format!("data:image/png;base64,{}", "A".repeat(500));
    let short = truncate_for_log(&long);
    assert!(short.len() < 110);
    assert!(short.ends_with("..."));
    assert_eq!(truncate_for_log("a.png"), "a.png");
}
