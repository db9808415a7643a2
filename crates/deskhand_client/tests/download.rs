use std::fs;
use std::sync::Arc;

use deskhand_client::{
    disposition_filename, sanitize_filename, AtomicFileWriter, BinaryBody, DownloadStore,
};
use pretty_assertions::assert_eq;

fn body(bytes: &[u8], disposition: Option<&str>) -> BinaryBody {
    BinaryBody {
        bytes: bytes.to_vec().into(),
        content_disposition: disposition.map(|d| d.to_string()),
        content_type: None,
    }
}

fn fixed_stamp_store(dir: std::path::PathBuf) -> DownloadStore {
    DownloadStore::new(dir, Arc::new(|| "20260806-120000".to_string()))
}

#[test]
fn disposition_filename_handles_quoted_and_bare_values() {
    assert_eq!(
        disposition_filename("attachment; filename=\"export.zip\""),
        Some("export.zip".to_string())
    );
    assert_eq!(
        disposition_filename("attachment; filename=minutes.md"),
        Some("minutes.md".to_string())
    );
    assert_eq!(disposition_filename("inline"), None);
    assert_eq!(disposition_filename("attachment; filename=\"\""), None);
}

#[test]
fn sanitize_replaces_forbidden_characters() {
    assert_eq!(sanitize_filename("a/b\\c:d.zip"), "a_b_c_d.zip");
    assert_eq!(sanitize_filename("  ..weird..  "), "weird");
    assert_eq!(sanitize_filename("???"), "download");
}

#[test]
fn sanitize_guards_reserved_device_names() {
    assert_eq!(sanitize_filename("CON.md"), "CON_.md");
    assert_eq!(sanitize_filename("con"), "con_");
    assert_eq!(sanitize_filename("console.md"), "console.md");
}

#[test]
fn save_body_prefers_the_disposition_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = fixed_stamp_store(dir.path().to_path_buf());

    let path = store
        .save_body(
            &body(b"PK", Some("attachment; filename=\"export.zip\"")),
            "markdown_export",
            "zip",
        )
        .expect("save");
    assert_eq!(path.file_name().unwrap(), "export.zip");
    assert_eq!(fs::read(&path).unwrap(), b"PK");
}

#[test]
fn save_body_falls_back_to_a_timestamped_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = fixed_stamp_store(dir.path().to_path_buf());

    let path = store
        .save_body(&body(b"PK", None), "markdown_export", "zip")
        .expect("save");
    assert_eq!(
        path.file_name().unwrap(),
        "markdown_export_20260806-120000.zip"
    );
}

#[test]
fn save_named_sanitizes_server_proposed_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = fixed_stamp_store(dir.path().to_path_buf());

    let path = store
        .save_named("../escape.md", b"# summary")
        .expect("save");
    assert_eq!(path.file_name().unwrap(), "escape.md");
    assert!(path.starts_with(dir.path()));
}

#[test]
fn atomic_writer_replaces_existing_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());

    writer.write("out.zip", b"old").expect("first write");
    let path = writer.write("out.zip", b"new").expect("second write");
    assert_eq!(fs::read(&path).unwrap(), b"new");
}
