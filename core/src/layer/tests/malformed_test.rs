//! Open must reject malformed layers with a parse error and surface storage
//! failures as I/O errors.

use primstage_storage::{MemoryStorage, StorageError};

use crate::error::SceneError;
use crate::layer::{LayerFormat, MAX_VALUE_DEPTH};
use crate::scene::SceneDocument;

use super::{cone_document, temp_dir};

fn open_bytes(bytes: &[u8]) -> SceneError {
    let storage = MemoryStorage::new();
    storage.insert("bad.pstage", bytes.to_vec());
    SceneDocument::open_from(&storage, "bad.pstage").unwrap_err()
}

fn expect_parse(err: SceneError) -> (String, Option<String>) {
    match err {
        SceneError::Parse { reason, location } => (reason, location),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_unknown_header() {
    let (reason, location) = expect_parse(open_bytes(b"#usda 1.0\n(\n)\n"));
    assert!(reason.contains("header"), "{reason}");
    assert_eq!(location.as_deref(), Some("line 1, column 1"));
}

#[test]
fn test_unsupported_text_version() {
    let (reason, _) = expect_parse(open_bytes(b"#primstage 1.0.9\n()\n"));
    assert!(reason.contains("unsupported layer header"), "{reason}");
}

#[test]
fn test_invalid_utf8() {
    let (reason, location) = expect_parse(open_bytes(b"#primstage 1.0\n(\xff\xfe)\n"));
    assert!(reason.contains("UTF-8"), "{reason}");
    assert_eq!(location.as_deref(), Some("byte 16"));
}

#[test]
fn test_syntax_error_reports_line() {
    let text = "#primstage 1.0\n(\n    prims: [\n        @\n    ],\n)\n";
    let (_, location) = expect_parse(open_bytes(text.as_bytes()));
    let location = location.expect("text errors carry a location");
    assert!(location.starts_with("line 4,"), "{location}");
}

#[test]
fn test_duplicate_siblings_rejected() {
    let text = r#"#primstage 1.0
(
    prims: [
        (name: "World", kind: Xform),
        (name: "World", kind: Xform),
    ],
)
"#;
    let (reason, location) = expect_parse(open_bytes(text.as_bytes()));
    assert!(reason.contains("duplicate"), "{reason}");
    assert_eq!(location.as_deref(), Some("prim /World"));
}

#[test]
fn test_invalid_prim_name_rejected() {
    let text = "#primstage 1.0\n(prims: [(name: \"a/b\", kind: Xform)])\n";
    let (reason, _) = expect_parse(open_bytes(text.as_bytes()));
    assert!(reason.contains("invalid prim name"), "{reason}");
}

#[test]
fn test_out_of_range_face_index_rejected() {
    let text = r#"#primstage 1.0
(
    prims: [
        (
            name: "Tri",
            kind: Mesh,
            attributes: {
                "points": Point3fArray([(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]),
                "faceVertexCounts": UIntArray([3]),
                "faceVertexIndices": UIntArray([0, 1, 9]),
            },
        ),
    ],
)
"#;
    let (reason, location) = expect_parse(open_bytes(text.as_bytes()));
    assert!(reason.contains("invalid mesh arrays"), "{reason}");
    assert_eq!(location.as_deref(), Some("prim /Tri"));
}

#[test]
fn test_non_finite_numbers_rejected() {
    let text = "#primstage 1.0\n(custom_layer_data: {\"ratio\": Float(NaN)})\n";
    let (reason, location) = expect_parse(open_bytes(text.as_bytes()));
    assert!(reason.contains("non-finite"), "{reason}");
    assert_eq!(location.as_deref(), Some("custom layer data \"ratio\""));

    let text = r#"#primstage 1.0
(prims: [(name: "World", kind: Xform, attributes: {"weight": Double(inf)})])
"#;
    let (reason, location) = expect_parse(open_bytes(text.as_bytes()));
    assert!(reason.contains("weight"), "{reason}");
    assert_eq!(location.as_deref(), Some("prim /World"));
}

#[test]
fn test_geometry_on_xform_rejected() {
    let text = r#"#primstage 1.0
(prims: [(name: "World", kind: Xform, attributes: {"points": Point3fArray([])})])
"#;
    expect_parse(open_bytes(text.as_bytes()));
}

#[cfg(feature = "binary-layers")]
#[test]
fn test_truncated_binary_body() {
    let bytes = cone_document().to_bytes(LayerFormat::Binary).unwrap();
    let truncated = &bytes[..bytes.len() - 10];
    expect_parse(open_bytes(truncated));
}

/// Binary layer header followed by `body`.
#[cfg(feature = "binary-layers")]
fn binary_layer(body: &[u8]) -> Vec<u8> {
    let mut bytes = crate::layer::BINARY_MAGIC.to_vec();
    bytes.extend_from_slice(&crate::layer::BINARY_VERSION.to_le_bytes());
    bytes.extend_from_slice(body);
    bytes
}

/// Hand-encoded bincode: one metadata entry `"k"` holding `lists` nested
/// single-element lists around `true`, and no prims.
#[cfg(feature = "binary-layers")]
fn nested_list_body(lists: usize) -> Vec<u8> {
    const LIST_VARIANT: u32 = 4;
    const BOOL_VARIANT: u32 = 0;
    let mut body = Vec::new();
    body.extend_from_slice(&1u64.to_le_bytes());
    body.extend_from_slice(&1u64.to_le_bytes());
    body.push(b'k');
    for _ in 0..lists {
        body.extend_from_slice(&LIST_VARIANT.to_le_bytes());
        body.extend_from_slice(&1u64.to_le_bytes());
    }
    body.extend_from_slice(&BOOL_VARIANT.to_le_bytes());
    body.push(1);
    body.extend_from_slice(&0u64.to_le_bytes());
    body
}

#[cfg(feature = "binary-layers")]
#[test]
fn test_deeply_nested_binary_metadata_rejected() {
    let bytes = binary_layer(&nested_list_body(200_000));
    let (reason, _) = expect_parse(open_bytes(&bytes));
    assert!(reason.contains("nested deeper"), "{reason}");

    // The same encoding within the limit decodes.
    let bytes = binary_layer(&nested_list_body(MAX_VALUE_DEPTH - 1));
    let doc = SceneDocument::from_bytes(&bytes).unwrap();
    assert!(doc.custom_layer_data().contains_key("k"));
}

#[cfg(feature = "binary-layers")]
#[test]
fn test_deeply_nested_binary_prims_rejected() {
    const XFORM_VARIANT: u32 = 0;
    let mut body = Vec::new();
    body.extend_from_slice(&0u64.to_le_bytes());
    // Each prim: name "n", kind Xform, no attributes, one child.
    for _ in 0..200_000 {
        body.extend_from_slice(&1u64.to_le_bytes());
        body.extend_from_slice(&1u64.to_le_bytes());
        body.push(b'n');
        body.extend_from_slice(&XFORM_VARIANT.to_le_bytes());
        body.extend_from_slice(&0u64.to_le_bytes());
    }
    body.extend_from_slice(&0u64.to_le_bytes());

    let (reason, _) = expect_parse(open_bytes(&binary_layer(&body)));
    assert!(reason.contains("nested deeper"), "{reason}");
}

#[cfg(feature = "binary-layers")]
#[test]
fn test_binary_garbage_after_header() {
    let bytes = binary_layer(&[0xff; 64]);
    expect_parse(open_bytes(&bytes));
}

#[test]
fn test_deeply_nested_text_metadata_rejected() {
    let depth = MAX_VALUE_DEPTH + 8;
    let value = format!("{}Bool(true){}", "List([".repeat(depth), "])".repeat(depth));
    let text = format!("#primstage 1.0\n(custom_layer_data: {{\"k\": {value}}})\n");
    let (reason, location) = expect_parse(open_bytes(text.as_bytes()));
    assert!(reason.contains("nested deeper"), "{reason}");
    assert!(location.is_some());
}

#[test]
fn test_missing_file_is_io_failure() {
    let storage = MemoryStorage::new();
    let err = SceneDocument::open_from(&storage, "nowhere.pstage").unwrap_err();
    assert!(matches!(
        err,
        SceneError::Io {
            source: StorageError::NotFound { .. },
            ..
        }
    ));

    let dir = temp_dir("missing");
    let err = SceneDocument::open(dir.join("absent.pstage")).unwrap_err();
    assert!(matches!(err, SceneError::Io { .. }));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_failed_save_leaves_no_file() {
    let dir = temp_dir("blocked");
    // A regular file where the destination directory should be.
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let err = cone_document()
        .save(blocker.join("cone.pstage"))
        .unwrap_err();
    assert!(matches!(err, SceneError::Io { .. }));
    assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_text_round_trip_of_text_layer_still_detected() {
    let bytes = cone_document().to_bytes(LayerFormat::Text).unwrap();
    assert!(SceneDocument::from_bytes(&bytes).is_ok());
}
