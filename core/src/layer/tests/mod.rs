use crate::layer::Value;
use crate::mesh::{generate_cone, SubdivisionScheme, GENERATED_ORIENTATION};
use crate::scene::{PrimKind, SceneDocument};

mod malformed_test;

/// `/World` (Xform) holding a 5-point, 4-face cone at `/World/Cone`, with
/// `{"creator": "x", "parameters": {"resolution": 12}}` as layer data.
fn cone_document() -> SceneDocument {
    let mut doc = SceneDocument::new();
    doc.define_prim("/World", PrimKind::Xform).unwrap();
    let cone = doc.define_prim("/World/Cone", PrimKind::Mesh).unwrap();
    let buffer = generate_cone(4, 2.0, 1.0, false).unwrap();
    doc.set_mesh_attributes(cone, &buffer, GENERATED_ORIENTATION, SubdivisionScheme::None)
        .unwrap();
    doc.set_custom_layer_value("creator", "x");
    doc.set_custom_layer_value("parameters", Value::map([("resolution", 12)]));
    doc
}

/// Per-test scratch directory under the system temp dir.
fn temp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("primstage_layer_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
