//! Human-readable reports printed by the CLI.
//!
//! Functions return strings so they can be tested; `main` does the printing.

use std::fmt::Write;

use primstage_core::inspect::{
    describe_hierarchy, metadata_entries, summarize_document, summarize_mesh,
};
use primstage_core::{LayerFormat, SceneDocument};

/// Facts about the file a document was read from.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub size: u64,
    pub format: Option<LayerFormat>,
}

/// Full report: hierarchy with mesh sizes, file info, metadata.
pub fn document_report(doc: &SceneDocument, file: Option<&FileInfo>) -> String {
    let mut out = String::new();
    if let Some(file) = file {
        let _ = writeln!(out, "Analyzing: {}", file.path);
        let _ = writeln!(out, "{}", "=".repeat(50));
    }

    out.push_str(&hierarchy_section(doc));

    if let Some(file) = file {
        let _ = writeln!(out);
        let _ = writeln!(out, "File Info:");
        let format = file.format.map_or("unknown", |f| f.name());
        let _ = writeln!(out, "  Format: {format}");
        let _ = writeln!(out, "  Size: {} bytes", file.size);
    }

    let metadata = metadata_entries(doc);
    if !metadata.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Metadata:");
        for (key, value) in metadata {
            let _ = writeln!(out, "  {key} = {value}");
        }
    }
    out
}

/// Indented prim listing with vertex/face counts under each mesh.
pub fn hierarchy_section(doc: &SceneDocument) -> String {
    let mut out = String::from("Scene Hierarchy:\n");
    for (entry, prim) in describe_hierarchy(doc).iter().zip(doc.traverse()) {
        let indent = "  ".repeat(entry.depth + 1);
        let _ = writeln!(out, "{indent}{} ({})", entry.name, entry.kind);
        if let Ok(mesh) = summarize_mesh(prim) {
            let _ = writeln!(
                out,
                "{indent}  └─ Vertices: {}, Faces: {}",
                mesh.vertex_count, mesh.face_count
            );
        }
    }
    out
}

/// One-paragraph confirmation after a generate command.
pub fn generated_summary(doc: &SceneDocument, path: &str, format: LayerFormat) -> String {
    let summary = summarize_document(doc);
    format!(
        "Created {path} ({} layer)\n  Prims: {}\n  Vertices: {}\n  Faces: {}\n",
        format.name(),
        summary.prim_count,
        summary.vertex_count,
        summary.face_count
    )
}
