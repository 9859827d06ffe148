//! USD ASCII export.
//!
//! Writes a document as a `#usda 1.0` layer: custom layer data in the layer
//! header, then one `def` block per prim in traversal order. This is a
//! write-only export; primstage layers remain the round-trip format.

use std::collections::BTreeMap;

use crate::layer::Value;
use crate::scene::{attr, AttributeValue, NodeTransform, Prim, PrimId, SceneDocument};

/// Render a document as USD ASCII text.
pub fn export_usda(doc: &SceneDocument) -> String {
    let mut writer = UsdaWriter::default();
    writer.write_line("#usda 1.0");

    if !doc.custom_layer_data().is_empty() {
        writer.write_line("(");
        writer.indent += 1;
        writer.write_line("customLayerData = {");
        writer.indent += 1;
        writer.write_dictionary(doc.custom_layer_data());
        writer.indent -= 1;
        writer.write_line("}");
        writer.indent -= 1;
        writer.write_line(")");
    }

    for &id in doc.root_children() {
        writer.blank_line();
        writer.write_prim(doc, id);
    }

    log::debug!("Exported {} prims as USDA", doc.prim_count());
    writer.output
}

#[derive(Default)]
struct UsdaWriter {
    output: String,
    indent: usize,
}

impl UsdaWriter {
    fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn blank_line(&mut self) {
        self.output.push('\n');
    }

    fn write_prim(&mut self, doc: &SceneDocument, id: PrimId) {
        let Some(prim) = doc.prim(id) else {
            return;
        };
        self.write_line(&format!(
            "def {} \"{}\"",
            prim.kind().type_name(),
            escape_string(prim.name())
        ));
        self.write_line("{");
        self.indent += 1;

        self.write_attributes(prim);
        for &child in prim.children() {
            self.blank_line();
            self.write_prim(doc, child);
        }

        self.indent -= 1;
        self.write_line("}");
    }

    fn write_attributes(&mut self, prim: &Prim) {
        for (name, value) in prim.attributes() {
            match value {
                AttributeValue::Transform(transform) if name == attr::XFORM_OP => {
                    self.write_transform(transform);
                }
                _ => {
                    let line = attribute_line(name, value);
                    self.write_line(&line);
                }
            }
        }
    }

    fn write_transform(&mut self, t: &NodeTransform) {
        let [x, y, z, w] = t.rotation;
        self.write_line(&format!(
            "double3 xformOp:translate = {}",
            format_tuple(&t.translation)
        ));
        // USD quaternions are written real part first.
        self.write_line(&format!(
            "quatf xformOp:orient = {}",
            format_tuple(&[w, x, y, z])
        ));
        self.write_line(&format!(
            "float3 xformOp:scale = {}",
            format_tuple(&t.scale)
        ));
        self.write_line(
            "uniform token[] xformOpOrder = [\"xformOp:translate\", \"xformOp:orient\", \"xformOp:scale\"]",
        );
    }

    fn write_dictionary(&mut self, map: &BTreeMap<String, Value>) {
        for (key, value) in map {
            let key = escape_key(key);
            match value {
                Value::Map(inner) => {
                    self.write_line(&format!("dictionary {key} = {{"));
                    self.indent += 1;
                    self.write_dictionary(inner);
                    self.indent -= 1;
                    self.write_line("}");
                }
                Value::List(items) => {
                    let (type_name, rendered) = list_literal(items);
                    self.write_line(&format!("{type_name} {key} = {rendered}"));
                }
                scalar => {
                    let (type_name, rendered) = scalar_literal(scalar);
                    self.write_line(&format!("{type_name} {key} = {rendered}"));
                }
            }
        }
    }
}

fn attribute_line(name: &str, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Point3fArray(points) => {
            let items: Vec<String> = points.iter().map(|p| format_tuple(p)).collect();
            format!("point3f[] {name} = [{}]", items.join(", "))
        }
        AttributeValue::UIntArray(values) => {
            let items: Vec<String> = values.iter().map(u32::to_string).collect();
            format!("int[] {name} = [{}]", items.join(", "))
        }
        AttributeValue::Double(v) => format!("double {name} = {}", format_real(*v)),
        AttributeValue::Token(token) => {
            format!("token {name} = \"{}\"", escape_string(token))
        }
        AttributeValue::Orientation(o) => {
            format!("uniform token {name} = \"{}\"", o.as_token())
        }
        AttributeValue::SubdivisionScheme(s) => {
            format!("uniform token {name} = \"{}\"", s.as_token())
        }
        AttributeValue::Transform(t) => {
            // Only the reserved name maps onto xformOps.
            format!(
                "custom matrix4d {name} = {}",
                format_matrix(t)
            )
        }
    }
}

fn scalar_literal(value: &Value) -> (&'static str, String) {
    match value {
        Value::Bool(b) => ("bool", b.to_string()),
        Value::Int(i) => ("int", i.to_string()),
        Value::Float(f) => ("double", format_real(*f)),
        Value::String(s) => ("string", format!("\"{}\"", escape_string(s))),
        Value::List(items) => list_literal(items),
        Value::Map(_) => ("string", "\"\"".to_string()),
    }
}

/// Homogeneous lists become typed arrays, anything else a `string[]` of
/// rendered items.
fn list_literal(items: &[Value]) -> (&'static str, String) {
    let all = |pred: fn(&Value) -> bool| items.iter().all(pred);
    let (type_name, rendered): (&'static str, Vec<String>) =
        if !items.is_empty() && all(|v| matches!(v, Value::Int(_))) {
            ("int[]", items.iter().map(|v| scalar_literal(v).1).collect())
        } else if !items.is_empty() && all(|v| matches!(v, Value::Int(_) | Value::Float(_))) {
            (
                "double[]",
                items
                    .iter()
                    .map(|v| format_real(v.as_f64().unwrap_or_default()))
                    .collect(),
            )
        } else if !items.is_empty() && all(|v| matches!(v, Value::Bool(_))) {
            ("bool[]", items.iter().map(|v| scalar_literal(v).1).collect())
        } else {
            (
                "string[]",
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => format!("\"{}\"", escape_string(s)),
                        other => format!("\"{}\"", escape_string(&other.to_string())),
                    })
                    .collect(),
            )
        };
    (type_name, format!("[{}]", rendered.join(", ")))
}

/// Column-major TRS matrix, written row by row as USD expects.
fn format_matrix(t: &NodeTransform) -> String {
    use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3};

    let [x, y, z, w] = t.rotation.map(f64::from);
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));
    let translation = Vector3::from(t.translation.map(f64::from));
    let scale = Vector3::from(t.scale.map(f64::from));
    let matrix: Matrix4<f64> = Matrix4::new_translation(&translation)
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&scale);

    // USD uses row vectors, so the stored rows are the columns here.
    let rows: Vec<String> = matrix
        .column_iter()
        .map(|col| {
            let items: Vec<String> = col.iter().map(|v| format_real(*v)).collect();
            format!("({})", items.join(", "))
        })
        .collect();
    format!("( {} )", rows.join(", "))
}

fn format_tuple(values: &[f32]) -> String {
    let items: Vec<String> = values.iter().map(|v| format_float(*v)).collect();
    format!("({})", items.join(", "))
}

fn format_float(value: f32) -> String {
    if value == 0.0 {
        // Also folds -0.0.
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn format_real(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn escape_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':');
    if plain {
        key.to_string()
    } else {
        format!("\"{}\"", escape_string(key))
    }
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(c),
        }
    }
    result
}
