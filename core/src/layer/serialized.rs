//! Serialized layer shape shared by the text and binary encodings.
//!
//! The arena is flattened into a nested prim tree so the encoded form reads
//! top-down and child order is explicit.
//!
//! Encoding refuses documents that decoding would reject (incomplete or
//! invalid mesh arrays, non-finite floats, metadata nested past
//! [`MAX_VALUE_DEPTH`]), so every layer that saves also opens.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SceneError};
use crate::scene::path::{self, ROOT_PATH};
use crate::scene::{attr, AttributeValue, Prim, PrimId, PrimKind, SceneDocument};

use super::nesting::{Nesting, NestingGuard, MAX_VALUE_DEPTH};
use super::value::Value;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SerializedLayer {
    #[serde(default)]
    pub custom_layer_data: BTreeMap<String, Value>,
    #[serde(default)]
    pub prims: Vec<SerializedPrim>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub(crate) struct SerializedPrim {
    pub name: String,
    pub kind: PrimKind,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub children: Vec<SerializedPrim>,
}

impl Serialize for SerializedPrim {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SerializedPrim::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for SerializedPrim {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let _level = NestingGuard::enter(Nesting::Prim)?;
        SerializedPrim::deserialize(deserializer)
    }
}

impl SerializedLayer {
    /// Flatten a document for encoding.
    pub fn from_document(doc: &SceneDocument) -> Result<Self> {
        for (key, value) in doc.custom_layer_data() {
            check_value(value, MAX_VALUE_DEPTH).map_err(|reason| {
                SceneError::Encode(format!("custom layer data {key:?}: {reason}"))
            })?;
        }
        let prims = doc
            .root_children()
            .iter()
            .map(|&id| SerializedPrim::from_document(doc, id))
            .collect::<Result<_>>()?;
        Ok(Self {
            custom_layer_data: doc.custom_layer_data().clone(),
            prims,
        })
    }

    /// Rebuild a document, rejecting content the document model would
    /// never produce.
    pub fn into_document(self) -> Result<SceneDocument> {
        for (key, value) in &self.custom_layer_data {
            check_value(value, MAX_VALUE_DEPTH).map_err(|reason| SceneError::Parse {
                reason,
                location: Some(format!("custom layer data {key:?}")),
            })?;
        }
        let mut doc = SceneDocument::new();
        for prim in self.prims {
            prim.insert_into(&mut doc, ROOT_PATH)?;
        }
        doc.set_custom_layer_data(self.custom_layer_data);
        Ok(doc)
    }
}

impl SerializedPrim {
    fn from_document(doc: &SceneDocument, id: PrimId) -> Result<Self> {
        let prim = doc
            .prim(id)
            .ok_or_else(|| SceneError::PrimNotFound(format!("#{}", id.index())))?;
        check_prim(doc, id, prim)
            .map_err(|reason| SceneError::Encode(format!("prim {}: {reason}", prim.path())))?;
        Ok(Self {
            name: prim.name().to_string(),
            kind: prim.kind(),
            attributes: prim
                .attributes()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            children: prim
                .children()
                .iter()
                .map(|&child| Self::from_document(doc, child))
                .collect::<Result<_>>()?,
        })
    }

    fn insert_into(self, doc: &mut SceneDocument, parent_path: &str) -> Result<()> {
        let prim_path = path::join(parent_path, &self.name);
        let at_prim = |reason: String| SceneError::Parse {
            reason,
            location: Some(format!("prim {prim_path}")),
        };

        path::check_name(&self.name)
            .map_err(|reason| at_prim(format!("invalid prim name {:?}: {reason}", self.name)))?;
        if doc.prim_at_path(&prim_path).is_some() {
            return Err(at_prim(format!("duplicate sibling name {:?}", self.name)));
        }

        let id = doc
            .define_prim(&prim_path, self.kind)
            .map_err(|e| at_prim(e.to_string()))?;
        for (name, value) in self.attributes {
            let geometry = attr::GEOMETRY.contains(&name.as_str());
            doc.set_attribute(id, &name, value).map_err(|e| {
                if geometry {
                    at_prim(format!("invalid mesh arrays: {e}"))
                } else {
                    at_prim(e.to_string())
                }
            })?;
        }
        if let Some(prim) = doc.prim(id) {
            check_prim(doc, id, prim).map_err(at_prim)?;
        }

        for child in self.children {
            child.insert_into(doc, &prim_path)?;
        }
        Ok(())
    }
}

/// Check what decoding would reject about a single prim.
fn check_prim(
    doc: &SceneDocument,
    id: PrimId,
    prim: &Prim,
) -> std::result::Result<(), String> {
    if prim.kind() == PrimKind::Mesh && doc.has_any_geometry(id) {
        doc.mesh_geometry(id)
            .map_err(|e| format!("invalid mesh arrays: {e}"))?;
    }
    for (name, value) in prim.attributes() {
        let finite = match value {
            AttributeValue::Double(x) => x.is_finite(),
            AttributeValue::Transform(t) => t
                .translation
                .iter()
                .chain(&t.rotation)
                .chain(&t.scale)
                .all(|c| c.is_finite()),
            _ => true,
        };
        if !finite {
            return Err(format!("attribute {name} holds a non-finite number"));
        }
    }
    Ok(())
}

/// Check a metadata value for non-finite floats and excess nesting.
/// `budget` is the number of levels still allowed, this one included.
fn check_value(value: &Value, budget: usize) -> std::result::Result<(), String> {
    if budget == 0 {
        return Err(format!("nested deeper than {MAX_VALUE_DEPTH} levels"));
    }
    match value {
        Value::Float(x) if !x.is_finite() => Err(format!("non-finite float {x}")),
        Value::List(items) => items.iter().try_for_each(|v| check_value(v, budget - 1)),
        Value::Map(map) => map.values().try_for_each(|v| check_value(v, budget - 1)),
        _ => Ok(()),
    }
}
