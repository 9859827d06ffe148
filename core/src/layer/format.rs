//! Layer encodings.
//!
//! Text layers start with the [`TEXT_HEADER`] line followed by a pretty RON
//! body. Binary layers start with [`BINARY_MAGIC`] and a little-endian `u32`
//! format version followed by a bincode body.

use crate::error::{Result, SceneError};

use super::serialized::SerializedLayer;

/// First line of every text layer.
pub const TEXT_HEADER: &str = "#primstage 1.0";

/// Leading bytes of every binary layer.
pub const BINARY_MAGIC: &[u8; 8] = b"PSTGBIN\0";

/// Current binary format version.
pub const BINARY_VERSION: u32 = 1;

/// Supported layer encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerFormat {
    /// Human-readable, diffable text.
    #[default]
    Text,
    /// Compact binary.
    #[cfg(feature = "binary-layers")]
    Binary,
}

impl LayerFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            #[cfg(feature = "binary-layers")]
            Self::Binary => "binary",
        }
    }
}

/// Report which encoding a byte buffer uses, judging by its header.
pub fn detect_format(bytes: &[u8]) -> Option<LayerFormat> {
    if bytes.starts_with(TEXT_HEADER.as_bytes()) {
        return Some(LayerFormat::Text);
    }
    binary_format(bytes)
}

#[cfg(feature = "binary-layers")]
fn binary_format(bytes: &[u8]) -> Option<LayerFormat> {
    bytes
        .starts_with(BINARY_MAGIC)
        .then_some(LayerFormat::Binary)
}

#[cfg(not(feature = "binary-layers"))]
fn binary_format(_bytes: &[u8]) -> Option<LayerFormat> {
    None
}

pub(crate) fn encode(layer: &SerializedLayer, format: LayerFormat) -> Result<Vec<u8>> {
    match format {
        LayerFormat::Text => {
            let body = ron::ser::to_string_pretty(layer, ron::ser::PrettyConfig::default())
                .map_err(|e| SceneError::Encode(e.to_string()))?;
            Ok(format!("{TEXT_HEADER}\n{body}\n").into_bytes())
        }
        #[cfg(feature = "binary-layers")]
        LayerFormat::Binary => {
            let body =
                bincode::serialize(layer).map_err(|e| SceneError::Encode(e.to_string()))?;
            let mut bytes = Vec::with_capacity(BINARY_MAGIC.len() + 4 + body.len());
            bytes.extend_from_slice(BINARY_MAGIC);
            bytes.extend_from_slice(&BINARY_VERSION.to_le_bytes());
            bytes.extend_from_slice(&body);
            Ok(bytes)
        }
    }
}

pub(crate) fn decode(bytes: &[u8]) -> Result<SerializedLayer> {
    match detect_format(bytes) {
        Some(LayerFormat::Text) => decode_text(bytes),
        #[cfg(feature = "binary-layers")]
        Some(LayerFormat::Binary) => decode_binary(bytes),
        None if bytes.starts_with(BINARY_MAGIC) => Err(SceneError::parse(
            "binary layers are not supported by this build",
        )),
        None => Err(SceneError::Parse {
            reason: format!("unrecognized layer header, expected {TEXT_HEADER:?}"),
            location: Some("line 1, column 1".to_string()),
        }),
    }
}

fn decode_text(bytes: &[u8]) -> Result<SerializedLayer> {
    let text = std::str::from_utf8(bytes).map_err(|e| SceneError::Parse {
        reason: format!("layer is not valid UTF-8: {e}"),
        location: Some(format!("byte {}", e.valid_up_to())),
    })?;

    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    if header.trim_end() != TEXT_HEADER {
        return Err(SceneError::Parse {
            reason: format!("unsupported layer header {:?}", header.trim_end()),
            location: Some("line 1, column 1".to_string()),
        });
    }

    ron::de::from_str(body).map_err(|e| SceneError::Parse {
        reason: e.code.to_string(),
        // The header line is not part of the RON body.
        location: Some(format!(
            "line {}, column {}",
            e.position.line + 1,
            e.position.col
        )),
    })
}

#[cfg(feature = "binary-layers")]
fn decode_binary(bytes: &[u8]) -> Result<SerializedLayer> {
    let rest = &bytes[BINARY_MAGIC.len()..];
    let version = rest
        .get(..4)
        .and_then(|v| v.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| SceneError::Parse {
            reason: "truncated binary header".to_string(),
            location: Some(format!("byte {}", BINARY_MAGIC.len())),
        })?;
    if version != BINARY_VERSION {
        return Err(SceneError::Parse {
            reason: format!("unsupported binary layer version {version}"),
            location: Some(format!("byte {}", BINARY_MAGIC.len())),
        });
    }
    bincode::deserialize(&rest[4..]).map_err(|e| SceneError::Parse {
        reason: e.to_string(),
        location: None,
    })
}
