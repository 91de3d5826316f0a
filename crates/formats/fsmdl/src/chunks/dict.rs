use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cursor::{latin1_trimmed, Cursor};
use crate::error::{Error, Result};
use crate::guid;
use crate::registry::VariableLookup;

/// Size of one DICT record: type, offset, size, 16-byte id.
pub const RECORD_SIZE: usize = 28;

/// Name given to bindings whose id is not in the registry.
pub const CUSTOM_NAME: &str = "custom";

/// Value type of a dictionary variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableType {
    Float32,
    Uint32,
    Uint16,
    Flags16,
    Sint16,
    Unknown,
}

impl VariableType {
    /// Map a non-zero on-disk type code. Code 0 is a string continuation and is
    /// handled before this is called.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Float32,
            2 => Self::Uint32,
            4 => Self::Uint16,
            6 => Self::Flags16,
            7 => Self::Sint16,
            _ => Self::Unknown,
        }
    }

    /// Fixed byte width, or `None` when the type has no known width.
    pub fn width(self) -> Option<u32> {
        match self {
            Self::Float32 | Self::Uint32 => Some(4),
            Self::Uint16 | Self::Flags16 | Self::Sint16 => Some(2),
            Self::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float32 => "FLOAT32",
            Self::Uint32 => "UINT32",
            Self::Uint16 => "UINT16",
            Self::Flags16 => "FLAGS16",
            Self::Sint16 => "SINT16",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DICT record bound to its variable metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableBinding {
    #[serde(rename = "type")]
    pub var_type: VariableType,
    /// Raw type code as stored in the file.
    pub type_code: u32,
    /// Offset of the variable's slot in the model's variable data area.
    pub offset: u32,
    /// Declared size of the slot in bytes.
    pub size: u32,
    /// Canonical identifier string.
    pub id: String,
    /// Text carried by continuation records that follow this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    pub name: String,
    pub description: String,
}

/// Parsed DICT chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dict {
    pub bindings: Vec<VariableBinding>,
}

impl Dict {
    /// Parse the DICT chunk.
    ///
    /// `chunk_data` is the raw chunk content (after the 8-byte header) and
    /// `data_offset` its absolute offset in the file.
    pub fn parse(
        chunk_data: &[u8],
        data_offset: usize,
        registry: &dyn VariableLookup,
    ) -> Result<Self> {
        if chunk_data.len() % RECORD_SIZE != 0 {
            return Err(Error::structural(
                "DICT",
                format!(
                    "payload length {} is not a multiple of {RECORD_SIZE}",
                    chunk_data.len()
                ),
            ));
        }

        let mut c = Cursor::with_base(chunk_data, data_offset);
        let mut bindings: Vec<VariableBinding> =
            Vec::with_capacity(chunk_data.len() / RECORD_SIZE);

        while !c.is_empty() {
            let record_offset = c.absolute();
            let type_code = c.read_u32()?;

            if type_code == 0 {
                let text = latin1_trimmed(c.read_bytes(RECORD_SIZE - 4)?);
                match bindings.last_mut() {
                    Some(prev) => prev.string.get_or_insert_with(String::new).push_str(&text),
                    // TODO: confirm against more files whether a leading continuation
                    // belongs to something outside this block.
                    None => warn!(
                        "DICT: dropping continuation text {text:?} at {record_offset:#x} \
                         with no preceding variable"
                    ),
                }
                continue;
            }

            let offset = c.read_u32()?;
            let size = c.read_u32()?;
            let id = guid::format(&c.read_array::<16>()?);
            let var_type = VariableType::from_code(type_code);

            if let Some(expected) = var_type.width() {
                if size != expected {
                    return Err(Error::TypeSizeMismatch {
                        id,
                        var_type,
                        declared: size,
                        expected,
                    });
                }
            }

            let (name, description) = match registry.lookup(&id) {
                Some(entry) => {
                    if entry.var_type != var_type {
                        return Err(Error::TypeMismatch {
                            id,
                            registered: entry.var_type,
                            decoded: var_type,
                        });
                    }
                    (entry.name.clone(), entry.description.clone())
                }
                None => (CUSTOM_NAME.to_string(), String::new()),
            };

            bindings.push(VariableBinding {
                var_type,
                type_code,
                offset,
                size,
                id,
                string: None,
                name,
                description,
            });
        }

        Ok(Self { bindings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, RegistryEntry};

    const ID_BYTES: [u8; 16] = [
        0x78, 0x56, 0x34, 0x12, 0xbc, 0x9a, 0xf0, 0xde, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x08,
    ];
    const ID: &str = "12345678-9abc-def0-0102-030405060708";

    fn record(type_code: u32, offset: u32, size: u32, id: &[u8; 16]) -> Vec<u8> {
        let mut out = Vec::with_capacity(RECORD_SIZE);
        out.extend_from_slice(&type_code.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(id);
        out
    }

    fn continuation(text: &str) -> Vec<u8> {
        let mut out = vec![0u8; RECORD_SIZE];
        out[4..4 + text.len()].copy_from_slice(text.as_bytes());
        out
    }

    #[test]
    fn continuation_text_is_concatenated_in_order() {
        let mut data = record(2, 0x10, 4, &ID_BYTES);
        data.extend(continuation("Hello, "));
        data.extend(continuation("world"));

        let dict = Dict::parse(&data, 0, &Registry::new()).unwrap();
        assert_eq!(dict.bindings.len(), 1);
        let b = &dict.bindings[0];
        assert_eq!(b.var_type, VariableType::Uint32);
        assert_eq!(b.offset, 0x10);
        assert_eq!(b.id, ID);
        assert_eq!(b.string.as_deref(), Some("Hello, world"));
        assert_eq!(b.name, CUSTOM_NAME);
        assert_eq!(b.description, "");
    }

    #[test]
    fn continuation_attaches_to_latest_binding_only() {
        let mut data = record(1, 0, 4, &ID_BYTES);
        data.extend(record(7, 4, 2, &[0xAA; 16]));
        data.extend(continuation("flaps"));

        let dict = Dict::parse(&data, 0, &Registry::new()).unwrap();
        assert_eq!(dict.bindings.len(), 2);
        assert_eq!(dict.bindings[0].string, None);
        assert_eq!(dict.bindings[1].string.as_deref(), Some("flaps"));
    }

    #[test]
    fn leading_continuation_is_dropped() {
        let mut data = continuation("orphan");
        data.extend(record(4, 0, 2, &ID_BYTES));

        let dict = Dict::parse(&data, 0, &Registry::new()).unwrap();
        assert_eq!(dict.bindings.len(), 1);
        assert_eq!(dict.bindings[0].string, None);
    }

    #[test]
    fn declared_size_must_match_type_width() {
        let data = record(2, 0, 2, &ID_BYTES);
        match Dict::parse(&data, 0, &Registry::new()) {
            Err(Error::TypeSizeMismatch {
                var_type,
                declared,
                expected,
                ..
            }) => {
                assert_eq!(var_type, VariableType::Uint32);
                assert_eq!(declared, 2);
                assert_eq!(expected, 4);
            }
            other => panic!("expected size mismatch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_skips_size_check() {
        let data = record(9, 0, 12, &ID_BYTES);
        let dict = Dict::parse(&data, 0, &Registry::new()).unwrap();
        assert_eq!(dict.bindings[0].var_type, VariableType::Unknown);
        assert_eq!(dict.bindings[0].type_code, 9);
        assert_eq!(dict.bindings[0].size, 12);
    }

    #[test]
    fn registry_supplies_name_and_description() {
        let registry: Registry = [(
            ID.to_uppercase(),
            RegistryEntry {
                name: "GENERAL ENG THROTTLE LEVER POSITION".into(),
                var_type: VariableType::Float32,
                description: "Percent of max throttle".into(),
            },
        )]
        .into_iter()
        .collect();

        let dict = Dict::parse(&record(1, 8, 4, &ID_BYTES), 0, &registry).unwrap();
        assert_eq!(dict.bindings[0].name, "GENERAL ENG THROTTLE LEVER POSITION");
        assert_eq!(dict.bindings[0].description, "Percent of max throttle");
    }

    #[test]
    fn registry_type_disagreement_is_fatal() {
        let registry: Registry = [(
            ID,
            RegistryEntry {
                name: "X".into(),
                var_type: VariableType::Float32,
                description: String::new(),
            },
        )]
        .into_iter()
        .collect();

        let err = Dict::parse(&record(6, 0, 2, &ID_BYTES), 0, &registry).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                registered: VariableType::Float32,
                decoded: VariableType::Flags16,
                ..
            }
        ));
    }

    #[test]
    fn ragged_payload_is_structural() {
        let err = Dict::parse(&[0u8; 30], 0, &Registry::new()).unwrap_err();
        assert!(matches!(err, Error::Structural { context: "DICT", .. }));
    }
}
