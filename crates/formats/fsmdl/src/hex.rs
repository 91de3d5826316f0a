//! Hex renderings used when serializing raw byte payloads.

use serde::Serializer;

/// Lowercase hex dump with no separators.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

pub(crate) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode(bytes))
}

/// Packed ARGB as `#aarrggbb`.
pub(crate) fn serialize_argb<S: Serializer>(argb: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("#{argb:08x}"))
}
