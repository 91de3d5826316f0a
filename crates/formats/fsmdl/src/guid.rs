//! Canonical formatting of 16-byte variable identifiers.
//!
//! The on-disk layout is the usual mixed-endian GUID: the first three groups
//! (4, 2 and 2 bytes) are little-endian integers, the last two (2 and 6 bytes)
//! are written in byte order.

/// Format 16 raw bytes as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` (lowercase).
pub fn format(bytes: &[u8; 16]) -> String {
    let d1 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let d2 = u16::from_le_bytes([bytes[4], bytes[5]]);
    let d3 = u16::from_le_bytes([bytes[6], bytes[7]]);
    let mut out = format!("{d1:08x}-{d2:04x}-{d3:04x}-");
    for b in &bytes[8..10] {
        out.push_str(&format!("{b:02x}"));
    }
    out.push('-');
    for b in &bytes[10..16] {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Lowercase form used for registry keys, so lookups are case-insensitive.
pub fn normalize(id: &str) -> String {
    id.trim().trim_start_matches('{').trim_end_matches('}').to_ascii_lowercase()
}
