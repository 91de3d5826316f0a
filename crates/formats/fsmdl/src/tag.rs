use std::fmt;

/// Four-byte block tag, e.g. `RIFF` or `BGL `.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const RIFF: Self = Self(*b"RIFF");
    pub const MDL8: Self = Self(*b"MDL8");
    pub const MDLH: Self = Self(*b"MDLH");
    pub const FS80: Self = Self(*b"FS80");
    pub const DICT: Self = Self(*b"DICT");
    pub const BBOX: Self = Self(*b"BBOX");
    pub const ISFT: Self = Self(*b"ISFT");
    pub const BGL: Self = Self(*b"BGL ");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    /// Printable ASCII is shown as-is; anything else as `\xNN`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("'")?;
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        f.write_str("'")
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}
