use crate::error::{Error, Result};
use crate::tag::Tag;

/// Read cursor over a byte slice. All reads are little-endian.
///
/// The cursor never copies or truncates the underlying data; sub-blocks are
/// handed out as borrowed slices. `base` is the absolute file offset of
/// `data[0]` so error messages can point into the original file.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Cursor over a sub-slice that starts at absolute offset `base`.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Current byte position, relative to the start of this cursor's slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current absolute position in the file.
    pub fn absolute(&self) -> usize {
        self.base + self.pos
    }

    /// Total length of underlying data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Remaining bytes from current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Unread bytes, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a slice of `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a 4-byte block tag.
    pub fn read_tag(&mut self) -> Result<Tag> {
        Ok(Tag(self.read_array::<4>()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `n` bytes of latin1 text, dropping trailing NUL padding.
    pub fn read_latin1(&mut self, n: usize) -> Result<String> {
        Ok(latin1_trimmed(self.read_bytes(n)?))
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof {
                offset: self.absolute(),
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Decode latin1 bytes (every byte is one code point) and strip trailing NULs.
pub fn latin1_trimmed(bytes: &[u8]) -> String {
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    text.trim_end_matches('\0').to_string()
}
