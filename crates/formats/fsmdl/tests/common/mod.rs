//! Byte builder for synthetic model files.

#![allow(dead_code)]

/// Writer that builds a byte buffer. All writes are little-endian.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Opcode word: opcode byte plus the unused second byte.
    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.bytes(&[opcode, 0])
    }

    /// `tag`, then a size backpatched after `body` has written the payload.
    pub fn block(&mut self, tag: &[u8; 4], body: impl FnOnce(&mut Self)) -> &mut Self {
        self.bytes(tag);
        let size_pos = self.position();
        self.u32(0);
        body(self);
        let size = (self.position() - size_pos - 4) as u32;
        self.buf[size_pos..size_pos + 4].copy_from_slice(&size.to_le_bytes());
        self
    }

    /// MDL8 header with the given radius and after-offsets pointer.
    pub fn mdl8(&mut self, radius: u32, after_offsets: u32) -> &mut Self {
        self.bytes(b"MDL8").bytes(b"MDLH").u32(32);
        self.u32(0).u32(0).u32(radius).u32(0).u32(0).u32(after_offsets);
        self.bytes(b"FS80").u32(2304)
    }

    /// One 28-byte DICT record.
    pub fn dict_record(
        &mut self,
        type_code: u32,
        offset: u32,
        size: u32,
        id: &[u8; 16],
    ) -> &mut Self {
        self.u32(type_code).u32(offset).u32(size).bytes(id)
    }

    /// One string continuation record carrying up to 24 bytes of text.
    pub fn dict_continuation(&mut self, text: &str) -> &mut Self {
        let mut payload = [0u8; 24];
        payload[..text.len()].copy_from_slice(text.as_bytes());
        self.u32(0).bytes(&payload)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Identifier bytes whose canonical form is `THROTTLE_ID`.
pub const THROTTLE_BYTES: [u8; 16] = [
    0x0d, 0xf0, 0xad, 0xba, 0x34, 0x12, 0x78, 0x56, 0x9a, 0xbc, 0xde, 0xf0, 0x11, 0x22, 0x33, 0x44,
];
pub const THROTTLE_ID: &str = "baadf00d-1234-5678-9abc-def011223344";
