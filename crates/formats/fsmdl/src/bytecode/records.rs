use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Bytes in one MATERIAL_LIST entry (17 × f32).
pub const MATERIAL_RECORD_SIZE: usize = 68;
/// Bytes in one TEXTURE_LIST entry.
pub const TEXTURE_RECORD_SIZE: usize = 80;
/// Width of the NUL-padded texture file name.
pub const TEXTURE_NAME_SIZE: usize = 64;
/// Header, length and radius fields at the start of a CRASH_START record.
pub const CRASH_START_PREFIX: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            r: c.read_f32()?,
            g: c.read_f32()?,
            b: c.read_f32()?,
            a: c.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRecord {
    pub diffuse: Rgba,
    pub ambient: Rgba,
    pub specular: Rgba,
    pub emissive: Rgba,
    pub power: f32,
}

impl MaterialRecord {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            diffuse: Rgba::read(c)?,
            ambient: Rgba::read(c)?,
            specular: Rgba::read(c)?,
            emissive: Rgba::read(c)?,
            power: c.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureRecord {
    pub category: u32,
    /// Color used when the texture cannot be loaded, packed ARGB.
    #[serde(serialize_with = "crate::hex::serialize_argb")]
    pub fallback_color: u32,
    pub size: f32,
    pub name: String,
}

impl TextureRecord {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let category = c.read_u32()?;
        let fallback_color = c.read_u32()?;
        expect_zero_u32(c, "TEXTURE_LIST", "texture reserved")?;
        let size = c.read_f32()?;
        let name = c.read_latin1(TEXTURE_NAME_SIZE)?;
        Ok(Self {
            category,
            fallback_color,
            size,
            name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrashStart {
    /// Total record length, including the 6-byte prefix.
    pub length: u16,
    pub ground_radius: u16,
    /// Crash geometry, kept opaque.
    #[serde(serialize_with = "crate::hex::serialize")]
    pub data: Vec<u8>,
}

impl CrashStart {
    /// Read the record body; the cursor must sit just past the 2-byte header.
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let offset = c.absolute();
        let length = c.read_u16()?;
        if (length as usize) < CRASH_START_PREFIX {
            return Err(Error::structural(
                "CRASH_START",
                format!("record length {length} at {offset:#x} is shorter than its own prefix"),
            ));
        }
        let ground_radius = c.read_u16()?;
        let data = c.read_bytes(length as usize - CRASH_START_PREFIX)?.to_vec();
        Ok(Self {
            length,
            ground_radius,
            data,
        })
    }
}

/// Read the count and reserved dword that prefix MATERIAL_LIST and TEXTURE_LIST.
pub(crate) fn read_list_prefix(c: &mut Cursor<'_>, context: &'static str) -> Result<usize> {
    let count = c.read_u16()? as usize;
    expect_zero_u32(c, context, "list reserved")?;
    Ok(count)
}

fn expect_zero_u32(c: &mut Cursor<'_>, context: &'static str, field: &str) -> Result<()> {
    let offset = c.absolute();
    let v = c.read_u32()?;
    if v != 0 {
        return Err(Error::structural(
            context,
            format!("{field} at {offset:#x} must be zero, found {v:#x}"),
        ));
    }
    Ok(())
}
