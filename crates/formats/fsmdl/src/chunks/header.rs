use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tag::Tag;

/// Size of the MDLH body.
pub const MDLH_SIZE: u32 = 32;

/// Trailing constant observed in every FS80 header.
pub const FS80_CONSTANT: u32 = 2304;

/// The fixed MDL8/MDLH model header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelHeader {
    /// Bounding radius of the model, in the file's native units.
    pub model_radius: u32,
    /// Pointer past the offset table.
    pub after_offsets: u32,
}

impl ModelHeader {
    /// Parse the header that follows an `MDL8` tag.
    ///
    /// The cursor must sit right after the `MDL8` tag; on success it has
    /// consumed the `MDLH` tag, the nested size and the 32-byte body.
    pub fn parse(c: &mut Cursor<'_>) -> Result<Self> {
        let tag = c.read_tag()?;
        if tag != Tag::MDLH {
            return Err(Error::structural(
                "MDL8",
                format!("expected {} after MDL8, found {tag}", Tag::MDLH),
            ));
        }
        let size = c.read_u32()?;
        if size != MDLH_SIZE {
            return Err(Error::structural(
                "MDLH",
                format!("size must be {MDLH_SIZE}, found {size}"),
            ));
        }

        expect_zero(c, "reserved0")?;
        expect_zero(c, "reserved1")?;
        let model_radius = c.read_u32()?;
        expect_zero(c, "reserved2")?;
        expect_zero(c, "reserved3")?;
        let after_offsets = c.read_u32()?;

        let magic = c.read_tag()?;
        if magic != Tag::FS80 {
            return Err(Error::structural(
                "MDLH",
                format!("magic must be {}, found {magic}", Tag::FS80),
            ));
        }
        let constant = c.read_u32()?;
        if constant != FS80_CONSTANT {
            return Err(Error::structural(
                "MDLH",
                format!("trailing constant must be {FS80_CONSTANT}, found {constant}"),
            ));
        }

        Ok(Self {
            model_radius,
            after_offsets,
        })
    }
}

fn expect_zero(c: &mut Cursor<'_>, field: &str) -> Result<()> {
    let offset = c.absolute();
    let v = c.read_u32()?;
    if v != 0 {
        return Err(Error::structural(
            "MDLH",
            format!("{field} at {offset:#x} must be zero, found {v:#x}"),
        ));
    }
    Ok(())
}
