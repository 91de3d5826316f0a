use log::debug;
use serde::Serialize;

use crate::bytecode::BglBlock;
use crate::chunks::bbox;
use crate::chunks::dict::Dict;
use crate::chunks::header::ModelHeader;
use crate::cursor::{latin1_trimmed, Cursor};
use crate::error::{Error, Result};
use crate::registry::VariableLookup;
use crate::tag::Tag;

/// Deepest RIFF nesting accepted before the file is rejected.
pub const MAX_DEPTH: usize = 32;

/// A decoded block of the model file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block")]
pub enum Chunk {
    #[serde(rename = "RIFF")]
    Riff { sub_block: Vec<Chunk> },
    #[serde(rename = "MDL8_header")]
    Header(ModelHeader),
    #[serde(rename = "DICT")]
    Dict(Dict),
    #[serde(rename = "BBOX")]
    BoundingBox,
    #[serde(rename = "ISFT")]
    Creator { creator: String },
    #[serde(rename = "BGL")]
    Bytecode(BglBlock),
}

impl Chunk {
    /// The tag this chunk was read from.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Riff { .. } => Tag::RIFF,
            Self::Header(_) => Tag::MDL8,
            Self::Dict(_) => Tag::DICT,
            Self::BoundingBox => Tag::BBOX,
            Self::Creator { .. } => Tag::ISFT,
            Self::Bytecode(_) => Tag::BGL,
        }
    }
}

/// Recursive-descent reader over the tagged blocks of a model file.
///
/// Every block is `tag:4, size:u32le, payload:size` except `MDL8`, whose
/// fixed header carries its own nested `MDLH` size. Sizes are trusted as
/// given; a block never extends past its declared size.
pub struct ChunkReader<'r> {
    registry: &'r dyn VariableLookup,
}

impl<'r> ChunkReader<'r> {
    pub fn new(registry: &'r dyn VariableLookup) -> Self {
        Self { registry }
    }

    /// Parse a whole model file into its top-level chunks.
    ///
    /// Any fatal error aborts the parse; the error is wrapped with the tag
    /// and offset of every enclosing block.
    pub fn parse(&self, data: &[u8]) -> Result<Vec<Chunk>> {
        self.read_sequence(data, 0, 0)
    }

    fn read_sequence(&self, data: &[u8], base: usize, depth: usize) -> Result<Vec<Chunk>> {
        let mut c = Cursor::with_base(data, base);
        let mut chunks = Vec::new();

        while !c.is_empty() {
            let offset = c.absolute();
            let tag = c.read_tag()?;
            if !is_known(tag) {
                return Err(Error::UnrecognizedBlock { tag, offset });
            }
            let chunk = self
                .read_chunk(&mut c, tag, depth)
                .map_err(|e| Error::InChunk {
                    tag,
                    offset,
                    source: Box::new(e),
                })?;
            debug!("{tag} at {offset:#x}: {} bytes", c.absolute() - offset);
            chunks.push(chunk);
        }

        Ok(chunks)
    }

    fn read_chunk(&self, c: &mut Cursor<'_>, tag: Tag, depth: usize) -> Result<Chunk> {
        if tag == Tag::MDL8 {
            return Ok(Chunk::Header(ModelHeader::parse(c)?));
        }

        let size = c.read_u32()? as usize;
        let data_offset = c.absolute();
        let payload = c.read_bytes(size)?;

        match tag {
            Tag::RIFF => {
                if depth >= MAX_DEPTH {
                    return Err(Error::structural(
                        "RIFF",
                        format!("nesting deeper than {MAX_DEPTH} levels"),
                    ));
                }
                let sub_block = self.read_sequence(payload, data_offset, depth + 1)?;
                Ok(Chunk::Riff { sub_block })
            }
            Tag::DICT => Ok(Chunk::Dict(Dict::parse(payload, data_offset, self.registry)?)),
            Tag::BBOX => {
                bbox::validate(payload, data_offset)?;
                Ok(Chunk::BoundingBox)
            }
            Tag::ISFT => Ok(Chunk::Creator {
                creator: latin1_trimmed(payload),
            }),
            Tag::BGL => Ok(Chunk::Bytecode(BglBlock::parse(payload, data_offset)?)),
            _ => Err(Error::UnrecognizedBlock {
                tag,
                offset: data_offset - 8,
            }),
        }
    }
}

fn is_known(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::RIFF | Tag::MDL8 | Tag::DICT | Tag::BBOX | Tag::ISFT | Tag::BGL
    )
}

/// Parse a model file with the given variable registry.
pub fn parse(data: &[u8], registry: &dyn VariableLookup) -> Result<Vec<Chunk>> {
    ChunkReader::new(registry).parse(data)
}
