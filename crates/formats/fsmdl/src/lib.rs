//! Decoder for FS9-era aircraft model (`.mdl`) files.
//!
//! A model file is a RIFF-style tree of tagged, length-prefixed blocks:
//! - **`reader`**: recursive descent over the block tree (`RIFF`, `MDL8`, `DICT`,
//!   `BBOX`, `ISFT`, `BGL `)
//! - **`chunks`**: fixed-layout blocks (model header, bounding box) and the
//!   variable dictionary
//! - **`bytecode`**: structural decoder for the BGL visual-logic bytecode
//!
//! Decoding is a pure function of the input bytes plus a read-only
//! [`VariableLookup`] used to name dictionary variables.

pub mod bytecode;
pub mod chunks;
pub mod cursor;
pub mod error;
pub mod guid;
pub mod hex;
pub mod reader;
pub mod registry;
pub mod tag;

pub use error::{Error, Result};
pub use reader::{parse, Chunk, ChunkReader};
pub use registry::{Registry, RegistryEntry, VariableLookup};
pub use tag::Tag;
