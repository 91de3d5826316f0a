//! Decoder for the legacy BGL visual-logic bytecode carried in `BGL ` blocks.

pub mod decode;
pub mod opcode;
pub mod records;

pub use decode::{decode, BglBlock, Instruction, InstructionBody, Operand, OperandValue};
pub use opcode::{Layout, OperandKind, Opcode};
pub use records::{CrashStart, MaterialRecord, Rgba, TextureRecord};
