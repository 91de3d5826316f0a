use log::{debug, trace};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::bytecode::opcode::{Layout, OperandKind, OperandSpec, Opcode};
use crate::bytecode::records::{
    read_list_prefix, CrashStart, MaterialRecord, TextureRecord, MATERIAL_RECORD_SIZE,
    TEXTURE_RECORD_SIZE,
};
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Size of the opcode word that starts every instruction. Only the low byte
/// selects the opcode.
pub const HEADER_SIZE: usize = 2;

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset within the BGL block.
    pub offset: usize,
    pub opcode: Opcode,
    pub body: InstructionBody,
}

/// Payload of an instruction, by layout.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionBody {
    Operands(Vec<Operand>),
    CrashStart(CrashStart),
    Materials(Vec<MaterialRecord>),
    Textures(Vec<TextureRecord>),
}

/// A named operand of a table-driven instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operand {
    pub name: &'static str,
    #[serde(flatten)]
    pub value: OperandValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "UPPERCASE")]
pub enum OperandValue {
    UInt16(u16),
    UInt32(u32),
    SInt16(i16),
    SInt32(i32),
    /// Variable address, kept as hex text since it is not a value.
    Var16(String),
    Var32(String),
    Zero2,
}

impl Instruction {
    /// Operands of a table-driven instruction; empty for irregular records.
    pub fn operands(&self) -> &[Operand] {
        match &self.body {
            InstructionBody::Operands(ops) => ops,
            _ => &[],
        }
    }

    /// Look up an operand by schema name.
    pub fn operand(&self, name: &str) -> Option<&OperandValue> {
        self.operands().iter().find(|o| o.name == name).map(|o| &o.value)
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Instruction", 4)?;
        s.serialize_field("offset", &self.offset)?;
        s.serialize_field("opcode", &self.opcode.as_u8())?;
        s.serialize_field("mnemonic", self.opcode.mnemonic())?;
        match &self.body {
            InstructionBody::Operands(ops) => s.serialize_field("operands", ops)?,
            InstructionBody::CrashStart(crash) => s.serialize_field("crash_start", crash)?,
            InstructionBody::Materials(m) => s.serialize_field("materials", m)?,
            InstructionBody::Textures(t) => s.serialize_field("textures", t)?,
        }
        s.end()
    }
}

/// Parsed `BGL ` block: decoded instructions plus whatever follows the first
/// unmapped opcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BglBlock {
    pub instructions: Vec<Instruction>,
    /// Offset within the block where the undecoded tail starts. Equals the
    /// block length when every byte was decoded.
    pub tail_offset: usize,
    /// Undecoded bytes starting at the first unmapped opcode.
    #[serde(serialize_with = "crate::hex::serialize")]
    pub tail: Vec<u8>,
}

impl BglBlock {
    /// Parse a BGL chunk.
    ///
    /// `chunk_data` is the raw chunk content and `data_offset` its absolute
    /// offset in the file (used for error messages only).
    pub fn parse(chunk_data: &[u8], data_offset: usize) -> Result<Self> {
        let mut c = Cursor::with_base(chunk_data, data_offset);
        let instructions = decode_stream(&mut c)?;
        Ok(Self {
            instructions,
            tail_offset: c.position(),
            tail: c.rest().to_vec(),
        })
    }
}

/// Decode a BGL byte stream.
///
/// Decoding walks forward once and never follows jump or call targets. It stops
/// at the first byte that is not a known opcode and returns the instructions
/// decoded so far along with the remaining bytes, which start at that byte.
pub fn decode(bytecode: &[u8]) -> Result<(Vec<Instruction>, &[u8])> {
    let mut c = Cursor::new(bytecode);
    let instructions = decode_stream(&mut c)?;
    Ok((instructions, c.rest()))
}

fn decode_stream(c: &mut Cursor<'_>) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while let Some(byte) = c.peek_u8() {
        let Some(opcode) = Opcode::from_u8(byte) else {
            debug!(
                "BGL: unmapped opcode {byte:#04x} at {:#x}, keeping {} bytes as tail",
                c.absolute(),
                c.remaining()
            );
            break;
        };

        let offset = c.position();
        c.skip(HEADER_SIZE)?;

        let body = match opcode.layout() {
            Layout::Standard(schema) => {
                InstructionBody::Operands(read_operands(c, opcode, schema)?)
            }
            Layout::CrashStart => InstructionBody::CrashStart(CrashStart::read(c)?),
            Layout::MaterialList => {
                let count = read_list_prefix(c, "MATERIAL_LIST")?;
                let capacity = count.min(c.remaining() / MATERIAL_RECORD_SIZE);
                let mut materials = Vec::with_capacity(capacity);
                for _ in 0..count {
                    materials.push(MaterialRecord::read(c)?);
                }
                InstructionBody::Materials(materials)
            }
            Layout::TextureList => {
                let count = read_list_prefix(c, "TEXTURE_LIST")?;
                let capacity = count.min(c.remaining() / TEXTURE_RECORD_SIZE);
                let mut textures = Vec::with_capacity(capacity);
                for _ in 0..count {
                    textures.push(TextureRecord::read(c)?);
                }
                InstructionBody::Textures(textures)
            }
        };

        trace!("BGL {offset:#06x}: {opcode}");
        instructions.push(Instruction {
            offset,
            opcode,
            body,
        });
    }

    Ok(instructions)
}

fn read_operands(
    c: &mut Cursor<'_>,
    opcode: Opcode,
    schema: &[OperandSpec],
) -> Result<Vec<Operand>> {
    let mut operands = Vec::with_capacity(schema.len());
    for &(name, kind) in schema {
        let value = match kind {
            OperandKind::UInt16 => OperandValue::UInt16(c.read_u16()?),
            OperandKind::UInt32 => OperandValue::UInt32(c.read_u32()?),
            OperandKind::SInt16 => OperandValue::SInt16(c.read_i16()?),
            OperandKind::SInt32 => OperandValue::SInt32(c.read_i32()?),
            OperandKind::Var16 => OperandValue::Var16(format!("{:#06x}", c.read_u16()?)),
            OperandKind::Var32 => OperandValue::Var32(format!("{:#010x}", c.read_u32()?)),
            OperandKind::Zero2 => {
                let at = c.absolute();
                let v = c.read_u16()?;
                if v != 0 {
                    return Err(Error::structural(
                        "BGL",
                        format!("{opcode}: {name} at {at:#x} must be zero, found {v:#06x}"),
                    ));
                }
                OperandValue::Zero2
            }
        };
        operands.push(Operand { name, value });
    }
    Ok(operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(byte: u8) -> [u8; 2] {
        [byte, 0]
    }

    #[test]
    fn unmapped_opcode_stops_decoding() {
        let mut data = op(0x08).to_vec();
        data.extend_from_slice(&[0xFF, 0x01, 0x02]);

        let (instructions, tail) = decode(&data).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].opcode, Opcode::Closure);
        assert_eq!(instructions[0].offset, 0);
        assert_eq!(tail, &[0xFF, 0x01, 0x02]);
        assert_eq!(data.len() - tail.len(), 2);
    }

    #[test]
    fn block_records_where_its_tail_starts() {
        let data = [0x08, 0x00, 0xFF, 0x01, 0x02];
        let block = BglBlock::parse(&data, 0).unwrap();
        assert_eq!(block.tail_offset, 2);
        assert_eq!(block.tail, [0xFF, 0x01, 0x02]);

        let decoded = BglBlock::parse(&data[..2], 0).unwrap();
        assert_eq!(decoded.tail_offset, 2);
        assert!(decoded.tail.is_empty());

        let empty = BglBlock::parse(&[], 0).unwrap();
        assert_eq!(empty.tail_offset, 0);
    }

    #[test]
    fn standard_operands_follow_schema() {
        let mut data = op(0x06).to_vec();
        for v in [-5i16, 10, 300] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&op(0xBC));
        data.extend_from_slice(&0x0800u32.to_le_bytes());
        data.extend_from_slice(&op(0x39));
        data.extend_from_slice(&12i16.to_le_bytes());
        data.extend_from_slice(&0x0040u16.to_le_bytes());
        data.extend_from_slice(&0x8000u16.to_le_bytes());
        data.extend_from_slice(&op(0xBD));

        let (instructions, tail) = decode(&data).unwrap();
        assert!(tail.is_empty());
        let mnemonics: Vec<_> = instructions.iter().map(|i| i.opcode.mnemonic()).collect();
        assert_eq!(mnemonics, ["SPNT", "BEGIN", "IFMASK", "END"]);
        let offsets: Vec<_> = instructions.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, [0, 8, 14, 22]);

        assert_eq!(instructions[0].operand("x"), Some(&OperandValue::SInt16(-5)));
        assert_eq!(instructions[0].operand("z"), Some(&OperandValue::SInt16(300)));
        assert_eq!(instructions[1].operand("version"), Some(&OperandValue::UInt32(0x0800)));
        assert_eq!(instructions[2].operand("var"), Some(&OperandValue::Var16("0x0040".into())));
        assert_eq!(instructions[2].operand("mask"), Some(&OperandValue::UInt16(0x8000)));
    }

    #[test]
    fn jump_targets_are_not_followed() {
        let mut data = op(0x0D).to_vec();
        data.extend_from_slice(&(-2i16).to_le_bytes());
        data.extend_from_slice(&op(0x88));
        data.extend_from_slice(&1_000_000i32.to_le_bytes());
        data.extend_from_slice(&op(0x22));

        let (instructions, _) = decode(&data).unwrap();
        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].operand("target"), Some(&OperandValue::SInt16(-2)));
        assert_eq!(instructions[1].operand("target"), Some(&OperandValue::SInt32(1_000_000)));
        assert_eq!(instructions[2].opcode, Opcode::Return);
    }

    #[test]
    fn var32_is_rendered_as_address() {
        let mut data = op(0x89).to_vec();
        data.extend_from_slice(&0x0000_1a2bu32.to_le_bytes());
        let (instructions, _) = decode(&data).unwrap();
        assert_eq!(
            instructions[0].operand("base"),
            Some(&OperandValue::Var32("0x00001a2b".into()))
        );
    }

    #[test]
    fn nonzero_index_in_vposition_is_fatal() {
        let mut data = op(0x3A).to_vec();
        for v in [4u16, 100, 50, 1, 0x0120] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, Error::Structural { context: "BGL", .. }));
        assert!(err.to_string().contains("VPOSITION: index"));
    }

    #[test]
    fn shadow_vposition_with_zero_index() {
        let mut data = op(0x40).to_vec();
        for v in [4u16, 100, 50, 0, 0x0120] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let (instructions, tail) = decode(&data).unwrap();
        assert!(tail.is_empty());
        let ops = instructions[0].operands();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[3].value, OperandValue::Zero2);
        assert_eq!(ops[4].value, OperandValue::Var16("0x0120".into()));
    }

    #[test]
    fn material_list_consumes_header_and_records() {
        let mut data = op(0xB6).to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        for i in 0..17 {
            data.extend_from_slice(&(i as f32 * 0.5).to_le_bytes());
        }
        assert_eq!(data.len(), 76);
        data.extend_from_slice(&op(0x08));

        let (instructions, tail) = decode(&data).unwrap();
        assert!(tail.is_empty());
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1].offset, 76);

        let InstructionBody::Materials(materials) = &instructions[0].body else {
            panic!("expected material list");
        };
        assert_eq!(materials.len(), 1);
        let m = &materials[0];
        assert_eq!(m.diffuse.r, 0.0);
        assert_eq!(m.ambient.r, 2.0);
        assert_eq!(m.specular.a, 5.5);
        assert_eq!(m.emissive.b, 7.0);
        assert_eq!(m.power, 8.0);
    }

    #[test]
    fn list_reserved_must_be_zero() {
        let mut data = op(0xB7).to_vec();
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&[0, 0, 1, 0]);
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, Error::Structural { context: "TEXTURE_LIST", .. }));
    }

    #[test]
    fn crash_start_advances_by_record_length() {
        let mut data = op(0x96).to_vec();
        data.extend_from_slice(&12u16.to_le_bytes());
        data.extend_from_slice(&500u16.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        data.extend_from_slice(&op(0xBD));

        let (instructions, _) = decode(&data).unwrap();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1].offset, 12);
        let InstructionBody::CrashStart(crash) = &instructions[0].body else {
            panic!("expected crash start");
        };
        assert_eq!(crash.ground_radius, 500);
        assert_eq!(crash.data, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn truncated_known_instruction_is_eof() {
        let mut data = op(0x06).to_vec();
        data.extend_from_slice(&[1, 0, 2]);
        assert!(matches!(decode(&data), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn instruction_json_shape() {
        let mut data = op(0x23).to_vec();
        data.extend_from_slice(&(-40i16).to_le_bytes());
        data.push(0xEE);
        let block = BglBlock::parse(&data, 0x200).unwrap();
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "instructions": [{
                    "offset": 0,
                    "opcode": 0x23,
                    "mnemonic": "CALL",
                    "operands": [{"name": "target", "kind": "SINT16", "value": -40}],
                }],
                "tail_offset": 4,
                "tail": "ee",
            })
        );
    }
}
