use std::fmt;

/// Encoding of a single instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    UInt16,
    UInt32,
    SInt16,
    SInt32,
    /// 16-bit variable address.
    Var16,
    /// 32-bit variable address.
    Var32,
    /// Two bytes that must be zero.
    Zero2,
}

/// Named operand slot in an instruction schema.
pub type OperandSpec = (&'static str, OperandKind);

/// How an opcode's body is laid out after its 2-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Fixed sequence of operands.
    Standard(&'static [OperandSpec]),
    /// Length-prefixed crash geometry record.
    CrashStart,
    /// Counted list of 68-byte material records.
    MaterialList,
    /// Counted list of 80-byte texture records.
    TextureList,
}

use OperandKind::*;

const POINT: &[OperandSpec] = &[("x", SInt16), ("y", SInt16), ("z", SInt16)];
const DISPLACEMENT16: &[OperandSpec] = &[("target", SInt16)];
const VPOSITION: &[OperandSpec] = &[
    ("skip", SInt16),
    ("range", UInt16),
    ("size", UInt16),
    ("index", Zero2),
    ("position", Var16),
];

/// Opcodes of the BGL visual-logic bytecode that this decoder understands.
///
/// Only opcodes whose layouts have been confirmed against sample files are
/// listed; anything else ends decoding of the block (see [`super::decode`]).
/// Jump and call operands are displacements relative to the instruction and
/// are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Noop = 0x02,
    // Geometry points
    Spnt = 0x06,
    Cpnt = 0x07,
    Closure = 0x08,

    // Control flow
    Jump = 0x0D,
    Return = 0x22,
    Call = 0x23,
    Jump32 = 0x88,
    VarBase32 = 0x89,
    Call32 = 0x8A,
    VfileMarker = 0x8D,

    // Scale and visibility gates
    SuperScale = 0x34,
    Ifmask = 0x39,
    Vposition = 0x3A,
    Vinstance = 0x3B,
    ShadowVposition = 0x40,

    // Irregular records
    CrashStart = 0x96,
    MaterialList = 0xB6,
    TextureList = 0xB7,

    // Drawing state
    Zbias = 0xAC,
    TransformEnd = 0xAE,
    SetMaterial = 0xB8,

    // Block delimiters
    Begin = 0xBC,
    End = 0xBD,
}

impl Opcode {
    pub const ALL: [Opcode; 24] = [
        Self::Noop,
        Self::Spnt,
        Self::Cpnt,
        Self::Closure,
        Self::Jump,
        Self::Return,
        Self::Call,
        Self::Jump32,
        Self::VarBase32,
        Self::Call32,
        Self::VfileMarker,
        Self::SuperScale,
        Self::Ifmask,
        Self::Vposition,
        Self::Vinstance,
        Self::ShadowVposition,
        Self::CrashStart,
        Self::MaterialList,
        Self::TextureList,
        Self::Zbias,
        Self::TransformEnd,
        Self::SetMaterial,
        Self::Begin,
        Self::End,
    ];

    /// Decode an opcode byte. `None` marks an opcode whose layout is unknown.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x02 => Some(Self::Noop),
            0x06 => Some(Self::Spnt),
            0x07 => Some(Self::Cpnt),
            0x08 => Some(Self::Closure),
            0x0D => Some(Self::Jump),
            0x22 => Some(Self::Return),
            0x23 => Some(Self::Call),
            0x34 => Some(Self::SuperScale),
            0x39 => Some(Self::Ifmask),
            0x3A => Some(Self::Vposition),
            0x3B => Some(Self::Vinstance),
            0x40 => Some(Self::ShadowVposition),
            0x88 => Some(Self::Jump32),
            0x89 => Some(Self::VarBase32),
            0x8A => Some(Self::Call32),
            0x8D => Some(Self::VfileMarker),
            0x96 => Some(Self::CrashStart),
            0xAC => Some(Self::Zbias),
            0xAE => Some(Self::TransformEnd),
            0xB6 => Some(Self::MaterialList),
            0xB7 => Some(Self::TextureList),
            0xB8 => Some(Self::SetMaterial),
            0xBC => Some(Self::Begin),
            0xBD => Some(Self::End),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::Spnt => "SPNT",
            Self::Cpnt => "CPNT",
            Self::Closure => "CLOSURE",
            Self::Jump => "JUMP",
            Self::Return => "RETURN",
            Self::Call => "CALL",
            Self::Jump32 => "JUMP32",
            Self::VarBase32 => "VAR_BASE32",
            Self::Call32 => "CALL32",
            Self::VfileMarker => "VFILE_MARKER",
            Self::SuperScale => "SUPER_SCALE",
            Self::Ifmask => "IFMASK",
            Self::Vposition => "VPOSITION",
            Self::Vinstance => "VINSTANCE",
            Self::ShadowVposition => "SHADOW_VPOSITION",
            Self::CrashStart => "CRASH_START",
            Self::MaterialList => "MATERIAL_LIST",
            Self::TextureList => "TEXTURE_LIST",
            Self::Zbias => "ZBIAS",
            Self::TransformEnd => "TRANSFORM_END",
            Self::SetMaterial => "SET_MATERIAL",
            Self::Begin => "BEGIN",
            Self::End => "END",
        }
    }

    /// Body layout following the 2-byte header.
    pub fn layout(self) -> Layout {
        match self {
            Self::Noop | Self::Closure | Self::Return | Self::TransformEnd | Self::End => {
                Layout::Standard(&[])
            }
            Self::Spnt | Self::Cpnt => Layout::Standard(POINT),
            Self::Jump | Self::Call => Layout::Standard(DISPLACEMENT16),
            Self::Jump32 | Self::Call32 => Layout::Standard(&[("target", SInt32)]),
            Self::VarBase32 => Layout::Standard(&[("base", Var32)]),
            Self::VfileMarker => Layout::Standard(&[("link", SInt16)]),
            Self::SuperScale => Layout::Standard(&[
                ("skip", SInt16),
                ("range", UInt16),
                ("size", UInt16),
                ("scale", Var16),
            ]),
            Self::Ifmask => Layout::Standard(&[("skip", SInt16), ("var", Var16), ("mask", UInt16)]),
            // TODO: the zero index has only been checked against FS9 stock models;
            // revalidate on third-party and FSX-era exports.
            Self::Vposition | Self::ShadowVposition => Layout::Standard(VPOSITION),
            Self::Vinstance => Layout::Standard(&[("target", SInt16), ("orientation", Var16)]),
            Self::Zbias => Layout::Standard(&[("bias", UInt16)]),
            Self::SetMaterial => Layout::Standard(&[("material", SInt16), ("texture", SInt16)]),
            Self::Begin => Layout::Standard(&[("version", UInt32)]),
            Self::CrashStart => Layout::CrashStart,
            Self::MaterialList => Layout::MaterialList,
            Self::TextureList => Layout::TextureList,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
