use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::instructions::Slot;
use crate::registers::RegisterStyle;

/// Width of an encoded instruction, in binary digits.
pub const WORD_BITS: usize = 32;
/// Width of the opcode field and of the trailing function field.
pub const OPCODE_BITS: usize = 6;
/// Width of one register operand field.
pub const REGISTER_BITS: usize = 5;
/// Offset of the function field within the word.
pub const FUNCT_START: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Opcode {
    // Function-field dispatched (opcode field 000000)
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Sll,
    Srl,
    Sra,
    Jr,
    Jalr,
    Mfhi,
    Mflo,
    Mthi,
    Mtlo,
    Mult,
    Multu,
    Div,
    Divu,
    // Immediate arithmetic / logic
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    // Branches
    Beq,
    Bne,
    Blez,
    Bgtz,
    // Memory
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    // Jumps
    J,
    Jal,
    /// No instruction: end of a sequence, or an unmatched encoding.
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    RegisterType,
    ImmediateType,
    JumpType,
}

/// Where a format keeps its operands within the 26 bits that follow the opcode field.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    /// Register fields in bit order, 5 bits each, starting at bit 0.
    pub registers: &'static [Slot],
    pub immediate: Range<usize>,
    /// Immediate is two's-complement rather than plain unsigned.
    pub signed: bool,
}

impl Format {
    pub fn layout(self) -> FieldLayout {
        match self {
            // rs rt rd shamt funct; the function field is never part of the immediate
            Format::RegisterType => FieldLayout {
                registers: &[Slot::Rs, Slot::Rt, Slot::Rd],
                immediate: 15..20,
                signed: false,
            },
            Format::ImmediateType => FieldLayout {
                registers: &[Slot::Rs, Slot::Rt],
                immediate: 10..26,
                signed: true,
            },
            Format::JumpType => FieldLayout {
                registers: &[],
                immediate: 0..26,
                signed: false,
            },
        }
    }
}

/// One decoded line. Built once by a [`Decoder`]; only the encoding and assembly
/// text are attached afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    opcode: Opcode,
    mnemonic: &'static str,
    rs: Option<String>,
    rt: Option<String>,
    rd: Option<String>,
    immediate: i32,
    encoding: String,
    assembly: String,
}

impl Default for Instruction {
    fn default() -> Self {
        Self::undefined()
    }
}

impl Instruction {
    pub fn new(
        opcode: Opcode,
        mnemonic: &'static str,
        rs: Option<String>,
        rt: Option<String>,
        rd: Option<String>,
        immediate: i32,
    ) -> Self {
        Self {
            opcode,
            mnemonic,
            rs,
            rt,
            rd,
            immediate,
            encoding: String::new(),
            assembly: String::new(),
        }
    }

    /// The end-of-sequence sentinel.
    pub fn undefined() -> Self {
        Self::new(Opcode::Undefined, "", None, None, None, 0)
    }

    pub fn with_text(self, encoding: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self { encoding: encoding.into(), assembly: assembly.into(), ..self }
    }

    pub fn is_undefined(&self) -> bool {
        self.opcode == Opcode::Undefined
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    pub fn rs(&self) -> Option<&str> {
        self.rs.as_deref()
    }

    pub fn rt(&self) -> Option<&str> {
        self.rt.as_deref()
    }

    pub fn rd(&self) -> Option<&str> {
        self.rd.as_deref()
    }

    pub fn register(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Rs => self.rs(),
            Slot::Rt => self.rt(),
            Slot::Rd => self.rd(),
            Slot::Imm => None,
        }
    }

    pub fn immediate(&self) -> i32 {
        self.immediate
    }

    /// The original 32-digit line.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected 32 binary digits, found {len} characters")]
    InvalidLength { len: usize },
    #[error("invalid character {found:?} at column {index}")]
    InvalidDigit { index: usize, found: char },
    #[error("unknown opcode field {opcode:06b} (function field {funct:06b})")]
    UnknownOpcode { opcode: u8, funct: u8 },
}

impl DecodeError {
    /// True for malformed text, false for a well-formed word with no table entry.
    pub fn is_syntax(&self) -> bool {
        !matches!(self, DecodeError::UnknownOpcode { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub registers: RegisterStyle,
    /// Strip one trailing `\r` from each line before checking it.
    pub accept_crlf: bool,
}

pub trait Decoder {
    /// Decode one line of text into a fully rendered instruction.
    fn decode(&self, line: &str) -> Result<Instruction, DecodeError>;

    fn config(&self) -> &DecoderConfig;
}
