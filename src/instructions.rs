use bitflags::bitflags;
use std::collections::HashMap;

use crate::decoder::{Format, Opcode};

/// Opcode field value whose entries are told apart by the function field.
pub const SPECIAL: u8 = 0b000000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Rs,
    Rt,
    Rd,
    Imm,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpFlags: u8 {
const MEMORY = 1 << 0; // rendered as offset(base)
const LABEL_IMM = 1 << 1; // word offset, rendered as a scaled hex address
}
}

/// Display position of each operand, `None` when the instruction does not use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operands {
    pub rs: Option<u8>,
    pub rt: Option<u8>,
    pub rd: Option<u8>,
    pub imm: Option<u8>,
}

impl Operands {
    pub fn position(&self, slot: Slot) -> Option<u8> {
        match slot {
            Slot::Rs => self.rs,
            Slot::Rt => self.rt,
            Slot::Rd => self.rd,
            Slot::Imm => self.imm,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpcodeEntry {
    pub op: Opcode,
    pub mnemonic: &'static str,
    pub format: Format,
    pub opcode: u8,
    /// Only set for entries under [`SPECIAL`].
    pub funct: Option<u8>,
    pub operands: Operands,
    pub flags: OpFlags,
}

const NO: Option<u8> = None;
const P0: Option<u8> = Some(0);
const P1: Option<u8> = Some(1);
const P2: Option<u8> = Some(2);

// Operand positions are listed as (rs, rt, rd, imm), or (rs, rt, imm) for I-type.
const fn r(
    op: Opcode,
    mnemonic: &'static str,
    funct: u8,
    ops: (Option<u8>, Option<u8>, Option<u8>, Option<u8>),
) -> OpcodeEntry {
    OpcodeEntry {
        op,
        mnemonic,
        format: Format::RegisterType,
        opcode: SPECIAL,
        funct: Some(funct),
        operands: Operands { rs: ops.0, rt: ops.1, rd: ops.2, imm: ops.3 },
        flags: OpFlags::empty(),
    }
}

const fn i(
    op: Opcode,
    mnemonic: &'static str,
    opcode: u8,
    ops: (Option<u8>, Option<u8>, Option<u8>),
    flags: OpFlags,
) -> OpcodeEntry {
    OpcodeEntry {
        op,
        mnemonic,
        format: Format::ImmediateType,
        opcode,
        funct: None,
        operands: Operands { rs: ops.0, rt: ops.1, rd: None, imm: ops.2 },
        flags,
    }
}

const fn j(op: Opcode, mnemonic: &'static str, opcode: u8) -> OpcodeEntry {
    OpcodeEntry {
        op,
        mnemonic,
        format: Format::JumpType,
        opcode,
        funct: None,
        operands: Operands { rs: None, rt: None, rd: None, imm: P0 },
        flags: OpFlags::LABEL_IMM,
    }
}

const RD_RS_RT: (Option<u8>, Option<u8>, Option<u8>, Option<u8>) = (P1, P2, P0, NO);
const RD_RT_SA: (Option<u8>, Option<u8>, Option<u8>, Option<u8>) = (NO, P1, P0, P2);
const RS_RT: (Option<u8>, Option<u8>, Option<u8>, Option<u8>) = (P0, P1, NO, NO);
const RT_RS_IMM: (Option<u8>, Option<u8>, Option<u8>) = (P1, P0, P2);
const RT_IMM_RS: (Option<u8>, Option<u8>, Option<u8>) = (P2, P0, P1);
const NONE: OpFlags = OpFlags::empty();

pub const TABLE: &[OpcodeEntry] = &[
    r(Opcode::Add, "add", 0b100000, RD_RS_RT),
    r(Opcode::Addu, "addu", 0b100001, RD_RS_RT),
    r(Opcode::Sub, "sub", 0b100010, RD_RS_RT),
    r(Opcode::Subu, "subu", 0b100011, RD_RS_RT),
    r(Opcode::And, "and", 0b100100, RD_RS_RT),
    r(Opcode::Or, "or", 0b100101, RD_RS_RT),
    r(Opcode::Xor, "xor", 0b100110, RD_RS_RT),
    r(Opcode::Nor, "nor", 0b100111, RD_RS_RT),
    r(Opcode::Slt, "slt", 0b101010, RD_RS_RT),
    r(Opcode::Sltu, "sltu", 0b101011, RD_RS_RT),
    r(Opcode::Sll, "sll", 0b000000, RD_RT_SA),
    r(Opcode::Srl, "srl", 0b000010, RD_RT_SA),
    r(Opcode::Sra, "sra", 0b000011, RD_RT_SA),
    r(Opcode::Jr, "jr", 0b001000, (P0, NO, NO, NO)),
    r(Opcode::Jalr, "jalr", 0b001001, (P1, NO, P0, NO)),
    r(Opcode::Mfhi, "mfhi", 0b010000, (NO, NO, P0, NO)),
    r(Opcode::Mthi, "mthi", 0b010001, (P0, NO, NO, NO)),
    r(Opcode::Mflo, "mflo", 0b010010, (NO, NO, P0, NO)),
    r(Opcode::Mtlo, "mtlo", 0b010011, (P0, NO, NO, NO)),
    r(Opcode::Mult, "mult", 0b011000, RS_RT),
    r(Opcode::Multu, "multu", 0b011001, RS_RT),
    r(Opcode::Div, "div", 0b011010, RS_RT),
    r(Opcode::Divu, "divu", 0b011011, RS_RT),
    i(Opcode::Addi, "addi", 0b001000, RT_RS_IMM, NONE),
    i(Opcode::Addiu, "addiu", 0b001001, RT_RS_IMM, NONE),
    i(Opcode::Slti, "slti", 0b001010, RT_RS_IMM, NONE),
    i(Opcode::Sltiu, "sltiu", 0b001011, RT_RS_IMM, NONE),
    i(Opcode::Andi, "andi", 0b001100, RT_RS_IMM, NONE),
    i(Opcode::Ori, "ori", 0b001101, RT_RS_IMM, NONE),
    i(Opcode::Xori, "xori", 0b001110, RT_RS_IMM, NONE),
    i(Opcode::Lui, "lui", 0b001111, (NO, P0, P1), NONE),
    i(Opcode::Beq, "beq", 0b000100, (P0, P1, P2), OpFlags::LABEL_IMM),
    i(Opcode::Bne, "bne", 0b000101, (P0, P1, P2), OpFlags::LABEL_IMM),
    i(Opcode::Blez, "blez", 0b000110, (P0, NO, P1), OpFlags::LABEL_IMM),
    i(Opcode::Bgtz, "bgtz", 0b000111, (P0, NO, P1), OpFlags::LABEL_IMM),
    i(Opcode::Lb, "lb", 0b100000, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Lh, "lh", 0b100001, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Lw, "lw", 0b100011, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Lbu, "lbu", 0b100100, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Lhu, "lhu", 0b100101, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Sb, "sb", 0b101000, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Sh, "sh", 0b101001, RT_IMM_RS, OpFlags::MEMORY),
    i(Opcode::Sw, "sw", 0b101011, RT_IMM_RS, OpFlags::MEMORY),
    j(Opcode::J, "j", 0b000010),
    j(Opcode::Jal, "jal", 0b000011),
];

#[derive(Debug, Clone)]
enum Dispatch {
    Direct(usize),
    ByFunct(HashMap<u8, usize>),
}

/// Two-level lookup over [`TABLE`]: opcode field first, then the function
/// field for [`SPECIAL`]. Read-only once built.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    by_opcode: HashMap<u8, Dispatch>,
    by_op: HashMap<Opcode, usize>,
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcodeTable {
    pub fn new() -> Self {
        let mut by_opcode = HashMap::new();
        let mut by_op = HashMap::new();
        for (idx, e) in TABLE.iter().enumerate() {
            match e.funct {
                None => {
                    let prev = by_opcode.insert(e.opcode, Dispatch::Direct(idx));
                    debug_assert!(prev.is_none(), "opcode field {:06b} listed twice", e.opcode);
                }
                Some(funct) => {
                    let slot = by_opcode
                        .entry(e.opcode)
                        .or_insert_with(|| Dispatch::ByFunct(HashMap::new()));
                    match slot {
                        Dispatch::ByFunct(m) => {
                            let prev = m.insert(funct, idx);
                            debug_assert!(prev.is_none(), "function field {funct:06b} listed twice");
                        }
                        Dispatch::Direct(_) => {
                            debug_assert!(false, "opcode field {:06b} mixes dispatch kinds", e.opcode)
                        }
                    }
                }
            }
            by_op.insert(e.op, idx);
        }
        Self { by_opcode, by_op }
    }

    pub fn resolve(&self, opcode: u8, funct: u8) -> Option<&'static OpcodeEntry> {
        let idx = match self.by_opcode.get(&opcode)? {
            Dispatch::Direct(idx) => *idx,
            Dispatch::ByFunct(m) => *m.get(&funct)?,
        };
        Some(&TABLE[idx])
    }

    /// `funct` is only consulted for the [`SPECIAL`] opcode field.
    pub fn lookup(&self, opcode: u8, funct: u8) -> Opcode {
        self.resolve(opcode, funct).map_or(Opcode::Undefined, |e| e.op)
    }

    pub fn entry(&self, op: Opcode) -> Option<&'static OpcodeEntry> {
        self.by_op.get(&op).map(|&idx| &TABLE[idx])
    }

    pub fn by_mnemonic(&self, mnemonic: &str) -> Option<&'static OpcodeEntry> {
        TABLE.iter().find(|e| e.mnemonic == mnemonic)
    }

    /// `None` only for [`Opcode::Undefined`].
    pub fn format_of(&self, op: Opcode) -> Option<Format> {
        self.entry(op).map(|e| e.format)
    }

    pub fn mnemonic(&self, op: Opcode) -> Option<&'static str> {
        self.entry(op).map(|e| e.mnemonic)
    }

    pub fn operand_position(&self, op: Opcode, slot: Slot) -> Option<u8> {
        self.entry(op)?.operands.position(slot)
    }

    pub fn is_memory_instr(&self, op: Opcode) -> bool {
        self.entry(op).is_some_and(|e| e.flags.contains(OpFlags::MEMORY))
    }

    pub fn is_label_immediate(&self, op: Opcode) -> bool {
        self.entry(op).is_some_and(|e| e.flags.contains(OpFlags::LABEL_IMM))
    }
}
