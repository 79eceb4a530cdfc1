use bitvec::prelude::*;
use tracing::{debug, trace};

use crate::decoder::{
    DecodeError, Decoder, DecoderConfig, Instruction, FUNCT_START, OPCODE_BITS, REGISTER_BITS,
    WORD_BITS,
};
use crate::disasm::fmt_instruction;
use crate::instructions::{OpcodeEntry, OpcodeTable, Slot};
use crate::registers::RegisterTable;

/// Decoder for one MIPS word written as 32 `0`/`1` characters, MSB first.
#[derive(Debug, Clone, Default)]
pub struct Mips32Decoder {
    opcodes: OpcodeTable,
    registers: RegisterTable,
    cfg: DecoderConfig,
}

/// True iff `line` is exactly 32 characters, all `0` or `1`.
pub fn check_syntax(line: &str) -> bool {
    parse_word(line).is_ok()
}

/// Validate `line` and pack it into a word.
pub fn parse_word(line: &str) -> Result<u32, DecodeError> {
    let len = line.chars().count();
    if len != WORD_BITS {
        return Err(DecodeError::InvalidLength { len });
    }
    line.chars().enumerate().try_fold(0u32, |acc, (index, c)| match c {
        '0' => Ok(acc << 1),
        '1' => Ok((acc << 1) | 1),
        found => Err(DecodeError::InvalidDigit { index, found }),
    })
}

/// Interpret the low `width` bits of `value` as a two's-complement number.
pub fn from_twos_complement(value: u32, width: usize) -> i32 {
    let mask = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    let value = value & mask;
    if width > 0 && (value >> (width - 1)) & 1 == 1 {
        // invert, add one, negate
        let magnitude = i64::from(!value & mask) + 1;
        (-magnitude) as i32
    } else {
        value as i32
    }
}

impl Mips32Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(cfg: DecoderConfig) -> Self {
        Self {
            opcodes: OpcodeTable::new(),
            registers: RegisterTable::new(),
            cfg,
        }
    }

    pub fn opcodes(&self) -> &OpcodeTable {
        &self.opcodes
    }

    /// Pull the operands the entry uses out of the 26 bits after the opcode field.
    fn extract(&self, entry: &OpcodeEntry, rest: &BitSlice<u32, Msb0>) -> Instruction {
        let layout = entry.format.layout();
        let (mut rs, mut rt, mut rd) = (None, None, None);

        // Absent slots still occupy their 5 bits.
        for (n, &slot) in layout.registers.iter().enumerate() {
            if entry.operands.position(slot).is_none() {
                continue;
            }
            let start = n * REGISTER_BITS;
            let num = rest[start..start + REGISTER_BITS].load_be::<u8>();
            let name = self.registers.render(num, self.cfg.registers);
            trace!(?slot, num, "register field");
            match slot {
                Slot::Rs => rs = Some(name),
                Slot::Rt => rt = Some(name),
                Slot::Rd => rd = Some(name),
                Slot::Imm => {}
            }
        }

        let immediate = if entry.operands.imm.is_some() {
            let field = &rest[layout.immediate.clone()];
            let raw = field.load_be::<u32>();
            trace!(raw, width = field.len(), signed = layout.signed, "immediate field");
            if layout.signed {
                from_twos_complement(raw, field.len())
            } else {
                raw as i32
            }
        } else {
            0
        };

        Instruction::new(entry.op, entry.mnemonic, rs, rt, rd, immediate)
    }
}

impl Decoder for Mips32Decoder {
    fn decode(&self, line: &str) -> Result<Instruction, DecodeError> {
        let line = if self.cfg.accept_crlf {
            line.strip_suffix('\r').unwrap_or(line)
        } else {
            line
        };
        let word = parse_word(line)?;
        let bits = word.view_bits::<Msb0>();
        let opcode = bits[..OPCODE_BITS].load_be::<u8>();
        let funct = bits[FUNCT_START..].load_be::<u8>();

        let entry = self
            .opcodes
            .resolve(opcode, funct)
            .ok_or(DecodeError::UnknownOpcode { opcode, funct })?;

        let inst = self.extract(entry, &bits[OPCODE_BITS..]);
        let assembly = fmt_instruction(entry, &inst);
        debug!(mnemonic = entry.mnemonic, %assembly, "decoded");
        Ok(inst.with_text(line, assembly))
    }

    fn config(&self) -> &DecoderConfig {
        &self.cfg
    }
}
