use std::fmt::Write as _;

use crate::decoder::{Format, Instruction};
use crate::instructions::{OpFlags, OpcodeEntry, OpcodeTable, Slot};

/// Render `inst` with the syntax rules of its entry's format.
pub fn fmt_instruction(entry: &OpcodeEntry, inst: &Instruction) -> String {
    let mut out = format!("{}\t", entry.mnemonic);
    match entry.format {
        Format::RegisterType => reg_operands(&mut out, entry, inst),
        Format::ImmediateType => imm_operands(&mut out, entry, inst),
        Format::JumpType => {
            if entry.operands.imm.is_some() {
                address(&mut out, inst.immediate());
            }
        }
    }
    out
}

/// Table-driven variant for callers holding only the instruction.
pub fn fmt_decoded(table: &OpcodeTable, inst: &Instruction) -> Option<String> {
    table.entry(inst.opcode()).map(|e| fmt_instruction(e, inst))
}

// rd, rs, rt in that order regardless of bit position; immediate last
fn reg_operands(out: &mut String, entry: &OpcodeEntry, inst: &Instruction) {
    let mut first = true;
    for slot in [Slot::Rd, Slot::Rs, Slot::Rt] {
        if entry.operands.position(slot).is_none() {
            continue;
        }
        if !first {
            out.push(' ');
        }
        out.push_str(inst.register(slot).unwrap_or_default());
        out.push(',');
        first = false;
    }
    if entry.operands.imm.is_some() {
        let _ = write!(out, " {}", inst.immediate());
    }
    if out.ends_with(',') {
        out.pop();
    }
}

// rt then rs; the operand in position 2 takes no separator
fn imm_operands(out: &mut String, entry: &OpcodeEntry, inst: &Instruction) {
    for slot in [Slot::Rt, Slot::Rs] {
        let Some(pos) = entry.operands.position(slot) else { continue };
        out.push_str(inst.register(slot).unwrap_or_default());
        if pos != 2 {
            out.push_str(", ");
        }
    }
    if entry.operands.imm.is_none() {
        return;
    }

    let imm = inst.immediate();
    if entry.flags.contains(OpFlags::MEMORY) {
        // Replace the trailing base register with offset(base).
        let keep = out.rfind(' ').map_or(entry.mnemonic.len() + 1, |idx| idx + 1);
        out.truncate(keep);
        let _ = write!(out, "{}({})", imm, inst.rs().unwrap_or_default());
    } else if entry.flags.contains(OpFlags::LABEL_IMM) {
        address(out, imm);
    } else {
        let _ = write!(out, "{imm}");
    }
}

// Word offset to byte address; negative values print as 32-bit two's complement.
fn address(out: &mut String, words: i32) {
    let _ = write!(out, "0x{:x}", words.wrapping_mul(4));
}
