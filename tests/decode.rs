use pretty_assertions::assert_eq;

use mips_rs::isa::mips32::{check_syntax, from_twos_complement};
use mips_rs::{Decoder, Mips32Decoder, Opcode, OpcodeTable};

// Join space-separated fields into one 32-digit line.
fn line(fields: &str) -> String {
    let s: String = fields.split_whitespace().collect();
    assert_eq!(s.len(), 32, "bad test encoding {fields}");
    s
}

#[test]
fn add_end_to_end() {
    let dec = Mips32Decoder::new();
    let inst = dec.decode(&line("000000 00001 00010 00011 00000 100000")).unwrap();
    assert_eq!(inst.opcode(), Opcode::Add);
    assert_eq!(inst.mnemonic(), "add");
    assert_eq!(inst.rd(), Some("$3"));
    assert_eq!(inst.rs(), Some("$1"));
    assert_eq!(inst.rt(), Some("$2"));
    assert_eq!(inst.assembly(), "add\t$3, $1, $2");
}

#[test]
fn memory_offset_base_syntax() {
    let dec = Mips32Decoder::new();
    let lw = dec.decode(&line("100011 00100 00010 0000000000001000")).unwrap();
    assert_eq!(lw.assembly(), "lw\t$2, 8($4)");
    let sw = dec.decode(&line("101011 11101 11111 1111111111111100")).unwrap();
    assert_eq!(sw.immediate(), -4);
    assert_eq!(sw.assembly(), "sw\t$31, -4($29)");
}

#[test]
fn jump_address_is_scaled() {
    let dec = Mips32Decoder::new();
    let j = dec.decode(&line("000010 00000000000000000000000101")).unwrap();
    assert_eq!(j.immediate(), 5);
    assert_eq!(j.assembly(), "j\t0x14");
    let jal = dec.decode(&line("000011 11111111111111111111111111")).unwrap();
    assert_eq!(jal.assembly(), "jal\t0xffffffc");
}

#[test]
fn branch_offset_is_signed_and_scaled() {
    let dec = Mips32Decoder::new();
    let beq = dec.decode(&line("000100 00001 00010 0000000000000011")).unwrap();
    assert_eq!(beq.assembly(), "beq\t$2, $1, 0xc");
    let bne = dec.decode(&line("000101 00001 00010 1111111111111110")).unwrap();
    assert_eq!(bne.immediate(), -2);
    assert_eq!(bne.assembly(), "bne\t$2, $1, 0xfffffff8");
}

#[test]
fn immediate_arithmetic_and_shifts() {
    let dec = Mips32Decoder::new();
    let addi = dec.decode(&line("001000 00001 00010 1111111111111011")).unwrap();
    assert_eq!(addi.assembly(), "addi\t$2, $1, -5");
    let sra = dec.decode(&line("000000 00000 00010 00011 00100 000011")).unwrap();
    assert_eq!(sra.assembly(), "sra\t$3, $2, 4");
    let mflo = dec.decode(&line("000000 00000 00000 01000 00000 010010")).unwrap();
    assert_eq!(mflo.assembly(), "mflo\t$8");
    let mult = dec.decode(&line("000000 00100 00101 00000 00000 011000")).unwrap();
    assert_eq!(mult.assembly(), "mult\t$4, $5");
}

#[test]
fn register_field_extremes() {
    let dec = Mips32Decoder::new();
    let inst = dec.decode(&line("000000 00000 11111 00000 00000 100000")).unwrap();
    assert_eq!(inst.rs(), Some("$0"));
    assert_eq!(inst.rt(), Some("$31"));
    assert_eq!(inst.rd(), Some("$0"));
}

#[test]
fn every_table_entry_decodes() {
    let dec = Mips32Decoder::new();
    let table = OpcodeTable::new();
    for e in mips_rs::instructions::TABLE {
        let word = (u32::from(e.opcode) << 26) | u32::from(e.funct.unwrap_or(0)) | (0x0123_4500 & 0x03FF_FFC0);
        let text = format!("{word:032b}");
        let inst = dec.decode(&text).unwrap();
        assert_eq!(inst.opcode(), e.op, "{}", e.mnemonic);
        assert!(!inst.is_undefined());
        assert_eq!(inst.encoding(), text);
        assert!(inst.assembly().starts_with(&format!("{}\t", e.mnemonic)));
        assert_eq!(table.format_of(inst.opcode()), Some(e.format));
    }
}

#[test]
fn twos_complement_reencodes_every_pattern() {
    for pattern in 0u32..=0xFFFF {
        let v = from_twos_complement(pattern, 16);
        assert!((-32768..=32767).contains(&v));
        assert_eq!(format!("{:016b}", v as i16 as u16), format!("{pattern:016b}"));
    }
}

#[test]
fn syntax_check_rejects_non_binary() {
    assert!(check_syntax("00000000001000100001100000100000"));
    assert!(!check_syntax("0000000000100010000110000010000"));
    assert!(!check_syntax("00000000001000100001100000100000 "));
    assert!(!check_syntax("0000000000100010000110000010000x"));
    assert!(!check_syntax("0000000000100010 001100000100000"));
}
