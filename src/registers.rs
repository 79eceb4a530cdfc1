use serde::{Deserialize, Serialize};

pub const NUM_REGISTERS: usize = 32;

/// How register operands are written in the assembly text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterStyle {
    /// `$0` .. `$31`
    #[default]
    Numeric,
    /// ABI names such as `$zero`, `$t0`, `$ra`
    Symbolic,
}

const NAMES: [&str; NUM_REGISTERS] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", //
    "$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7", //
    "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7", //
    "$t8", "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

/// General-purpose register names and numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterTable;

impl RegisterTable {
    pub fn new() -> Self {
        Self
    }

    /// Symbolic name of register `num`, if it exists.
    pub fn name(&self, num: u8) -> Option<&'static str> {
        NAMES.get(num as usize).copied()
    }

    /// Accepts both `$n` and the symbolic spelling.
    pub fn number(&self, name: &str) -> Option<u8> {
        let body = name.strip_prefix('$')?;
        if let Ok(n) = body.parse::<u8>() {
            return ((n as usize) < NUM_REGISTERS).then_some(n);
        }
        NAMES
            .iter()
            .position(|&n| &n[1..] == body)
            .map(|idx| idx as u8)
    }

    pub fn render(&self, num: u8, style: RegisterStyle) -> String {
        match (style, self.name(num)) {
            (RegisterStyle::Symbolic, Some(name)) => name.to_string(),
            _ => format!("${num}"),
        }
    }
}
