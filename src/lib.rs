pub mod binary;
pub mod decoder;
pub mod disasm;
pub mod instructions;
pub mod registers;

pub mod isa {
    pub mod mips32; // textual 32-bit binary encodings
}

pub use binary::{Cursor, LineError, Listing};
pub use decoder::{DecodeError, Decoder, DecoderConfig, Format, Instruction, Opcode};
pub use instructions::{OpcodeTable, Slot};
pub use isa::mips32::Mips32Decoder;
pub use registers::{RegisterStyle, RegisterTable};
