//! Word-buffer IR layer for SPIR-V style shader modules.
//!
//! A module is a stream of 32-bit words grouped into length-prefixed
//! instructions. Instructions are emitted into pooled [`WordBuffer`]s,
//! routed into declarations and function sections by a [`ModuleBuffer`],
//! sorted into layout order and assembled behind a five-word header.

pub mod buffer;
pub mod error;
pub mod ids;
pub mod instruction;
pub mod module;
pub mod opcode;
pub mod operand;
pub mod options;
pub mod pool;

pub use buffer::{Cursor, InstructionHandle, Iter, WordBuffer};
pub use error::{SpirvError, SpirvErrorKind};
pub use ids::{Id, IdAllocator};
pub use instruction::{Instruction, InstructionWords, MAX_INSTRUCTION_WORDS, pack_header, split_header};
pub use module::{
    AssembledModule, BoundTracker, FunctionBuffer, InstructionGroup, MergedBuffer, ModuleBuffer,
    ModuleHandle, ModuleHeader, ModuleIter, Section, VariableClass, merge, merge_checked,
    merge_offset,
};
pub use opcode::Op;
pub use operand::{
    DecodedOperand, LiteralWidth, Operand, OperandIter, OperandKind, OperandSpec, Quantifier,
    encoded_word_count, string_word_len,
};
pub use options::{SpirvOptions, UnknownOpcodePolicy};
pub use pool::{PoolStats, PooledWords, WordPool};
