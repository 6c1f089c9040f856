//! Instruction builders shared by the integration tests.

#![allow(dead_code)]

use spvbuf::spirv::{Id, Instruction, Op, Operand};

pub const STORAGE_INPUT: u32 = 1;
pub const STORAGE_OUTPUT: u32 = 3;
pub const STORAGE_PRIVATE: u32 = 6;
pub const STORAGE_FUNCTION: u32 = 7;

pub fn inst(op: Op, operands: &[Operand<'_>]) -> Instruction<'static> {
    Instruction::encode(op, operands).expect("instruction should encode")
}

pub fn id(value: u32) -> Operand<'static> {
    Operand::Id(Id::new(value))
}

pub fn capability(value: u32) -> Instruction<'static> {
    inst(Op::Capability, &[Operand::Enum(value)])
}

pub fn name(target: u32, value: &str) -> Instruction<'static> {
    inst(Op::Name, &[id(target), Operand::string(value.to_string())])
}

pub fn decorate(target: u32, decoration: u32) -> Instruction<'static> {
    inst(Op::Decorate, &[id(target), Operand::Enum(decoration)])
}

pub fn type_void(result: u32) -> Instruction<'static> {
    inst(Op::TypeVoid, &[id(result)])
}

pub fn type_int(result: u32, width: u32) -> Instruction<'static> {
    inst(
        Op::TypeInt,
        &[id(result), Operand::LiteralInteger(width), Operand::LiteralInteger(1)],
    )
}

pub fn type_function(result: u32, return_type: u32) -> Instruction<'static> {
    inst(Op::TypeFunction, &[id(result), id(return_type)])
}

pub fn constant(result_type: u32, result: u32, value: u32) -> Instruction<'static> {
    inst(
        Op::Constant,
        &[id(result_type), id(result), Operand::LiteralInteger(value)],
    )
}

pub fn variable(result_type: u32, result: u32, storage: u32) -> Instruction<'static> {
    inst(
        Op::Variable,
        &[id(result_type), id(result), Operand::Enum(storage)],
    )
}

pub fn function(result_type: u32, result: u32, function_type: u32) -> Instruction<'static> {
    inst(
        Op::Function,
        &[id(result_type), id(result), Operand::Enum(0), id(function_type)],
    )
}

pub fn parameter(result_type: u32, result: u32) -> Instruction<'static> {
    inst(Op::FunctionParameter, &[id(result_type), id(result)])
}

pub fn label(result: u32) -> Instruction<'static> {
    inst(Op::Label, &[id(result)])
}

pub fn ret() -> Instruction<'static> {
    inst(Op::Return, &[])
}

pub fn function_end() -> Instruction<'static> {
    inst(Op::FunctionEnd, &[])
}

pub fn opcodes<'a>(instructions: impl IntoIterator<Item = Instruction<'a>>) -> Vec<u16> {
    instructions.into_iter().map(|i| i.opcode()).collect()
}
