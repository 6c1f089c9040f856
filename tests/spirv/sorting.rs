use spvbuf::spirv::module::sort_buffer;
use spvbuf::spirv::{
    Instruction, InstructionGroup, Op, SpirvErrorKind, UnknownOpcodePolicy, WordBuffer,
    pack_header,
};

use super::support::{
    capability, decorate, function, function_end, label, name, opcodes, ret, type_int, type_void,
};

fn buffer_of(instructions: &[Instruction<'_>]) -> WordBuffer {
    let mut buffer = WordBuffer::new();
    for instruction in instructions {
        buffer.add(instruction).expect("add should succeed");
    }
    buffer
}

#[test]
fn already_ordered_buffer_is_left_untouched() {
    let mut buffer = buffer_of(&[capability(1), name(1, "v"), type_void(1)]);
    let generation = buffer.generation();
    let moved = sort_buffer(&mut buffer, UnknownOpcodePolicy::Fallback).expect("sort");
    assert!(!moved);
    assert_eq!(buffer.generation(), generation);
}

#[test]
fn sort_is_stable_within_a_group() {
    let mut buffer = buffer_of(&[
        decorate(5, 1),
        type_void(1),
        decorate(6, 2),
        capability(1),
        decorate(7, 3),
    ]);
    let moved = sort_buffer(&mut buffer, UnknownOpcodePolicy::Fallback).expect("sort");
    assert!(moved);

    assert_eq!(
        opcodes(buffer.iter()),
        vec![
            Op::Capability.code(),
            Op::Decorate.code(),
            Op::Decorate.code(),
            Op::Decorate.code(),
            Op::TypeVoid.code(),
        ]
    );
    let targets: Vec<_> = buffer
        .iter()
        .filter(|i| i.op() == Some(Op::Decorate))
        .map(|i| i.words()[1])
        .collect();
    assert_eq!(targets, vec![5, 6, 7]);
}

#[test]
fn function_bodies_move_as_units() {
    let mut buffer = buffer_of(&[
        type_void(1),
        function(1, 3, 2),
        label(4),
        ret(),
        function_end(),
        type_int(5, 32),
        capability(1),
    ]);
    sort_buffer(&mut buffer, UnknownOpcodePolicy::Fallback).expect("sort");

    assert_eq!(
        opcodes(buffer.iter()),
        vec![
            Op::Capability.code(),
            Op::TypeVoid.code(),
            Op::TypeInt.code(),
            Op::Function.code(),
            Op::Label.code(),
            Op::Return.code(),
            Op::FunctionEnd.code(),
        ]
    );
}

#[test]
fn function_declarations_precede_definitions() {
    let mut buffer = buffer_of(&[
        function(1, 3, 2),
        label(4),
        function_end(),
        function(1, 5, 2),
        function_end(),
    ]);
    sort_buffer(&mut buffer, UnknownOpcodePolicy::Fallback).expect("sort");

    let functions: Vec<_> = buffer
        .iter()
        .filter(|i| i.op() == Some(Op::Function))
        .filter_map(|i| i.result_id())
        .map(|id| id.value())
        .collect();
    assert_eq!(functions, vec![5, 3]);
}

#[test]
fn unknown_opcodes_fall_back_to_the_last_group() {
    let mut buffer = buffer_of(&[type_void(1)]);
    let words = [pack_header(1, 9999)];
    let unknown = Instruction::from_words(&words).expect("whole");
    buffer.insert(0, &unknown).expect("insert");
    sort_buffer(&mut buffer, UnknownOpcodePolicy::Fallback).expect("sort");
    assert_eq!(opcodes(buffer.iter()), vec![Op::TypeVoid.code(), 9999]);
}

#[test]
fn reject_policy_fails_on_unknown_opcodes() {
    let mut buffer = buffer_of(&[type_void(1)]);
    buffer.add_words(&[pack_header(1, 9999)]).expect("add");
    let before = buffer.words().to_vec();

    let err = sort_buffer(&mut buffer, UnknownOpcodePolicy::Reject).expect_err("unknown opcode");
    assert_eq!(err.kind, SpirvErrorKind::UnknownOpcode);
    assert_eq!(buffer.words(), before.as_slice());
}

#[test]
fn unbalanced_function_framing_is_reported() {
    let mut open = buffer_of(&[function(1, 3, 2), label(4)]);
    let err = sort_buffer(&mut open, UnknownOpcodePolicy::Fallback).expect_err("no end");
    assert_eq!(err.kind, SpirvErrorKind::UnterminatedFunction);

    let mut stray = buffer_of(&[type_void(1), function_end()]);
    let err = sort_buffer(&mut stray, UnknownOpcodePolicy::Fallback).expect_err("stray end");
    assert_eq!(err.kind, SpirvErrorKind::UnopenedFunction);
}

#[test]
fn module_scoped_groups_stop_before_functions() {
    let capability = InstructionGroup::of(Op::Capability.code()).expect("known");
    let function = InstructionGroup::of(Op::Function.code()).expect("known");
    assert!(capability.is_module_scoped());
    assert!(!function.is_module_scoped());
    assert_eq!(
        InstructionGroup::of(Op::ExecutionModeId.code()),
        Some(InstructionGroup::ExecutionMode)
    );
    assert_eq!(
        InstructionGroup::of(Op::DecorateString.code()),
        Some(InstructionGroup::Annotation)
    );
}

#[test]
fn groups_follow_layout_order() {
    let order = [
        Op::Capability,
        Op::Extension,
        Op::ExtInstImport,
        Op::MemoryModel,
        Op::EntryPoint,
        Op::ExecutionMode,
        Op::String,
        Op::Name,
        Op::ModuleProcessed,
        Op::Decorate,
        Op::TypeVoid,
        Op::Function,
        Op::Label,
    ];
    let groups: Vec<_> = order
        .iter()
        .map(|op| InstructionGroup::of(op.code()).expect("known opcode"))
        .collect();
    assert!(groups.is_sorted());
    assert!(groups.windows(2).all(|pair| pair[0] != pair[1]));
    assert_eq!(InstructionGroup::of(9999), None);
}
