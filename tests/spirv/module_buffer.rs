use spvbuf::spirv::{
    Id, Instruction, ModuleBuffer, Op, Section, SpirvErrorKind, SpirvOptions, UnknownOpcodePolicy,
    VariableClass, pack_header,
};

use super::support::{
    STORAGE_FUNCTION, STORAGE_INPUT, STORAGE_OUTPUT, STORAGE_PRIVATE, capability, constant, decorate, function, function_end,
    label, name, opcodes, parameter, ret, type_function, type_int, type_void, variable,
};

fn module() -> ModuleBuffer {
    ModuleBuffer::new(SpirvOptions::default())
}

fn add_all(module: &mut ModuleBuffer, instructions: &[Instruction<'_>]) {
    for instruction in instructions {
        module.add(instruction).expect("add should succeed");
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn instructions_route_to_declarations_or_open_function() {
    let mut module = module();
    add_all(
        &mut module,
        &[
            type_void(1),
            type_function(2, 1),
            name(3, "main"),
            function(1, 3, 2),
            label(4),
            type_int(5, 32),
            ret(),
            function_end(),
        ],
    );

    assert_eq!(
        opcodes(module.declarations().iter()),
        vec![
            Op::TypeVoid.code(),
            Op::TypeFunction.code(),
            Op::Name.code(),
            Op::TypeInt.code()
        ]
    );
    let main = module.function("main").expect("function named by OpName");
    assert_eq!(main.id(), Id::new(3));
    assert!(main.is_definition());
    assert!(main.is_closed());
    assert_eq!(
        opcodes(main.buffer().iter()),
        vec![
            Op::Function.code(),
            Op::Label.code(),
            Op::Return.code(),
            Op::FunctionEnd.code()
        ]
    );
    assert!(module.open_function().is_none());
}

#[test]
fn unnamed_function_is_keyed_by_result_id() {
    let mut module = module();
    add_all(&mut module, &[type_void(1), type_function(2, 1), function(1, 7, 2)]);
    assert_eq!(module.open_function().expect("open").name(), "%7");
    module.add(&function_end()).expect("close");
    assert!(module.function("%7").is_some());
}

#[test]
fn add_returns_handles_into_the_routed_section() {
    let mut module = module();
    let declaration = module.add(&type_void(1)).expect("add");
    let opened = module.add(&function(1, 2, 3)).expect("open");
    let body = module.add(&label(4)).expect("body");

    assert_eq!(declaration.section, Section::Declarations);
    assert_eq!(opened.section, Section::Function(0));
    assert_eq!(body.section, Section::Function(0));
    assert_eq!(module.view(body).expect("resolves"), label(4));
    assert_eq!(module.view(declaration).expect("resolves"), type_void(1));
}

#[test]
fn function_storage_variables_go_to_the_open_function() {
    let mut module = module();
    add_all(
        &mut module,
        &[
            variable(10, 11, STORAGE_PRIVATE),
            function(1, 3, 2),
            label(4),
            variable(10, 12, STORAGE_FUNCTION),
            variable(10, 13, STORAGE_PRIVATE),
        ],
    );

    let globals: Vec<_> = module
        .declarations()
        .iter()
        .filter_map(|i| i.result_id())
        .map(Id::value)
        .collect();
    assert_eq!(globals, vec![11, 13]);
    let body = module.open_function().expect("open");
    assert!(
        body.buffer()
            .iter()
            .any(|i| i.result_id() == Some(Id::new(12)))
    );
}

// ---------------------------------------------------------------------------
// Sequencing errors
// ---------------------------------------------------------------------------

#[test]
fn nested_function_is_unterminated() {
    let mut module = module();
    module.add(&function(1, 3, 2)).expect("open");
    let err = module.add(&function(1, 4, 2)).expect_err("already open");
    assert_eq!(err.kind, SpirvErrorKind::UnterminatedFunction);
}

#[test]
fn function_end_without_function_is_unopened() {
    let mut module = module();
    let err = module.add(&function_end()).expect_err("nothing open");
    assert_eq!(err.kind, SpirvErrorKind::UnopenedFunction);
}

#[test]
fn body_instruction_without_function_is_rejected() {
    let mut module = module();
    let err = module.add(&label(4)).expect_err("label needs a function");
    assert_eq!(err.kind, SpirvErrorKind::NoOpenFunction);

    let err = module
        .add(&variable(1, 2, STORAGE_FUNCTION))
        .expect_err("function storage needs a function");
    assert_eq!(err.kind, SpirvErrorKind::NoOpenFunction);
    assert!(module.declarations().is_empty());
}

#[test]
fn duplicate_function_name_is_rejected() {
    let mut module = module();
    module.begin_function("main", &function(1, 3, 2)).expect("open");
    module.add(&function_end()).expect("close");
    let err = module
        .begin_function("main", &function(1, 4, 2))
        .expect_err("name taken");
    assert_eq!(err.kind, SpirvErrorKind::DuplicateFunction);
}

#[test]
fn begin_function_requires_op_function() {
    let mut module = module();
    let err = module
        .begin_function("main", &label(1))
        .expect_err("not an OpFunction");
    assert_eq!(err.kind, SpirvErrorKind::SchemaError);
}

#[test]
fn reject_policy_refuses_unknown_opcodes() {
    let options = SpirvOptions {
        unknown_opcodes: UnknownOpcodePolicy::Reject,
        ..SpirvOptions::default()
    };
    let mut module = ModuleBuffer::new(options);
    module.add(&function(1, 3, 2)).expect("open");
    let words = [pack_header(1, 9999)];
    let unknown = Instruction::from_words(&words).expect("whole");
    let err = module.add(&unknown).expect_err("unknown opcode");
    assert_eq!(err.kind, SpirvErrorKind::UnknownOpcode);
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[test]
fn capability_can_be_inserted_at_the_front() {
    let mut module = module();
    add_all(&mut module, &[type_void(1), type_int(2, 32)]);
    module
        .insert_declaration(0, &capability(1))
        .expect("insert capability");
    assert_eq!(
        module.declarations().get(0).expect("first").op(),
        Some(Op::Capability)
    );

    let err = module
        .insert_declaration(0, &label(3))
        .expect_err("labels are not module scoped");
    assert_eq!(err.kind, SpirvErrorKind::SchemaError);
}

#[test]
fn retain_declarations_removes_matching_instructions() {
    let mut module = module();
    add_all(&mut module, &[type_void(1), decorate(1, 3), decorate(1, 4)]);
    let removed = module.retain_declarations(|i| i.op() != Some(Op::Decorate));
    assert_eq!(removed, 2);
    assert_eq!(module.declarations().count(), 1);
}

// ---------------------------------------------------------------------------
// Scoped lookup
// ---------------------------------------------------------------------------

fn scoped_module() -> ModuleBuffer {
    let mut module = module();
    add_all(
        &mut module,
        &[
            type_int(10, 32),
            name(20, "g"),
            name(21, "p"),
            name(22, "x"),
            variable(10, 20, STORAGE_PRIVATE),
            function(1, 3, 2),
            parameter(10, 21),
            label(4),
            variable(10, 22, STORAGE_FUNCTION),
        ],
    );
    module
}

#[test]
fn global_lookup_sees_only_module_variables() {
    let module = scoped_module();
    let global = module.global_variable("g").expect("global variable");
    assert_eq!(global.result_id(), Some(Id::new(20)));
    assert!(module.global_variable("x").is_none());
    assert!(module.global_variable("p").is_none());
    assert!(module.global_variable("missing").is_none());
}

#[test]
fn io_variables_are_found_by_name_and_class() {
    let mut module = module();
    add_all(
        &mut module,
        &[
            name(30, "position"),
            name(31, "color"),
            name(32, "state"),
            type_int(2, 32),
            variable(2, 30, STORAGE_INPUT),
            variable(2, 31, STORAGE_OUTPUT),
            variable(2, 32, STORAGE_PRIVATE),
        ],
    );

    let input = module.io_variable("position").expect("input variable");
    assert_eq!(input.result_id(), Some(Id::new(30)));
    assert_eq!(VariableClass::of(&input), Some(VariableClass::Io));
    let output = module.io_variable("color").expect("output variable");
    assert_eq!(output.result_id(), Some(Id::new(31)));
    assert!(module.io_variable("state").is_none());

    assert!(module.global_variable("position").is_some());
    let private = module.global_variable("state").expect("private variable");
    assert_eq!(VariableClass::of(&private), Some(VariableClass::Global));

    let io: Vec<_> = module.io_variables().filter_map(|v| v.result_id()).collect();
    assert_eq!(io, vec![Id::new(30), Id::new(31)]);
}

#[test]
fn variable_class_follows_storage_class() {
    assert_eq!(
        VariableClass::of(&variable(2, 3, STORAGE_FUNCTION)),
        Some(VariableClass::Local)
    );
    assert_eq!(VariableClass::of(&variable(2, 3, STORAGE_OUTPUT)), Some(VariableClass::Io));
    assert_eq!(VariableClass::of(&type_int(2, 32)), None);
}

#[test]
fn local_lookup_sees_only_the_open_function() {
    let mut module = scoped_module();
    let local = module.local_variable("x").expect("local variable");
    assert_eq!(local.result_id(), Some(Id::new(22)));
    let param = module.local_variable("p").expect("parameter");
    assert_eq!(param.op(), Some(Op::FunctionParameter));
    assert!(module.local_variable("g").is_none());

    module.add(&ret()).expect("return");
    module.add(&function_end()).expect("close");
    assert!(module.local_variable("x").is_none());
}

// ---------------------------------------------------------------------------
// Ids and bounds
// ---------------------------------------------------------------------------

#[test]
fn bound_never_decreases_while_adding() {
    let mut module = module();
    let mut bounds = vec![module.bound()];
    for instruction in [
        type_int(5, 32),
        type_void(2),
        constant(5, 9, 1),
        name(9, "nine"),
        function(2, 7, 3),
        label(8),
    ] {
        module.add(&instruction).expect("add");
        bounds.push(module.bound());
    }

    assert!(bounds.is_sorted());
    assert_eq!(module.bound(), 10);
    assert_eq!(module.recompute_bound(), 10);
}

#[test]
fn empty_module_has_bound_one() {
    let mut module = module();
    assert_eq!(module.bound(), 1);
    assert_eq!(module.recompute_bound(), 1);
}

#[test]
fn allocator_skips_ids_already_emitted() {
    let mut module = module();
    let first = module.alloc_id().expect("first id");
    assert_eq!(first, Id::new(1));
    module.add(&type_int(6, 32)).expect("add");
    assert_eq!(module.alloc_id().expect("next id"), Id::new(7));
}

#[test]
fn allocator_reports_exhausted_id_space() {
    let mut module = module();
    module.add(&type_int(u32::MAX, 32)).expect("largest id");
    assert_eq!(module.bound(), u32::MAX);
    let err = module.alloc_id().expect_err("no id left");
    assert_eq!(err.kind, SpirvErrorKind::LimitExceeded);
}

#[test]
fn unknown_opcode_counts_both_leading_words_toward_bound() {
    let mut module = module();
    module.add(&function(1, 3, 2)).expect("open");
    let words = [pack_header(4, 9999), 1, 30, 2];
    let unknown = Instruction::from_words(&words).expect("whole");
    module.add(&unknown).expect("fallback keeps unknown opcodes");
    assert_eq!(module.bound(), 31);
    assert_eq!(module.recompute_bound(), 31);
    assert_eq!(module.alloc_id().expect("fresh id"), Id::new(31));
}

#[test]
fn known_result_ids_define_the_bound() {
    let mut module = module();
    module.add(&function(1, 3, 2)).expect("open");
    let words = [pack_header(5, Op::FMod.code()), 1, 20, 4, 4];
    let fmod = Instruction::from_words(&words).expect("whole");
    module.add(&fmod).expect("add");
    assert_eq!(module.bound(), 21);
}

// ---------------------------------------------------------------------------
// Duplication and iteration
// ---------------------------------------------------------------------------

#[test]
fn duplicate_offsets_non_zero_ids() {
    let original = function(1, 3, 2);
    let copy = ModuleBuffer::duplicate(&original, 6).expect("duplicate");
    assert_eq!(&copy.words()[1..], &[7, 9, 0, 8]);
    assert_eq!(&original.words()[1..], &[1, 3, 0, 2]);
}

#[test]
fn iteration_yields_declarations_then_functions_in_order() {
    let mut module = module();
    add_all(
        &mut module,
        &[
            type_void(1),
            function(1, 3, 2),
            function_end(),
            type_int(4, 32),
            function(1, 5, 2),
            label(6),
            function_end(),
        ],
    );

    let ids: Vec<_> = module
        .iter()
        .filter_map(|i| i.result_id())
        .map(Id::value)
        .collect();
    assert_eq!(ids, vec![1, 4, 3, 5, 6]);
    assert_eq!(module.functions().len(), 2);
    assert_eq!(module.iter().count(), 7);
}

#[test]
fn sort_moves_declarations_ahead_of_definitions() {
    let mut module = module();
    add_all(
        &mut module,
        &[
            type_void(1),
            name(3, "defined"),
            name(5, "imported"),
            function(1, 3, 2),
            label(4),
            function_end(),
            function(1, 5, 2),
            function_end(),
        ],
    );
    module.sort().expect("sort");

    let names: Vec<_> = module.functions().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["imported", "defined"]);
    assert_eq!(module.function("defined").expect("lookup").id(), Id::new(3));
}

#[test]
fn sort_refuses_open_function() {
    let mut module = module();
    module.add(&function(1, 3, 2)).expect("open");
    let err = module.sort().expect_err("function still open");
    assert_eq!(err.kind, SpirvErrorKind::UnterminatedFunction);
}
