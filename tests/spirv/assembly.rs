use std::collections::BTreeSet;

use spvbuf::spirv::module::{HEADER_WORDS, MAGIC, assemble_buffer};
use spvbuf::spirv::{
    AssembledModule, Id, Instruction, ModuleBuffer, ModuleHeader, Op, SpirvErrorKind,
    SpirvOptions, WordBuffer, merge, merge_checked, merge_offset, pack_header,
};

use super::support::{
    capability, function, function_end, label, name, ret, type_function, type_int, type_void,
};

fn result_ids<'a>(instructions: impl IntoIterator<Item = Instruction<'a>>) -> BTreeSet<u32> {
    instructions
        .into_iter()
        .filter_map(|i| i.result_id())
        .map(Id::value)
        .collect()
}

/// Ids 1..=5: void, int, function type, one function with a label.
fn module_a() -> ModuleBuffer {
    let mut module = ModuleBuffer::new(SpirvOptions::default());
    for instruction in [
        type_void(1),
        type_int(2, 32),
        type_function(3, 1),
        name(4, "main"),
        function(1, 4, 3),
        label(5),
        ret(),
        function_end(),
    ] {
        module.add(&instruction).expect("add should succeed");
    }
    module
}

/// Ids 1..=3 in an independent id space.
fn buffer_b() -> WordBuffer {
    let mut buffer = WordBuffer::new();
    for instruction in [
        type_void(1),
        type_function(2, 1),
        function(1, 3, 2),
        function_end(),
    ] {
        buffer.add(&instruction).expect("add should succeed");
    }
    buffer
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[test]
fn ordered_module_assembles_unchanged_behind_header() {
    let mut module = ModuleBuffer::new(SpirvOptions::default());
    let body = [
        type_void(1),
        type_function(2, 1),
        function(1, 3, 2),
        function_end(),
    ];
    module.add(&body[0]).expect("void");
    module.add(&body[1]).expect("function type");
    module.begin_function("main", &body[2]).expect("open main");
    module.add(&body[3]).expect("close main");

    let assembled = module.assemble().expect("assemble");
    let header = assembled.header();
    assert_eq!(header.magic, MAGIC);
    assert_eq!(header.version, 0x0001_0300);
    assert_eq!(header.version(), (1, 3));
    assert_eq!(header.generator, 0);
    assert_eq!(header.bound, 4);
    assert_eq!(header.reserved, 0);

    let words = assembled.words();
    assert_eq!(&words[..HEADER_WORDS], &[MAGIC, 0x0001_0300, 0, 4, 0]);
    let expected: Vec<u32> = body.iter().flat_map(|i| i.words().to_vec()).collect();
    assert_eq!(assembled.body(), expected.as_slice());
    assert_eq!(words.len(), HEADER_WORDS + 11);
    assert_eq!(assembled.instructions().count(), 4);
}

#[test]
fn bound_covers_results_of_core_arithmetic() {
    let mut module = ModuleBuffer::new(SpirvOptions::default());
    module.add(&type_void(1)).expect("void");
    module.add(&type_function(2, 1)).expect("function type");
    module.add(&function(1, 3, 2)).expect("open");
    module.add(&label(4)).expect("label");
    let words = [pack_header(5, Op::FMod.code()), 1, 20, 4, 4];
    let fmod = Instruction::from_words(&words).expect("whole");
    module.add(&fmod).expect("fmod");
    module.add(&ret()).expect("return");
    module.add(&function_end()).expect("close");

    let assembled = module.assemble().expect("assemble");
    assert_eq!(assembled.header().bound, 21);
    let reread = AssembledModule::from_words(assembled.words()).expect("valid module");
    assert_eq!(reread.header().bound, 21);

    let copy = ModuleBuffer::duplicate(&fmod, 100).expect("duplicate");
    assert_eq!(copy.result_id(), Some(Id::new(120)));
    assert_eq!(&copy.words()[1..], &[101, 120, 104, 104]);
}

#[test]
fn header_uses_configured_version_and_generator() {
    let options = SpirvOptions {
        version: (1, 5),
        generator: 0x000d_0001,
        ..SpirvOptions::default()
    };
    let mut buffer = WordBuffer::with_options(options);
    buffer.add(&type_void(1)).expect("add");
    let assembled = assemble_buffer(&mut buffer).expect("assemble");
    assert_eq!(assembled.header().version, 0x0001_0500);
    assert_eq!(assembled.header().generator, 0x000d_0001);
    assert_eq!(assembled.header().bound, 2);
}

#[test]
fn assembly_sorts_late_capabilities_to_the_front() {
    let mut module = module_a();
    module.add(&capability(1)).expect("late capability");
    let assembled = module.assemble().expect("assemble");
    let first = assembled.instructions().next().expect("first instruction");
    assert_eq!(first.op(), Some(Op::Capability));
}

#[test]
fn open_function_blocks_assembly() {
    let mut module = ModuleBuffer::new(SpirvOptions::default());
    module.add(&function(1, 3, 2)).expect("open");
    let err = module.assemble().expect_err("still open");
    assert_eq!(err.kind, SpirvErrorKind::UnterminatedFunction);
}

#[test]
fn assembly_respects_word_limit() {
    let options = SpirvOptions {
        max_words: 6,
        ..SpirvOptions::default()
    };
    let mut module = ModuleBuffer::new(options);
    module.add(&type_void(1)).expect("two words fit");
    let err = module.assemble().expect_err("header pushes past the limit");
    assert_eq!(err.kind, SpirvErrorKind::LimitExceeded);
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

#[test]
fn duplicating_with_offset_keeps_id_spaces_disjoint() {
    let mut module = module_a();
    assert_eq!(module.bound(), 6);

    let added = module
        .append_duplicated(buffer_b().iter(), module.bound())
        .expect("append duplicated");
    assert_eq!(added, 4);

    let ids = result_ids(module.iter());
    let expected: BTreeSet<u32> = (1..=5).chain(7..=9).collect();
    assert_eq!(ids, expected);
    assert_eq!(module.recompute_bound(), 10);
    assert!(module.function("%9").is_some());

    let assembled = module.assemble().expect("assemble");
    assert_eq!(assembled.header().bound, 10);
}

#[test]
fn merge_offset_shifts_the_second_buffer() {
    let mut a = WordBuffer::new();
    for result in 1..=5 {
        a.add(&type_int(result, 32)).expect("add");
    }
    let merged = merge_offset(&a, &buffer_b()).expect("merge");
    assert_eq!(merged.bound(), 10);

    let ids = result_ids(merged.buffer().iter());
    let expected: BTreeSet<u32> = (1..=5).chain(7..=9).collect();
    assert_eq!(ids, expected);

    let assembled = merged.assemble().expect("assemble");
    assert_eq!(assembled.header().bound, 10);
}

#[test]
fn plain_merge_trusts_the_caller() {
    let a = buffer_b();
    let merged = merge(&a, &buffer_b()).expect("no validation");
    assert_eq!(merged.buffer().count(), 8);
    assert_eq!(merged.bound(), 4);
}

#[test]
fn checked_merge_reports_colliding_ids() {
    let a = buffer_b();
    let err = merge_checked(&a, &buffer_b()).expect_err("ids collide");
    assert_eq!(err.kind, SpirvErrorKind::IdCollision);

    let mut disjoint = WordBuffer::new();
    disjoint.add(&type_int(40, 32)).expect("add");
    let merged = merge_checked(&a, &disjoint).expect("disjoint ids");
    assert_eq!(merged.bound(), 41);
}

// ---------------------------------------------------------------------------
// Parsing assembled output
// ---------------------------------------------------------------------------

#[test]
fn bytes_round_trip_through_parsing() {
    let assembled = module_a().assemble().expect("assemble");
    let bytes = assembled.to_bytes();
    assert_eq!(bytes.len(), assembled.words().len() * 4);
    assert_eq!(&bytes[..4], &MAGIC.to_le_bytes());

    let parsed = AssembledModule::from_bytes(&bytes).expect("parse");
    assert_eq!(parsed, assembled);
    assert_eq!(parsed.header(), assembled.header());
}

#[test]
fn big_endian_bytes_are_accepted() {
    let assembled = module_a().assemble().expect("assemble");
    let bytes: Vec<u8> = assembled
        .words()
        .iter()
        .flat_map(|word| word.to_be_bytes())
        .collect();
    let parsed = AssembledModule::from_bytes(&bytes).expect("parse");
    assert_eq!(parsed.words(), assembled.words());
}

#[test]
fn header_read_rejects_malformed_headers() {
    let err = ModuleHeader::read(&[MAGIC, 0, 0]).expect_err("short");
    assert_eq!(err.kind, SpirvErrorKind::InvalidHeader);

    let err = ModuleHeader::read(&[0xdead_beef, 0x0001_0300, 0, 4, 0]).expect_err("bad magic");
    assert_eq!(err.kind, SpirvErrorKind::InvalidHeader);

    let err = ModuleHeader::read(&[MAGIC, 0x0001_0300, 0, 4, 1]).expect_err("reserved word");
    assert_eq!(err.kind, SpirvErrorKind::InvalidHeader);

    let err = ModuleHeader::read(&[MAGIC, 0x0001_0300, 0, 0, 0]).expect_err("zero bound");
    assert_eq!(err.kind, SpirvErrorKind::InvalidHeader);
}

#[test]
fn from_words_rejects_corrupt_body_and_low_bound() {
    let corrupt = [MAGIC, 0x0001_0300, 0, 4, 0, pack_header(3, Op::TypeVoid.code()), 1];
    let err = AssembledModule::from_words(&corrupt).expect_err("count runs past the end");
    assert_eq!(err.kind, SpirvErrorKind::InvariantViolation);

    let low_bound = [MAGIC, 0x0001_0300, 0, 2, 0, pack_header(2, Op::TypeVoid.code()), 5];
    let err = AssembledModule::from_words(&low_bound).expect_err("id 5 needs bound 6");
    assert_eq!(err.kind, SpirvErrorKind::InvalidHeader);
}

#[test]
fn from_bytes_rejects_partial_words() {
    let err = AssembledModule::from_bytes(&[0x03, 0x02, 0x23]).expect_err("three bytes");
    assert_eq!(err.kind, SpirvErrorKind::InvalidHeader);
}
