//! Property-based tests for the word buffer and layout passes using `proptest`.

use proptest::prelude::*;
use spvbuf::spirv::module::{InstructionGroup, recompute_bound, sort_buffer};
use spvbuf::spirv::{
    AssembledModule, Instruction, ModuleBuffer, SpirvOptions, UnknownOpcodePolicy, WordBuffer,
};

use super::support::{capability, decorate, name, type_int, type_void};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Edit {
    Add(u32, String),
    Insert(usize, u32, String),
    Remove(usize),
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{0,12}"
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (1u32..1000, arb_name()).prop_map(|(id, value)| Edit::Add(id, value)),
        (0usize..32, 1u32..1000, arb_name()).prop_map(|(at, id, value)| Edit::Insert(at, id, value)),
        (0usize..32).prop_map(Edit::Remove),
    ]
}

/// Module-scoped instructions from several layout groups.
fn arb_declaration() -> impl Strategy<Value = Instruction<'static>> {
    prop_oneof![
        (1u32..8).prop_map(capability),
        (1u32..50, 0u32..40).prop_map(|(target, decoration)| decorate(target, decoration)),
        (1u32..50, arb_name()).prop_map(|(target, value)| name(target, &value)),
        (1u32..50).prop_map(type_void),
        (1u32..50).prop_map(|result| type_int(result, 32)),
    ]
}

// ---------------------------------------------------------------------------
// Buffer edits match a vector model
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn edits_keep_buffer_equal_to_model(edits in prop::collection::vec(arb_edit(), 0..48)) {
        let options = SpirvOptions { initial_capacity: 2, ..SpirvOptions::default() };
        let mut buffer = WordBuffer::with_options(options);
        let mut model: Vec<Instruction<'static>> = Vec::new();

        for edit in edits {
            match edit {
                Edit::Add(id, value) => {
                    let instruction = name(id, &value);
                    buffer.add(&instruction).expect("add");
                    model.push(instruction);
                }
                Edit::Insert(at, id, value) => {
                    let at = at.min(model.len());
                    let instruction = name(id, &value);
                    buffer.insert(at, &instruction).expect("insert");
                    model.insert(at, instruction);
                }
                Edit::Remove(at) => {
                    if model.is_empty() {
                        continue;
                    }
                    let at = at % model.len();
                    let removed = buffer.remove_at(at).expect("remove");
                    prop_assert_eq!(&removed, &model.remove(at));
                }
            }
        }

        let actual: Vec<_> = buffer.iter().map(|i| i.into_owned()).collect();
        prop_assert_eq!(actual, model.clone());
        let words: usize = model.iter().map(|i| i.word_count()).sum();
        prop_assert_eq!(buffer.len_words(), words);
        prop_assert!(buffer.capacity_words() >= buffer.len_words());
    }

    #[test]
    fn names_round_trip(value in "\\PC{0,24}") {
        let value = value.replace('\0', "");
        let instruction = name(1, &value);
        let decoded = instruction.operand("Name").expect("name operand");
        prop_assert_eq!(decoded.as_str(), Some(value.as_str()));
    }
}

// ---------------------------------------------------------------------------
// Layout properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn sort_orders_groups_and_is_stable(
        declarations in prop::collection::vec(arb_declaration(), 0..40)
    ) {
        let mut buffer = WordBuffer::new();
        for instruction in &declarations {
            buffer.add(instruction).expect("add");
        }
        sort_buffer(&mut buffer, UnknownOpcodePolicy::Fallback).expect("sort");

        let mut expected = declarations.clone();
        expected.sort_by_key(|i| InstructionGroup::of(i.opcode()));
        let actual: Vec<_> = buffer.iter().map(|i| i.into_owned()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn bound_is_monotonic_and_matches_recompute(
        results in prop::collection::vec(1u32..10_000, 0..32)
    ) {
        let mut module = ModuleBuffer::new(SpirvOptions::default());
        let mut previous = module.bound();
        for result in &results {
            module.add(&type_int(*result, 32)).expect("add");
            prop_assert!(module.bound() >= previous);
            previous = module.bound();
        }

        let expected = results.iter().max().map_or(1, |max| max + 1);
        prop_assert_eq!(module.bound(), expected);
        prop_assert_eq!(recompute_bound(module.iter()), expected);
    }

    #[test]
    fn assembled_bytes_parse_back(
        declarations in prop::collection::vec(arb_declaration(), 0..24)
    ) {
        let mut module = ModuleBuffer::new(SpirvOptions::default());
        for instruction in &declarations {
            module.add(instruction).expect("add");
        }
        let assembled = module.assemble().expect("assemble");
        let parsed = AssembledModule::from_bytes(&assembled.to_bytes()).expect("parse");
        prop_assert_eq!(parsed.words(), assembled.words());
        prop_assert_eq!(parsed.instructions().count(), declarations.len());
    }
}
