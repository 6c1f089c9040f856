//! Logical-layout grouping and the stable sort over whole instructions.

use crate::spirv::buffer::WordBuffer;
use crate::spirv::error::{SpirvError, SpirvErrorKind};
use crate::spirv::instruction::split_header;
use crate::spirv::opcode::Op;
use crate::spirv::options::UnknownOpcodePolicy;

/// Module layout sections, in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstructionGroup {
    Capability,
    Extension,
    ExtInstImport,
    MemoryModel,
    EntryPoint,
    ExecutionMode,
    DebugSource,
    DebugName,
    DebugModuleProcessed,
    Annotation,
    TypesValues,
    FunctionDeclaration,
    FunctionDefinition,
}

impl InstructionGroup {
    /// Classifies a raw opcode. `None` for opcodes without a schema.
    ///
    /// Function framing opcodes classify as declarations; the sort pass
    /// lifts a whole function to `FunctionDefinition` once it sees a label.
    pub fn of(opcode: u16) -> Option<Self> {
        let op = Op::from_u16(opcode)?;
        Some(match op {
            Op::Capability => Self::Capability,
            Op::Extension => Self::Extension,
            Op::ExtInstImport => Self::ExtInstImport,
            Op::MemoryModel => Self::MemoryModel,
            Op::EntryPoint => Self::EntryPoint,
            Op::ExecutionMode | Op::ExecutionModeId => Self::ExecutionMode,
            Op::String | Op::Source | Op::SourceExtension | Op::SourceContinued => {
                Self::DebugSource
            }
            Op::Name | Op::MemberName => Self::DebugName,
            Op::ModuleProcessed => Self::DebugModuleProcessed,
            Op::Decorate
            | Op::MemberDecorate
            | Op::DecorationGroup
            | Op::GroupDecorate
            | Op::GroupMemberDecorate
            | Op::DecorateId
            | Op::DecorateString
            | Op::MemberDecorateString => Self::Annotation,
            Op::TypeVoid
            | Op::TypeBool
            | Op::TypeInt
            | Op::TypeFloat
            | Op::TypeVector
            | Op::TypeMatrix
            | Op::TypeImage
            | Op::TypeSampler
            | Op::TypeSampledImage
            | Op::TypeArray
            | Op::TypeRuntimeArray
            | Op::TypeStruct
            | Op::TypeOpaque
            | Op::TypePointer
            | Op::TypeFunction
            | Op::TypeEvent
            | Op::TypeDeviceEvent
            | Op::TypeReserveId
            | Op::TypeQueue
            | Op::TypePipe
            | Op::TypeForwardPointer
            | Op::TypePipeStorage
            | Op::TypeNamedBarrier
            | Op::ConstantTrue
            | Op::ConstantFalse
            | Op::Constant
            | Op::ConstantComposite
            | Op::ConstantSampler
            | Op::ConstantNull
            | Op::ConstantPipeStorage
            | Op::SpecConstantTrue
            | Op::SpecConstantFalse
            | Op::SpecConstant
            | Op::SpecConstantComposite
            | Op::SpecConstantOp
            | Op::Undef
            | Op::Variable
            | Op::Line
            | Op::NoLine => Self::TypesValues,
            Op::Function | Op::FunctionParameter | Op::FunctionEnd => Self::FunctionDeclaration,
            _ => Self::FunctionDefinition,
        })
    }

    /// Returns `true` for groups that live outside function bodies.
    pub fn is_module_scoped(self) -> bool {
        self < Self::FunctionDeclaration
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    group: InstructionGroup,
    start: usize,
    end: usize,
}

/// Stable-sorts `buffer` into layout-group order.
///
/// Instructions between `OpFunction` and `OpFunctionEnd` move as one unit.
/// Returns `false` without touching the buffer when it is already ordered.
pub fn sort_buffer(buffer: &mut WordBuffer, policy: UnknownOpcodePolicy) -> Result<bool, SpirvError> {
    let mut spans = collect_spans(buffer.words(), policy)?;
    if spans.is_sorted_by_key(|span| span.group) {
        return Ok(false);
    }

    spans.sort_by_key(|span| span.group);
    let mut sorted = buffer.pool().rent(buffer.len_words())?;
    let target = sorted.vec_mut();
    for span in &spans {
        target.extend_from_slice(&buffer.words()[span.start..span.end]);
    }
    tracing::debug!(
        spans = spans.len(),
        words = buffer.len_words(),
        "reordered instructions into layout groups"
    );
    buffer.replace_contents(sorted);
    Ok(true)
}

fn collect_spans(words: &[u32], policy: UnknownOpcodePolicy) -> Result<Vec<Span>, SpirvError> {
    let mut spans = Vec::new();
    let mut function: Option<Span> = None;
    let mut offset = 0;

    while offset < words.len() {
        let (count, opcode) = split_header(words[offset]);
        let end = offset + count as usize;
        let group = match (InstructionGroup::of(opcode), policy) {
            (Some(group), _) => group,
            (None, UnknownOpcodePolicy::Fallback) => InstructionGroup::FunctionDefinition,
            (None, UnknownOpcodePolicy::Reject) => return Err(SpirvError::unknown_opcode(opcode)),
        };

        match (Op::from_u16(opcode), function.as_mut()) {
            (Some(Op::Function), Some(_)) => {
                return Err(SpirvError::sequencing(
                    SpirvErrorKind::UnterminatedFunction,
                    format!("OpFunction at word {offset} opens inside another function"),
                ));
            }
            (Some(Op::Function), None) => {
                function = Some(Span {
                    group: InstructionGroup::FunctionDeclaration,
                    start: offset,
                    end,
                });
            }
            (Some(Op::FunctionEnd), Some(open)) => {
                open.end = end;
                spans.push(*open);
                function = None;
            }
            (Some(Op::FunctionEnd), None) => {
                return Err(SpirvError::sequencing(
                    SpirvErrorKind::UnopenedFunction,
                    format!("OpFunctionEnd at word {offset} closes no function"),
                ));
            }
            (op, Some(open)) => {
                if op == Some(Op::Label) {
                    open.group = InstructionGroup::FunctionDefinition;
                }
                open.end = end;
            }
            (_, None) => spans.push(Span {
                group,
                start: offset,
                end,
            }),
        }
        offset = end;
    }

    if let Some(open) = function {
        return Err(SpirvError::sequencing(
            SpirvErrorKind::UnterminatedFunction,
            format!("OpFunction at word {} has no OpFunctionEnd", open.start),
        ));
    }
    Ok(spans)
}
