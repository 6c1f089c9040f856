//! Operand kinds, operand values and the schema-driven operand codec.

use std::borrow::Cow;
use std::fmt;

use smallvec::SmallVec;

use crate::spirv::error::SpirvError;
use crate::spirv::ids::Id;
use crate::spirv::opcode::Op;

/// Wire shape of one schema operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Type of the instruction's result.
    IdResultType,
    /// The instruction's result.
    IdResult,
    /// Reference to another result.
    IdRef,
    /// Reference to a scope constant.
    IdScope,
    /// Reference to a memory-semantics constant.
    IdMemorySemantics,
    /// One-word literal integer.
    LiteralInteger,
    /// Literal whose width depends on the result type (1 or 2 words, or more).
    LiteralContextDependentNumber,
    /// Null-terminated UTF-8 string packed 4 bytes per word.
    LiteralString,
    /// Instruction number inside an extended instruction set.
    LiteralExtInstInteger,
    /// Opcode embedded in `OpSpecConstantOp`; its operands follow.
    LiteralSpecConstantOpInteger,
    /// Single enumerant word.
    ValueEnum,
    /// Bit-mask enumerant word.
    BitEnum,
    /// `(literal, id)` word pair.
    PairLiteralIntegerIdRef,
    /// `(id, id)` word pair.
    PairIdRefIdRef,
    /// `(id, literal)` word pair.
    PairIdRefLiteralInteger,
}

impl OperandKind {
    /// Returns `true` for kinds whose words are ids.
    pub const fn is_id(self) -> bool {
        matches!(
            self,
            Self::IdResultType | Self::IdResult | Self::IdRef | Self::IdScope | Self::IdMemorySemantics
        )
    }

    /// Returns `true` when `operand` can be encoded in a slot of this kind.
    pub fn accepts(self, operand: &Operand<'_>) -> bool {
        match self {
            Self::IdResultType | Self::IdResult | Self::IdRef | Self::IdScope | Self::IdMemorySemantics => {
                matches!(operand, Operand::Id(_))
            }
            Self::LiteralInteger | Self::LiteralExtInstInteger | Self::LiteralSpecConstantOpInteger => {
                matches!(operand, Operand::LiteralInteger(_))
            }
            Self::LiteralContextDependentNumber => matches!(
                operand,
                Operand::LiteralInteger(_)
                    | Operand::LiteralInteger64(_)
                    | Operand::LiteralFloat(_)
                    | Operand::LiteralFloat64(_)
                    | Operand::Words(_)
            ),
            Self::LiteralString => matches!(operand, Operand::LiteralString(_)),
            Self::ValueEnum | Self::BitEnum => matches!(operand, Operand::Enum(_)),
            Self::PairLiteralIntegerIdRef => matches!(operand, Operand::PairLiteralId(..)),
            Self::PairIdRefIdRef => matches!(operand, Operand::PairIdId(..)),
            Self::PairIdRefLiteralInteger => matches!(operand, Operand::PairIdLiteral(..)),
        }
    }
}

/// How many times a schema operand may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// Exactly once.
    One,
    /// Zero or one time; only trailing operands may follow.
    Optional,
    /// Zero or more times, up to the end of the instruction.
    Variadic,
}

/// One named operand slot in an opcode schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperandSpec {
    /// Operand name, unique within its opcode.
    pub name: &'static str,
    /// Wire shape.
    pub kind: OperandKind,
    /// Repetition rule.
    pub quantifier: Quantifier,
}

/// A typed operand value, either supplied for encoding or produced by decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<'a> {
    /// Any id-valued operand.
    Id(Id),
    /// 32-bit literal integer.
    LiteralInteger(u32),
    /// 64-bit literal integer, low word first.
    LiteralInteger64(u64),
    /// 32-bit float literal.
    LiteralFloat(f32),
    /// 64-bit float literal, low word first.
    LiteralFloat64(f64),
    /// String literal.
    LiteralString(Cow<'a, str>),
    /// Inline enumerant or mask.
    Enum(u32),
    /// Inline word array (context-dependent literals).
    Words(Cow<'a, [u32]>),
    /// `(literal, id)` pair, as used by switch targets.
    PairLiteralId(u32, Id),
    /// `(id, id)` pair, as used by phi operands.
    PairIdId(Id, Id),
    /// `(id, literal)` pair, as used by group member decorations.
    PairIdLiteral(Id, u32),
}

/// Interpretation of a context-dependent numeric literal.
///
/// The literal's width comes from the result type, which the words alone do
/// not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralWidth {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl LiteralWidth {
    /// Returns the number of words a literal of this width occupies.
    pub const fn word_count(self) -> usize {
        match self {
            Self::Int32 | Self::Float32 => 1,
            Self::Int64 | Self::Float64 => 2,
        }
    }
}

impl<'a> Operand<'a> {
    /// Creates a string operand.
    pub fn string(value: impl Into<Cow<'a, str>>) -> Self {
        Self::LiteralString(value.into())
    }

    /// Creates an inline word array operand.
    pub fn words(value: impl Into<Cow<'a, [u32]>>) -> Self {
        Self::Words(value.into())
    }

    /// Returns the number of words this operand encodes to.
    pub fn word_count(&self) -> usize {
        match self {
            Self::Id(_) | Self::LiteralInteger(_) | Self::LiteralFloat(_) | Self::Enum(_) => 1,
            Self::LiteralInteger64(_)
            | Self::LiteralFloat64(_)
            | Self::PairLiteralId(..)
            | Self::PairIdId(..)
            | Self::PairIdLiteral(..) => 2,
            Self::LiteralString(value) => string_word_len(value.len()),
            Self::Words(words) => words.len(),
        }
    }

    /// Appends the encoded words to `out`.
    pub fn encode_into<const N: usize>(&self, out: &mut SmallVec<[u32; N]>) {
        match self {
            Self::Id(id) => out.push(id.value()),
            Self::LiteralInteger(value) | Self::Enum(value) => out.push(*value),
            Self::LiteralInteger64(value) => {
                out.push(*value as u32);
                out.push((*value >> 32) as u32);
            }
            Self::LiteralFloat(value) => out.push(value.to_bits()),
            Self::LiteralFloat64(value) => {
                let bits = value.to_bits();
                out.push(bits as u32);
                out.push((bits >> 32) as u32);
            }
            Self::LiteralString(value) => pack_string(value, out),
            Self::Words(words) => out.extend_from_slice(words),
            Self::PairLiteralId(literal, id) => {
                out.push(*literal);
                out.push(id.value());
            }
            Self::PairIdId(first, second) => {
                out.push(first.value());
                out.push(second.value());
            }
            Self::PairIdLiteral(id, literal) => {
                out.push(id.value());
                out.push(*literal);
            }
        }
    }

    /// Returns the id carried by an `Id` operand.
    pub fn as_id(&self) -> Option<Id> {
        match self {
            Self::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns a one-word integer view of the operand.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::LiteralInteger(value) | Self::Enum(value) => Some(*value),
            Self::Words(words) if words.len() == 1 => Some(words[0]),
            _ => None,
        }
    }

    /// Returns a 64-bit integer view of the operand (low word first).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::LiteralInteger(value) => Some(u64::from(*value)),
            Self::LiteralInteger64(value) => Some(*value),
            Self::Words(words) => match words.as_ref() {
                [low] => Some(u64::from(*low)),
                [low, high] => Some(u64::from(*low) | (u64::from(*high) << 32)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns a 32-bit float view of the operand.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::LiteralFloat(value) => Some(*value),
            Self::Words(words) if words.len() == 1 => Some(f32::from_bits(words[0])),
            _ => None,
        }
    }

    /// Returns a 64-bit float view of the operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::LiteralFloat64(value) => Some(*value),
            Self::Words(_) => self.as_u64().map(f64::from_bits),
            _ => None,
        }
    }

    fn literal_bits(&self) -> Option<(u64, usize)> {
        match self {
            Self::LiteralInteger(value) => Some((u64::from(*value), 1)),
            Self::LiteralFloat(value) => Some((u64::from(value.to_bits()), 1)),
            Self::LiteralInteger64(value) => Some((*value, 2)),
            Self::LiteralFloat64(value) => Some((value.to_bits(), 2)),
            Self::Words(words) => match words.as_ref() {
                [low] => Some((u64::from(*low), 1)),
                [low, high] => Some((u64::from(*low) | (u64::from(*high) << 32), 2)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Reinterprets a numeric literal as the variant for `width`.
    ///
    /// Returns `None` when the operand is not numeric or occupies a
    /// different number of words.
    pub fn with_width(&self, width: LiteralWidth) -> Option<Operand<'static>> {
        let (bits, words) = self.literal_bits()?;
        if words != width.word_count() {
            return None;
        }
        Some(match width {
            LiteralWidth::Int32 => Operand::LiteralInteger(bits as u32),
            LiteralWidth::Int64 => Operand::LiteralInteger64(bits),
            LiteralWidth::Float32 => Operand::LiteralFloat(f32::from_bits(bits as u32)),
            LiteralWidth::Float64 => Operand::LiteralFloat64(f64::from_bits(bits)),
        })
    }

    /// Returns the string carried by a string operand.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::LiteralString(value) => Some(value),
            _ => None,
        }
    }

    /// Detaches the operand from any borrowed words.
    pub fn into_owned(self) -> Operand<'static> {
        match self {
            Self::Id(id) => Operand::Id(id),
            Self::LiteralInteger(value) => Operand::LiteralInteger(value),
            Self::LiteralInteger64(value) => Operand::LiteralInteger64(value),
            Self::LiteralFloat(value) => Operand::LiteralFloat(value),
            Self::LiteralFloat64(value) => Operand::LiteralFloat64(value),
            Self::LiteralString(value) => Operand::LiteralString(Cow::Owned(value.into_owned())),
            Self::Enum(value) => Operand::Enum(value),
            Self::Words(words) => Operand::Words(Cow::Owned(words.into_owned())),
            Self::PairLiteralId(literal, id) => Operand::PairLiteralId(literal, id),
            Self::PairIdId(first, second) => Operand::PairIdId(first, second),
            Self::PairIdLiteral(id, literal) => Operand::PairIdLiteral(id, literal),
        }
    }
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::LiteralInteger(value) | Self::Enum(value) => write!(f, "{value}"),
            Self::LiteralInteger64(value) => write!(f, "{value}"),
            Self::LiteralFloat(value) => write!(f, "{value:?}"),
            Self::LiteralFloat64(value) => write!(f, "{value:?}"),
            Self::LiteralString(value) => write!(f, "{value:?}"),
            Self::Words(words) => {
                for (i, word) in words.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{word}")?;
                }
                Ok(())
            }
            Self::PairLiteralId(literal, id) => write!(f, "{literal} {id}"),
            Self::PairIdId(first, second) => write!(f, "{first} {second}"),
            Self::PairIdLiteral(id, literal) => write!(f, "{id} {literal}"),
        }
    }
}

// ---------------------------------------------------------------------------
// String packing
// ---------------------------------------------------------------------------

/// Words occupied by a string of `byte_len` bytes plus its terminator.
pub const fn string_word_len(byte_len: usize) -> usize {
    (byte_len + 1).div_ceil(4)
}

fn pack_string<const N: usize>(value: &str, out: &mut SmallVec<[u32; N]>) {
    let bytes = value.as_bytes();
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        out.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    // The tail always gets its own word so the terminator has room.
    let mut tail = [0u8; 4];
    let rest = chunks.remainder();
    tail[..rest.len()].copy_from_slice(rest);
    out.push(u32::from_le_bytes(tail));
}

/// Decodes a packed string starting at `words[0]`. Returns the string and
/// the number of words it occupies.
pub fn unpack_string(words: &[u32]) -> Result<(String, usize), SpirvError> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for (i, word) in words.iter().enumerate() {
        let word_bytes = word.to_le_bytes();
        if let Some(end) = word_bytes.iter().position(|&byte| byte == 0) {
            if word_bytes[end..].iter().any(|&byte| byte != 0) {
                return Err(SpirvError::invariant_violation(
                    "literal string has bytes after its terminator",
                    format!("word {i} is {word:#010x}"),
                ));
            }
            bytes.extend_from_slice(&word_bytes[..end]);
            let value = String::from_utf8_lossy(&bytes).into_owned();
            return Ok((value, i + 1));
        }
        bytes.extend_from_slice(&word_bytes);
    }
    Err(SpirvError::invariant_violation(
        "unterminated literal string",
        format!("no terminator within {} words", words.len()),
    ))
}

// ---------------------------------------------------------------------------
// Schema checks for encoding
// ---------------------------------------------------------------------------

/// Checks `operands` against the schema of `op` and returns the total
/// instruction word count (including the leading opcode word).
pub fn encoded_word_count(op: Op, operands: &[Operand<'_>]) -> Result<usize, SpirvError> {
    let mut specs = op.operands();
    let mut index = 0;
    let mut next = 0;
    let mut words = 1;

    while let Some(spec) = specs.get(index) {
        index += 1;
        match spec.quantifier {
            Quantifier::One => {
                let Some(operand) = operands.get(next) else {
                    return Err(SpirvError::schema(
                        format!("missing operand for {}", op.name()),
                        format!("required operand `{}` was not supplied", spec.name),
                    ));
                };
                check_kind(op, spec, operand)?;
                words += operand.word_count();
                next += 1;
                if spec.kind == OperandKind::LiteralSpecConstantOpInteger {
                    specs = embedded_operands(operand.as_u32().unwrap_or(u32::MAX))?;
                    index = 0;
                }
            }
            Quantifier::Optional => {
                if let Some(operand) = operands.get(next)
                    && spec.kind.accepts(operand)
                {
                    check_value(op, spec, operand)?;
                    words += operand.word_count();
                    next += 1;
                }
            }
            Quantifier::Variadic => {
                while let Some(operand) = operands.get(next) {
                    if !spec.kind.accepts(operand) {
                        break;
                    }
                    check_value(op, spec, operand)?;
                    words += operand.word_count();
                    next += 1;
                }
            }
        }
    }

    if let Some(extra) = operands.get(next) {
        return Err(SpirvError::schema(
            format!("unexpected operand for {}", op.name()),
            format!("operand #{next} ({extra:?}) matches no schema slot"),
        ));
    }

    Ok(words)
}

fn check_kind(op: Op, spec: &OperandSpec, operand: &Operand<'_>) -> Result<(), SpirvError> {
    if !spec.kind.accepts(operand) {
        return Err(SpirvError::schema(
            format!("operand kind mismatch for {}", op.name()),
            format!("`{}` expects {:?}, got {operand:?}", spec.name, spec.kind),
        ));
    }
    check_value(op, spec, operand)
}

fn check_value(op: Op, spec: &OperandSpec, operand: &Operand<'_>) -> Result<(), SpirvError> {
    match operand {
        Operand::LiteralString(value) if value.contains('\0') => Err(SpirvError::schema(
            format!("string operand for {} contains a NUL byte", op.name()),
            format!("`{}` would decode truncated: {value:?}", spec.name),
        )),
        _ => Ok(()),
    }
}

/// Resolves the operand schema that follows the opcode literal of an
/// `OpSpecConstantOp`.
fn embedded_operands(code: u32) -> Result<&'static [OperandSpec], SpirvError> {
    let code = u16::try_from(code).map_err(|_| {
        SpirvError::schema(
            "embedded opcode out of range",
            format!("OpSpecConstantOp names opcode {code}"),
        )
    })?;
    let op = Op::from_u16(code).ok_or_else(|| SpirvError::unknown_opcode(code))?;
    Ok(op.spec_constant_operands())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// One operand recovered from an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedOperand<'a> {
    /// Schema slot the operand fills.
    pub spec: &'static OperandSpec,
    /// Word offset inside the instruction (the opcode word is offset 0).
    pub offset: usize,
    /// Number of words consumed.
    pub word_count: usize,
    /// Decoded value.
    pub value: Operand<'a>,
}

/// Walks an instruction's words along its opcode schema.
#[derive(Debug, Clone)]
pub struct OperandIter<'a> {
    words: &'a [u32],
    specs: &'static [OperandSpec],
    spec_index: usize,
    pos: usize,
    failed: bool,
}

impl<'a> OperandIter<'a> {
    pub(crate) fn new(words: &'a [u32], specs: &'static [OperandSpec]) -> Self {
        Self {
            words,
            specs,
            spec_index: 0,
            pos: 1,
            failed: false,
        }
    }

    fn fail(&mut self, error: SpirvError) -> Option<Result<DecodedOperand<'a>, SpirvError>> {
        self.failed = true;
        Some(Err(error))
    }

    fn decode(&self, kind: OperandKind) -> Result<(Operand<'a>, usize), SpirvError> {
        let rest = &self.words[self.pos..];
        let need = |n: usize| {
            if rest.len() < n {
                Err(SpirvError::invariant_violation(
                    "operand runs past the instruction end",
                    format!("{kind:?} at word {} needs {n} words", self.pos),
                ))
            } else {
                Ok(())
            }
        };
        Ok(match kind {
            OperandKind::IdResultType
            | OperandKind::IdResult
            | OperandKind::IdRef
            | OperandKind::IdScope
            | OperandKind::IdMemorySemantics => (Operand::Id(Id::new(rest[0])), 1),
            OperandKind::LiteralInteger
            | OperandKind::LiteralExtInstInteger
            | OperandKind::LiteralSpecConstantOpInteger => (Operand::LiteralInteger(rest[0]), 1),
            OperandKind::ValueEnum | OperandKind::BitEnum => (Operand::Enum(rest[0]), 1),
            OperandKind::LiteralContextDependentNumber => {
                (Operand::Words(Cow::Borrowed(rest)), rest.len())
            }
            OperandKind::LiteralString => {
                let (value, used) = unpack_string(rest)?;
                (Operand::LiteralString(Cow::Owned(value)), used)
            }
            OperandKind::PairLiteralIntegerIdRef => {
                need(2)?;
                (Operand::PairLiteralId(rest[0], Id::new(rest[1])), 2)
            }
            OperandKind::PairIdRefIdRef => {
                need(2)?;
                (Operand::PairIdId(Id::new(rest[0]), Id::new(rest[1])), 2)
            }
            OperandKind::PairIdRefLiteralInteger => {
                need(2)?;
                (Operand::PairIdLiteral(Id::new(rest[0]), rest[1]), 2)
            }
        })
    }
}

impl<'a> Iterator for OperandIter<'a> {
    type Item = Result<DecodedOperand<'a>, SpirvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let Some(spec) = self.specs.get(self.spec_index) else {
            if self.pos < self.words.len() {
                let error = SpirvError::invariant_violation(
                    "trailing words after the last operand",
                    format!("{} unread words", self.words.len() - self.pos),
                );
                return self.fail(error);
            }
            return None;
        };

        if self.pos >= self.words.len() {
            if spec.quantifier == Quantifier::One {
                let error = SpirvError::invariant_violation(
                    "required operand lies past the instruction end",
                    format!("`{}` at word {} of {}", spec.name, self.pos, self.words.len()),
                );
                return self.fail(error);
            }
            self.spec_index = self.specs.len();
            return None;
        }

        let (value, word_count) = match self.decode(spec.kind) {
            Ok(decoded) => decoded,
            Err(error) => return self.fail(error),
        };
        let offset = self.pos;
        self.pos += word_count;
        if spec.kind == OperandKind::LiteralSpecConstantOpInteger {
            match embedded_operands(self.words[offset]) {
                Ok(specs) => {
                    self.specs = specs;
                    self.spec_index = 0;
                }
                Err(error) => return self.fail(error),
            }
        } else if spec.quantifier != Quantifier::Variadic {
            self.spec_index += 1;
        }

        Some(Ok(DecodedOperand {
            spec,
            offset,
            word_count,
            value,
        }))
    }
}

/// Word positions holding ids, inside one instruction.
pub type IdPositions = SmallVec<[usize; 8]>;

pub(crate) fn collect_id_positions(operands: OperandIter<'_>) -> Result<IdPositions, SpirvError> {
    let mut positions = IdPositions::new();
    for operand in operands {
        let operand = operand?;
        match operand.spec.kind {
            kind if kind.is_id() => positions.push(operand.offset),
            OperandKind::PairLiteralIntegerIdRef => positions.push(operand.offset + 1),
            OperandKind::PairIdRefIdRef => {
                positions.push(operand.offset);
                positions.push(operand.offset + 1);
            }
            OperandKind::PairIdRefLiteralInteger => positions.push(operand.offset),
            _ => {}
        }
    }
    Ok(positions)
}
