//! Instruction handles over borrowed or owned words.
//!
//! Word 0 of every instruction packs `(word_count << 16) | opcode`. The
//! operands that follow are interpreted through the opcode schema in
//! [`crate::spirv::opcode`].

use std::fmt;

use smallvec::SmallVec;

use crate::spirv::error::SpirvError;
use crate::spirv::ids::Id;
use crate::spirv::opcode::Op;
use crate::spirv::operand::{
    DecodedOperand, IdPositions, LiteralWidth, Operand, OperandIter, OperandKind, Quantifier,
    collect_id_positions, encoded_word_count,
};

/// Inline capacity of a detached instruction.
pub const INLINE_WORDS: usize = 8;

/// Words of a detached instruction.
pub type InstructionWords = SmallVec<[u32; INLINE_WORDS]>;

/// Largest word count the 16-bit length field can express.
pub const MAX_INSTRUCTION_WORDS: usize = u16::MAX as usize;

/// Packs the leading instruction word.
pub const fn pack_header(word_count: u16, opcode: u16) -> u32 {
    ((word_count as u32) << 16) | opcode as u32
}

/// Splits the leading instruction word into `(word_count, opcode)`.
pub const fn split_header(word: u32) -> (u16, u16) {
    ((word >> 16) as u16, word as u16)
}

/// Checks that `words` holds exactly one well-formed instruction.
pub(crate) fn check_words(words: &[u32]) -> Result<(), SpirvError> {
    let Some(&first) = words.first() else {
        return Err(SpirvError::invariant_violation(
            "empty instruction",
            "an instruction needs at least its opcode word",
        ));
    };
    let (word_count, opcode) = split_header(first);
    if word_count == 0 || word_count as usize != words.len() {
        return Err(SpirvError::invariant_violation(
            "word count does not match instruction length",
            format!(
                "opcode {opcode} declares {word_count} words but occupies {}",
                words.len()
            ),
        ));
    }
    Ok(())
}

/// One instruction, either borrowed from a buffer or detached.
///
/// A borrowed instruction is valid until its buffer is next mutated; the
/// lifetime ties it to the buffer borrow. Use [`Instruction::into_owned`] to
/// keep it past that point.
#[derive(Clone)]
pub enum Instruction<'a> {
    /// Read-only view into another buffer's words.
    Borrowed(&'a [u32]),
    /// Detached copy owning a small inline array.
    Owned(InstructionWords),
}

impl<'a> Instruction<'a> {
    /// Wraps borrowed words after structural validation.
    pub fn from_words(words: &'a [u32]) -> Result<Self, SpirvError> {
        check_words(words)?;
        Ok(Self::Borrowed(words))
    }

    /// Encodes a fully specified instruction.
    pub fn encode(op: Op, operands: &[Operand<'_>]) -> Result<Instruction<'static>, SpirvError> {
        let word_count = encoded_word_count(op, operands)?;
        if word_count > MAX_INSTRUCTION_WORDS {
            return Err(SpirvError::encoding_overflow(
                format!("{} does not fit the word-count field", op.name()),
                format!("{word_count} words"),
            ));
        }

        let mut words = InstructionWords::with_capacity(word_count);
        words.push(pack_header(word_count as u16, op.code()));
        for operand in operands {
            operand.encode_into(&mut words);
        }
        debug_assert_eq!(words.len(), word_count);
        Ok(Instruction::Owned(words))
    }

    /// Returns the instruction words, opcode word included.
    pub fn words(&self) -> &[u32] {
        match self {
            Self::Borrowed(words) => *words,
            Self::Owned(words) => words.as_slice(),
        }
    }

    /// Returns `true` for a view into another buffer.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Borrowed(_))
    }

    /// Returns the raw opcode.
    pub fn opcode(&self) -> u16 {
        split_header(self.words()[0]).1
    }

    /// Returns the known opcode, if any.
    pub fn op(&self) -> Option<Op> {
        Op::from_u16(self.opcode())
    }

    /// Returns the number of words occupied.
    pub fn word_count(&self) -> usize {
        self.words().len()
    }

    fn known_op(&self) -> Result<Op, SpirvError> {
        self.op().ok_or_else(|| SpirvError::unknown_opcode(self.opcode()))
    }

    /// Returns the result-type id, if the opcode has one.
    pub fn result_type(&self) -> Option<Id> {
        let (has_type, _) = self.op()?.result_layout();
        if has_type {
            self.words().get(1).map(|word| Id::new(*word))
        } else {
            None
        }
    }

    /// Returns the result id, if the opcode has one.
    pub fn result_id(&self) -> Option<Id> {
        let position = match self.op()?.result_layout() {
            (true, true) => 2,
            (false, true) => 1,
            _ => return None,
        };
        self.words().get(position).map(|word| Id::new(*word))
    }

    /// Decodes operands in schema order.
    pub fn operands(&self) -> Result<OperandIter<'_>, SpirvError> {
        let op = self.known_op()?;
        Ok(OperandIter::new(self.words(), op.operands()))
    }

    fn find_operand(&self, name: &str) -> Result<Option<DecodedOperand<'_>>, SpirvError> {
        let op = self.known_op()?;
        if op.operand_spec(name).is_none() {
            return Err(SpirvError::schema(
                format!("{} has no operand `{name}`", op.name()),
                format!("schema operands: {:?}", op.operands().iter().map(|s| s.name).collect::<Vec<_>>()),
            ));
        }
        for operand in self.operands()? {
            let operand = operand?;
            if operand.spec.name == name {
                return Ok(Some(operand));
            }
        }
        Ok(None)
    }

    /// Returns a required operand by schema name.
    ///
    /// An unknown name is a schema error; a required operand past the end of
    /// the instruction is an invariant violation.
    pub fn operand(&self, name: &str) -> Result<Operand<'_>, SpirvError> {
        match self.find_operand(name)? {
            Some(operand) => Ok(operand.value),
            None => Err(SpirvError::invariant_violation(
                format!("operand `{name}` lies past the instruction end"),
                format!("{} words in {}", self.word_count(), self.display_name()),
            )),
        }
    }

    /// Returns an optional or variadic operand's first value by schema name.
    pub fn optional_operand(&self, name: &str) -> Result<Option<Operand<'_>>, SpirvError> {
        Ok(self.find_operand(name)?.map(|operand| operand.value))
    }

    /// Returns a context-dependent literal decoded at `width`.
    ///
    /// A literal that occupies a different number of words than `width`
    /// needs is a schema error.
    pub fn operand_as(&self, name: &str, width: LiteralWidth) -> Result<Operand<'static>, SpirvError> {
        let operand = self.operand(name)?;
        operand.with_width(width).ok_or_else(|| {
            SpirvError::schema(
                format!("operand `{name}` is not a {width:?} literal"),
                format!("{} holds {operand:?}", self.display_name()),
            )
        })
    }

    /// Returns every value of a variadic operand.
    pub fn variadic_operand(&self, name: &str) -> Result<Vec<Operand<'_>>, SpirvError> {
        let op = self.known_op()?;
        match op.operand_spec(name) {
            Some(spec) if spec.quantifier == Quantifier::Variadic => {}
            _ => {
                return Err(SpirvError::schema(
                    format!("{} has no variadic operand `{name}`", op.name()),
                    "use `operand` for single operands",
                ));
            }
        }
        let mut values = Vec::new();
        for operand in self.operands()? {
            let operand = operand?;
            if operand.spec.name == name {
                values.push(operand.value);
            }
        }
        Ok(values)
    }

    /// Returns word positions holding ids (zero placeholders included).
    pub fn id_positions(&self) -> Result<IdPositions, SpirvError> {
        collect_id_positions(self.operands()?)
    }

    /// Returns a detached copy.
    pub fn to_owned_instruction(&self) -> Instruction<'static> {
        Instruction::Owned(InstructionWords::from_slice(self.words()))
    }

    /// Detaches the instruction from any buffer.
    pub fn into_owned(self) -> Instruction<'static> {
        match self {
            Self::Borrowed(words) => Instruction::Owned(InstructionWords::from_slice(words)),
            Self::Owned(words) => Instruction::Owned(words),
        }
    }

    /// Adds `offset` to every non-zero id operand, detaching first if borrowed.
    ///
    /// An id that would pass `u32::MAX` is an `EncodingOverflow` and leaves
    /// the instruction unchanged.
    pub fn offset_ids(&mut self, offset: u32) -> Result<(), SpirvError> {
        let positions = self.id_positions()?;
        if let Self::Borrowed(words) = *self {
            *self = Self::Owned(InstructionWords::from_slice(words));
        }
        if let Self::Owned(words) = self {
            offset_words(words, &positions, offset)?;
        }
        Ok(())
    }

    /// Returns a detached copy with every id shifted by `offset`.
    pub fn with_ids_offset(&self, offset: u32) -> Result<Instruction<'static>, SpirvError> {
        let mut copy = self.to_owned_instruction();
        copy.offset_ids(offset)?;
        Ok(copy)
    }

    fn display_name(&self) -> String {
        match self.op() {
            Some(op) => op.name().to_string(),
            None => format!("Op<{}>", self.opcode()),
        }
    }
}

/// Shifts the ids at `positions`. Checks every id first so a failure leaves
/// `words` untouched.
pub(crate) fn offset_words(words: &mut [u32], positions: &[usize], offset: u32) -> Result<(), SpirvError> {
    let mut shifted: SmallVec<[u32; 8]> = SmallVec::new();
    for &position in positions {
        let id = Id::new(words[position]);
        let moved = id.offset(offset).ok_or_else(|| {
            SpirvError::encoding_overflow(
                "id offset overflows 32 bits",
                format!("{id} + {offset} at word {position}"),
            )
        })?;
        shifted.push(moved.value());
    }
    for (&position, &value) in positions.iter().zip(&shifted) {
        words[position] = value;
    }
    Ok(())
}

impl PartialEq for Instruction<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.words() == other.words()
    }
}

impl Eq for Instruction<'_> {}

impl fmt::Debug for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("op", &self.display_name())
            .field("borrowed", &self.is_borrowed())
            .field("words", &self.words())
            .finish()
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(operands) = self.operands() else {
            write!(f, "{}", self.display_name())?;
            for word in &self.words()[1..] {
                write!(f, " {word:#x}")?;
            }
            return Ok(());
        };

        if let Some(result) = self.result_id() {
            write!(f, "{result} = ")?;
        }
        write!(f, "{}", self.display_name())?;
        for operand in operands {
            match operand {
                Ok(operand) if operand.spec.kind == OperandKind::IdResult => {}
                Ok(operand) => write!(f, " {}", operand.value)?,
                Err(_) => return f.write_str(" <malformed>"),
            }
        }
        Ok(())
    }
}
