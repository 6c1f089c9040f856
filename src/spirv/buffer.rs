//! Growable pooled word buffer holding a stream of whole instructions.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::spirv::error::SpirvError;
use crate::spirv::instruction::{Instruction, check_words, offset_words, split_header};
use crate::spirv::options::SpirvOptions;
use crate::spirv::pool::{PooledWords, WordPool};

/// Detached reference to one instruction: a word offset plus the buffer
/// generation it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionHandle {
    offset: usize,
    generation: u64,
}

impl InstructionHandle {
    /// Returns the word offset of the instruction.
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns the buffer generation the handle belongs to.
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Contiguous stream of instructions backed by a pooled word array.
///
/// Every mutation that can move existing words bumps the buffer
/// generation; [`InstructionHandle`]s and [`Cursor`]s taken before such a
/// mutation fail with `StaleView` instead of decoding shifted memory.
pub struct WordBuffer {
    words: PooledWords,
    generation: u64,
    options: SpirvOptions,
}

impl WordBuffer {
    /// Creates an empty buffer on the shared pool with default options.
    pub fn new() -> Self {
        Self::with_options(SpirvOptions::default())
    }

    /// Creates an empty buffer on the shared pool.
    pub fn with_options(options: SpirvOptions) -> Self {
        Self::with_pool(&WordPool::shared(), options)
    }

    /// Creates an empty buffer on `pool`. No array is rented until the
    /// first instruction arrives.
    pub fn with_pool(pool: &Arc<WordPool>, options: SpirvOptions) -> Self {
        Self {
            words: pool.empty(),
            generation: 0,
            options,
        }
    }

    /// Creates a buffer holding a copy of `words`, which must be a stream of
    /// whole instructions.
    pub fn from_words(words: &[u32], options: SpirvOptions) -> Result<Self, SpirvError> {
        let mut offset = 0;
        while offset < words.len() {
            let count = instruction_len(words, offset)?;
            offset += count;
        }
        let mut buffer = Self::with_options(options);
        buffer.append_raw(words)?;
        Ok(buffer)
    }

    /// Returns the configured options.
    pub fn options(&self) -> &SpirvOptions {
        &self.options
    }

    /// Returns the pool backing this buffer.
    pub fn pool(&self) -> &Arc<WordPool> {
        self.words.pool()
    }

    /// Returns the live words.
    pub fn words(&self) -> &[u32] {
        self.words.as_slice()
    }

    /// Returns the logical length in words.
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    /// Returns the backing capacity in words.
    pub fn capacity_words(&self) -> usize {
        self.words.capacity()
    }

    /// Returns `true` when the buffer holds no instruction.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Counts instructions with a linear scan.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    // -----------------------------------------------------------------------
    // Growth
    // -----------------------------------------------------------------------

    /// Makes room for `additional` more words.
    ///
    /// On failure the buffer is left untouched.
    pub fn reserve(&mut self, additional: usize) -> Result<(), SpirvError> {
        let required = self
            .words
            .len()
            .checked_add(additional)
            .ok_or_else(|| SpirvError::capacity_exhausted(usize::MAX))?;
        if required > self.options.max_words {
            return Err(SpirvError::limit_exceeded(
                "word buffer limit exceeded",
                format!("{required} words requested, limit {}", self.options.max_words),
            ));
        }
        if required <= self.words.capacity() {
            return Ok(());
        }

        let target = required.max(self.options.initial_capacity);
        let mut grown = self.words.pool().rent(target)?;
        grown.vec_mut().extend_from_slice(self.words.as_slice());
        tracing::trace!(
            from = self.words.capacity(),
            to = grown.capacity(),
            "grew word buffer"
        );
        // The old array goes back to the pool only now that the copy exists.
        self.words = grown;
        Ok(())
    }

    fn append_raw(&mut self, words: &[u32]) -> Result<usize, SpirvError> {
        self.reserve(words.len())?;
        let offset = self.words.len();
        self.words.vec_mut().extend_from_slice(words);
        Ok(offset)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Appends one instruction.
    pub fn add(&mut self, instruction: &Instruction<'_>) -> Result<InstructionHandle, SpirvError> {
        self.add_words(instruction.words())
    }

    /// Appends one instruction given as raw words.
    pub fn add_words(&mut self, words: &[u32]) -> Result<InstructionHandle, SpirvError> {
        check_words(words)?;
        let offset = self.append_raw(words)?;
        Ok(InstructionHandle {
            offset,
            generation: self.generation,
        })
    }

    /// Appends every instruction of `other`.
    pub fn extend_from_buffer(&mut self, other: &WordBuffer) -> Result<(), SpirvError> {
        self.append_raw(other.words())?;
        Ok(())
    }

    /// Inserts an instruction before instruction ordinal `index`.
    ///
    /// `index == count()` appends.
    pub fn insert(
        &mut self,
        index: usize,
        instruction: &Instruction<'_>,
    ) -> Result<InstructionHandle, SpirvError> {
        let words = instruction.words();
        check_words(words)?;
        let offset = match self.locate(index) {
            Some((offset, _)) => offset,
            None if index == self.count() => self.words.len(),
            None => return Err(out_of_range(index, self.count())),
        };

        self.reserve(words.len())?;
        let vec = self.words.vec_mut();
        vec.extend_from_slice(words);
        vec[offset..].rotate_right(words.len());
        self.generation += 1;
        Ok(InstructionHandle {
            offset,
            generation: self.generation,
        })
    }

    /// Removes instruction ordinal `index` and returns a detached copy.
    pub fn remove_at(&mut self, index: usize) -> Result<Instruction<'static>, SpirvError> {
        let (offset, len) = self
            .locate(index)
            .ok_or_else(|| out_of_range(index, self.count()))?;
        let removed = Instruction::Borrowed(&self.words()[offset..offset + len]).into_owned();
        self.words.vec_mut().drain(offset..offset + len);
        self.generation += 1;
        Ok(removed)
    }

    /// Replaces instruction ordinal `index`.
    pub fn replace(
        &mut self,
        index: usize,
        instruction: &Instruction<'_>,
    ) -> Result<InstructionHandle, SpirvError> {
        let words = instruction.words();
        check_words(words)?;
        let (offset, len) = self
            .locate(index)
            .ok_or_else(|| out_of_range(index, self.count()))?;

        if words.len() > len {
            self.reserve(words.len() - len)?;
        }
        self.words
            .vec_mut()
            .splice(offset..offset + len, words.iter().copied());
        self.generation += 1;
        Ok(InstructionHandle {
            offset,
            generation: self.generation,
        })
    }

    /// Keeps only the instructions for which `keep` returns `true`, in one
    /// in-place compaction pass. Returns the number removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&Instruction<'_>) -> bool) -> usize {
        let total = self.words.len();
        let mut read = 0;
        let mut write = 0;
        let mut removed = 0;

        while read < total {
            let len = split_header(self.words()[read]).0 as usize;
            let kept = keep(&Instruction::Borrowed(&self.words()[read..read + len]));
            if kept {
                if read != write {
                    self.words.vec_mut().copy_within(read..read + len, write);
                }
                write += len;
            } else {
                removed += 1;
            }
            read += len;
        }

        if removed > 0 {
            self.words.vec_mut().truncate(write);
            self.generation += 1;
        }
        removed
    }

    /// Removes every instruction; the backing array is kept.
    pub fn clear(&mut self) {
        self.words.vec_mut().clear();
        self.generation += 1;
    }

    /// Adds `offset` to every non-zero id operand of every instruction.
    ///
    /// Fails on the first instruction whose opcode has no schema or whose ids
    /// would pass `u32::MAX`; that instruction is left as is and earlier
    /// instructions stay shifted.
    pub fn offset_ids(&mut self, offset: u32) -> Result<(), SpirvError> {
        let mut position = 0;
        while position < self.words.len() {
            let len = split_header(self.words()[position]).0 as usize;
            let range = position..position + len;
            let ids = Instruction::Borrowed(&self.words()[range.clone()]).id_positions()?;
            offset_words(&mut self.words.vec_mut()[range], &ids, offset)?;
            position += len;
        }
        Ok(())
    }

    /// Swaps in a complete new word stream, e.g. after sorting.
    pub(crate) fn replace_contents(&mut self, words: PooledWords) {
        self.words = words;
        self.generation += 1;
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// Returns `(offset, len)` of instruction ordinal `index` by linear scan.
    pub fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut offset = 0;
        let mut ordinal = 0;
        while offset < self.words.len() {
            let len = split_header(self.words()[offset]).0 as usize;
            if ordinal == index {
                return Some((offset, len));
            }
            ordinal += 1;
            offset += len;
        }
        None
    }

    /// Returns instruction ordinal `index`. O(n).
    pub fn get(&self, index: usize) -> Option<Instruction<'_>> {
        let (offset, len) = self.locate(index)?;
        Some(Instruction::Borrowed(&self.words()[offset..offset + len]))
    }

    /// Returns a handle to instruction ordinal `index`.
    pub fn handle(&self, index: usize) -> Option<InstructionHandle> {
        let (offset, _) = self.locate(index)?;
        Some(InstructionHandle {
            offset,
            generation: self.generation,
        })
    }

    /// Resolves a handle taken earlier from this buffer.
    pub fn view(&self, handle: InstructionHandle) -> Result<Instruction<'_>, SpirvError> {
        if handle.generation != self.generation {
            return Err(SpirvError::stale_view(handle.generation, self.generation));
        }
        let len = instruction_len(self.words(), handle.offset)?;
        Ok(Instruction::Borrowed(
            &self.words()[handle.offset..handle.offset + len],
        ))
    }

    /// Iterates instructions in emission order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.words())
    }

    /// Returns a detached cursor at the first instruction.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            offset: 0,
            generation: self.generation,
        }
    }

    /// Copies the buffer into a new array from the same pool.
    pub fn try_clone(&self) -> Result<Self, SpirvError> {
        let mut copy = Self::with_pool(self.pool(), self.options);
        copy.append_raw(self.words())?;
        Ok(copy)
    }
}

impl Default for WordBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WordBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordBuffer")
            .field("len_words", &self.len_words())
            .field("capacity_words", &self.capacity_words())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<'a> IntoIterator for &'a WordBuffer {
    type Item = Instruction<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads the word count of the instruction at `offset`, validating that it
/// is non-zero and ends inside `words`.
pub(crate) fn instruction_len(words: &[u32], offset: usize) -> Result<usize, SpirvError> {
    let Some(&first) = words.get(offset) else {
        return Err(SpirvError::invariant_violation(
            "instruction offset past the end of the stream",
            format!("offset {offset}, {} words", words.len()),
        ));
    };
    let (count, opcode) = split_header(first);
    let count = count as usize;
    if count == 0 || offset + count > words.len() {
        return Err(SpirvError::invariant_violation(
            "corrupt instruction word count",
            format!(
                "opcode {opcode} at offset {offset} declares {count} words, {} available",
                words.len() - offset
            ),
        ));
    }
    Ok(count)
}

fn out_of_range(index: usize, count: usize) -> SpirvError {
    SpirvError::invariant_violation(
        "instruction index out of range",
        format!("index {index}, {count} instructions"),
    )
}

/// Lazy forward iterator over a validated word stream.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    words: &'a [u32],
}

impl<'a> Iter<'a> {
    /// Wraps a stream already checked with [`instruction_len`].
    pub(crate) fn new(words: &'a [u32]) -> Self {
        Self { words }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = *self.words.first()?;
        let len = split_header(first).0 as usize;
        let (head, rest) = self.words.split_at(len);
        self.words = rest;
        Some(Instruction::Borrowed(head))
    }
}

impl FusedIterator for Iter<'_> {}

/// Position in a buffer that does not borrow it.
///
/// Each advance re-checks the buffer generation, so a cursor can be held
/// across code that may mutate the buffer and fails fast afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
    generation: u64,
}

impl Cursor {
    /// Returns the next instruction, or `None` at the end.
    pub fn advance<'b>(
        &mut self,
        buffer: &'b WordBuffer,
    ) -> Option<Result<(InstructionHandle, Instruction<'b>), SpirvError>> {
        if self.generation != buffer.generation {
            return Some(Err(SpirvError::stale_view(
                self.generation,
                buffer.generation,
            )));
        }
        if self.offset >= buffer.len_words() {
            return None;
        }
        let handle = InstructionHandle {
            offset: self.offset,
            generation: self.generation,
        };
        match buffer.view(handle) {
            Ok(instruction) => {
                self.offset += instruction.word_count();
                Some(Ok((handle, instruction)))
            }
            Err(error) => Some(Err(error)),
        }
    }

    /// Re-anchors the cursor after a mutation the caller made on purpose,
    /// keeping its word offset.
    pub fn resync(&mut self, buffer: &WordBuffer) {
        self.generation = buffer.generation;
        self.offset = self.offset.min(buffer.len_words());
    }
}
