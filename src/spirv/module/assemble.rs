//! Buffer merging, header construction and final module assembly.

use std::collections::HashSet;
use std::sync::Arc;

use crate::spirv::buffer::{Iter, WordBuffer, instruction_len};
use crate::spirv::error::SpirvError;
use crate::spirv::module::ModuleBuffer;
use crate::spirv::module::bound::recompute_bound;
use crate::spirv::module::sort::sort_buffer;
use crate::spirv::options::SpirvOptions;
use crate::spirv::pool::{PooledWords, WordPool};

/// Module magic number.
pub const MAGIC: u32 = 0x0723_0203;

/// Words in the module header.
pub const HEADER_WORDS: usize = 5;

/// The five-word module header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHeader {
    /// Always [`MAGIC`] once validated.
    pub magic: u32,
    /// `major << 16 | minor << 8`.
    pub version: u32,
    /// Id of the tool that produced the module.
    pub generator: u32,
    /// Exclusive upper bound of every id in the module.
    pub bound: u32,
    /// Reserved for instruction schemas; must be zero.
    pub reserved: u32,
}

impl ModuleHeader {
    /// Builds the header for a module with the given bound.
    pub fn new(options: &SpirvOptions, bound: u32) -> Self {
        Self {
            magic: MAGIC,
            version: options.version_word(),
            generator: options.generator,
            bound,
            reserved: 0,
        }
    }

    /// Returns `(major, minor)`.
    pub fn version(&self) -> (u8, u8) {
        ((self.version >> 16) as u8, (self.version >> 8) as u8)
    }

    /// Returns the header words in stream order.
    pub fn to_words(&self) -> [u32; HEADER_WORDS] {
        [
            self.magic,
            self.version,
            self.generator,
            self.bound,
            self.reserved,
        ]
    }

    /// Parses and validates the header at the start of `words`.
    pub fn read(words: &[u32]) -> Result<Self, SpirvError> {
        let [magic, version, generator, bound, reserved] = match words.get(..HEADER_WORDS) {
            Some(&[a, b, c, d, e]) => [a, b, c, d, e],
            _ => {
                return Err(SpirvError::invalid_header(
                    "module is shorter than its header",
                    format!("{} words, header needs {HEADER_WORDS}", words.len()),
                ));
            }
        };
        if magic != MAGIC {
            return Err(SpirvError::invalid_header(
                "bad magic number",
                format!("expected {MAGIC:#010x}, got {magic:#010x}"),
            ));
        }
        if reserved != 0 {
            return Err(SpirvError::invalid_header(
                "reserved header word is not zero",
                format!("got {reserved:#x}"),
            ));
        }
        if bound == 0 {
            return Err(SpirvError::invalid_header("id bound is zero", "bound must be at least 1"));
        }
        Ok(Self {
            magic,
            version,
            generator,
            bound,
            reserved,
        })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Concatenation of two buffers plus the recomputed bound.
#[derive(Debug)]
pub struct MergedBuffer {
    buffer: WordBuffer,
    bound: u32,
}

impl MergedBuffer {
    /// Returns the merged instructions.
    pub fn buffer(&self) -> &WordBuffer {
        &self.buffer
    }

    /// Returns `1 + max result id` over both inputs.
    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Releases the merged buffer.
    pub fn into_buffer(self) -> WordBuffer {
        self.buffer
    }

    /// Sorts and assembles the merged instructions.
    pub fn assemble(mut self) -> Result<AssembledModule, SpirvError> {
        assemble_buffer(&mut self.buffer)
    }
}

fn merged_target(a: &WordBuffer, b: &WordBuffer) -> Result<WordBuffer, SpirvError> {
    let mut buffer = WordBuffer::with_pool(a.pool(), *a.options());
    buffer.reserve(a.len_words() + b.len_words())?;
    buffer.extend_from_buffer(a)?;
    Ok(buffer)
}

/// Concatenates `a` then `b` and recomputes one bound.
///
/// The id spaces are trusted to be disjoint; see [`merge_checked`] and
/// [`merge_offset`].
pub fn merge(a: &WordBuffer, b: &WordBuffer) -> Result<MergedBuffer, SpirvError> {
    let mut buffer = merged_target(a, b)?;
    buffer.extend_from_buffer(b)?;
    let bound = recompute_bound(buffer.iter());
    tracing::debug!(words = buffer.len_words(), bound, "merged buffers");
    Ok(MergedBuffer { buffer, bound })
}

/// Like [`merge`], but fails with `IdCollision` when both buffers define the
/// same result id.
pub fn merge_checked(a: &WordBuffer, b: &WordBuffer) -> Result<MergedBuffer, SpirvError> {
    let defined: HashSet<u32> = a
        .iter()
        .filter_map(|instruction| instruction.result_id())
        .map(u32::from)
        .collect();
    if let Some(id) = b
        .iter()
        .filter_map(|instruction| instruction.result_id())
        .find(|id| defined.contains(&id.value()))
    {
        return Err(SpirvError::id_collision(id.value()));
    }
    merge(a, b)
}

/// Shifts every id of `b` by the bound of `a`, then merges.
pub fn merge_offset(a: &WordBuffer, b: &WordBuffer) -> Result<MergedBuffer, SpirvError> {
    let offset = recompute_bound(a.iter());
    let mut buffer = merged_target(a, b)?;
    for instruction in b {
        buffer.add(&instruction.with_ids_offset(offset)?)?;
    }
    let bound = recompute_bound(buffer.iter());
    tracing::debug!(words = buffer.len_words(), offset, bound, "merged buffers with id offset");
    Ok(MergedBuffer { buffer, bound })
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn check_limit(total: usize, options: &SpirvOptions) -> Result<(), SpirvError> {
    if total > options.max_words {
        return Err(SpirvError::limit_exceeded(
            "assembled module exceeds the word limit",
            format!("{total} words, limit {}", options.max_words),
        ));
    }
    Ok(())
}

/// Sorts every section of `module`, flattens it behind a fresh header and
/// returns the independent result.
pub fn assemble(module: &mut ModuleBuffer) -> Result<AssembledModule, SpirvError> {
    module.sort()?;
    let bound = module.recompute_bound();
    let options = *module.options();
    let total = HEADER_WORDS + module.len_words();
    check_limit(total, &options)?;

    let header = ModuleHeader::new(&options, bound);
    let mut words = module.pool().rent(total)?;
    let target = words.vec_mut();
    target.extend_from_slice(&header.to_words());
    target.extend_from_slice(module.declarations().words());
    for function in module.functions() {
        target.extend_from_slice(function.buffer().words());
    }

    tracing::debug!(
        bound,
        words = total,
        functions = module.functions().len(),
        "assembled module"
    );
    Ok(AssembledModule { header, words })
}

/// Sorts a flat instruction stream in place and assembles it.
pub fn assemble_buffer(buffer: &mut WordBuffer) -> Result<AssembledModule, SpirvError> {
    let options = *buffer.options();
    sort_buffer(buffer, options.unknown_opcodes)?;
    let bound = recompute_bound(buffer.iter());
    let total = HEADER_WORDS + buffer.len_words();
    check_limit(total, &options)?;

    let header = ModuleHeader::new(&options, bound);
    let mut words = buffer.pool().rent(total)?;
    words.vec_mut().extend_from_slice(&header.to_words());
    words.vec_mut().extend_from_slice(buffer.words());
    tracing::debug!(bound, words = total, "assembled flat buffer");
    Ok(AssembledModule { header, words })
}

/// Finished module: header followed by every instruction. Immutable.
#[derive(Debug)]
pub struct AssembledModule {
    header: ModuleHeader,
    words: PooledWords,
}

impl AssembledModule {
    /// Returns the parsed header.
    pub fn header(&self) -> &ModuleHeader {
        &self.header
    }

    /// Returns every word, header included.
    pub fn words(&self) -> &[u32] {
        self.words.as_slice()
    }

    /// Returns the instruction words after the header.
    pub fn body(&self) -> &[u32] {
        &self.words()[HEADER_WORDS..]
    }

    /// Iterates the instructions after the header.
    pub fn instructions(&self) -> Iter<'_> {
        Iter::new(self.body())
    }

    /// Serializes the words little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words()
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }

    /// Validates and copies an assembled word stream.
    pub fn from_words(words: &[u32]) -> Result<Self, SpirvError> {
        Self::from_words_in(&WordPool::shared(), words)
    }

    /// Like [`AssembledModule::from_words`], renting from `pool`.
    pub fn from_words_in(pool: &Arc<WordPool>, words: &[u32]) -> Result<Self, SpirvError> {
        let header = ModuleHeader::read(words)?;
        let mut offset = HEADER_WORDS;
        while offset < words.len() {
            offset += instruction_len(words, offset)?;
        }

        // Only schema-known result ids are binding here; unknown opcodes may
        // carry literals where the conservative bound would look for ids.
        let body_bound = Iter::new(&words[HEADER_WORDS..])
            .filter_map(|instruction| instruction.result_id())
            .map(|id| id.value().saturating_add(1))
            .max()
            .unwrap_or(1);
        if body_bound > header.bound {
            return Err(SpirvError::invalid_header(
                "header bound is below the largest result id",
                format!("header bound {}, ids need {body_bound}", header.bound),
            ));
        }

        let mut copy = pool.rent(words.len())?;
        copy.vec_mut().extend_from_slice(words);
        Ok(Self {
            header,
            words: copy,
        })
    }

    /// Parses a byte stream in either endianness.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SpirvError> {
        if bytes.len() % 4 != 0 {
            return Err(SpirvError::invalid_header(
                "byte length is not a multiple of the word size",
                format!("{} bytes", bytes.len()),
            ));
        }
        let chunks = bytes.chunks_exact(4);
        let big_endian = bytes.get(..4) == Some(MAGIC.to_be_bytes().as_slice());
        let words: Vec<u32> = chunks
            .map(|chunk| {
                let word = [chunk[0], chunk[1], chunk[2], chunk[3]];
                if big_endian {
                    u32::from_be_bytes(word)
                } else {
                    u32::from_le_bytes(word)
                }
            })
            .collect();
        Self::from_words(&words)
    }
}

impl PartialEq for AssembledModule {
    fn eq(&self, other: &Self) -> bool {
        self.words() == other.words()
    }
}

impl Eq for AssembledModule {}
