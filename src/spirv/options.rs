//! Buffer, pool and assembly configuration.

/// How the sorting pass treats opcodes missing from the group table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnknownOpcodePolicy {
    /// Place unknown opcodes in the final (function body) group. Their
    /// first two operand words both count toward the id bound.
    #[default]
    Fallback,
    /// Fail with `UnknownOpcode`.
    Reject,
}

/// Resource guardrails and module-header settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpirvOptions {
    /// Capacity, in words, of a buffer's first backing array.
    pub initial_capacity: usize,
    /// Maximum words one buffer may hold.
    pub max_words: usize,
    /// Header version as `(major, minor)`.
    pub version: (u8, u8),
    /// Header generator id.
    pub generator: u32,
    /// Sorting behavior for opcodes outside the group table.
    pub unknown_opcodes: UnknownOpcodePolicy,
    /// Arrays retained per capacity class by a word pool.
    pub max_retained_per_class: usize,
}

impl Default for SpirvOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            max_words: 1 << 26,
            version: (1, 3),
            generator: 0,
            unknown_opcodes: UnknownOpcodePolicy::Fallback,
            max_retained_per_class: 32,
        }
    }
}

impl SpirvOptions {
    /// Returns the packed header version word.
    pub const fn version_word(&self) -> u32 {
        ((self.version.0 as u32) << 16) | ((self.version.1 as u32) << 8)
    }
}
