//! Result-id wrappers and the per-module id allocator.

use std::fmt;

use crate::spirv::error::SpirvError;

/// Result id naming one instruction's value. `0` means "no id".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id(u32);

impl Id {
    /// Creates an identifier from a raw value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns `true` for the `0` placeholder.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns this id shifted into another id space, or `None` when the
    /// shifted value does not fit in 32 bits.
    ///
    /// The `0` placeholder is never shifted.
    pub const fn offset(self, offset: u32) -> Option<Self> {
        if self.is_none() {
            return Some(self);
        }
        match self.0.checked_add(offset) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl From<Id> for u32 {
    fn from(id: Id) -> Self {
        id.0
    }
}

/// Monotonic id source owned by one module under construction.
///
/// Ids are never reused; independent modules never share an allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first id is `1`.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns a fresh id, or `LimitExceeded` once every 32-bit id is taken.
    pub fn alloc(&mut self) -> Result<Id, SpirvError> {
        let value = u32::try_from(self.next).map_err(|_| {
            SpirvError::limit_exceeded("id space exhausted", format!("next id would be {}", self.next))
        })?;
        self.next += 1;
        Ok(Id::new(value))
    }

    /// Returns the exclusive upper bound of all ids handed out so far,
    /// saturated to `u32::MAX`.
    pub fn bound(&self) -> u32 {
        u32::try_from(self.next).unwrap_or(u32::MAX)
    }

    /// Moves the allocator past an externally introduced id.
    pub fn observe(&mut self, id: Id) {
        self.next = self.next.max(u64::from(id.value()) + 1);
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
