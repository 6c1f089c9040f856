//! Id bound tracking.

use smallvec::SmallVec;

use crate::spirv::ids::Id;
use crate::spirv::instruction::Instruction;

/// Incrementally tracked exclusive upper bound of result ids.
///
/// The bound only grows while instructions are added; use
/// [`BoundTracker::reset`] after a full recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundTracker {
    bound: u32,
}

impl BoundTracker {
    /// Creates a tracker for an empty module (bound `1`).
    pub const fn new() -> Self {
        Self { bound: 1 }
    }

    /// Returns the current bound.
    pub const fn bound(&self) -> u32 {
        self.bound
    }

    /// Raises the bound past `id`.
    pub fn observe_id(&mut self, id: Id) {
        self.bound = self.bound.max(id.value().saturating_add(1));
    }

    /// Raises the bound past every id the instruction may define.
    pub fn observe(&mut self, instruction: &Instruction<'_>) {
        for id in defined_ids(instruction) {
            self.observe_id(id);
        }
    }

    /// Replaces the bound with a freshly computed value.
    pub fn reset(&mut self, bound: u32) {
        self.bound = bound.max(1);
    }
}

impl Default for BoundTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the ids `instruction` may define.
///
/// For a known opcode that is its result id, if any. An unknown opcode has
/// no schema, so words 1 and 2 are both reported: every opcode with a result
/// carries it in one of them. The bound may overshoot but never falls short.
pub fn defined_ids(instruction: &Instruction<'_>) -> SmallVec<[Id; 2]> {
    if instruction.op().is_some() {
        return instruction.result_id().into_iter().collect();
    }
    instruction
        .words()
        .iter()
        .skip(1)
        .take(2)
        .map(|word| Id::new(*word))
        .collect()
}

/// Computes `1 + max result id` over `instructions`, or `1` when none has a
/// result.
pub fn recompute_bound<'a>(instructions: impl IntoIterator<Item = Instruction<'a>>) -> u32 {
    let mut tracker = BoundTracker::new();
    for instruction in instructions {
        tracker.observe(&instruction);
    }
    tracker.bound()
}
