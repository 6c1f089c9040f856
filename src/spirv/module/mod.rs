//! Multi-section module buffer.
//!
//! Declarations and function bodies are emitted in parallel: every
//! instruction is routed by opcode to the declarations buffer or to the
//! function that is currently open. [`assemble`] later sorts and flattens
//! the sections into one module.

pub mod assemble;
pub mod bound;
pub mod sort;

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::spirv::buffer::{InstructionHandle, Iter, WordBuffer};
use crate::spirv::error::{SpirvError, SpirvErrorKind};
use crate::spirv::ids::{Id, IdAllocator};
use crate::spirv::instruction::Instruction;
use crate::spirv::opcode::{Op, STORAGE_CLASS_FUNCTION, STORAGE_CLASS_INPUT, STORAGE_CLASS_OUTPUT};
use crate::spirv::options::{SpirvOptions, UnknownOpcodePolicy};
use crate::spirv::pool::WordPool;

pub use assemble::{
    AssembledModule, HEADER_WORDS, MAGIC, MergedBuffer, ModuleHeader, assemble_buffer, merge,
    merge_checked, merge_offset,
};
pub use bound::{BoundTracker, defined_ids, recompute_bound};
pub use sort::{InstructionGroup, sort_buffer};

/// Section of a [`ModuleBuffer`] an instruction was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Module-scoped declarations.
    Declarations,
    /// Function body, by insertion index.
    Function(usize),
}

/// Handle to an instruction inside one section of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    /// Section holding the instruction.
    pub section: Section,
    /// Handle inside that section's buffer.
    pub handle: InstructionHandle,
}

/// Scope of an `OpVariable`, derived from its storage class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableClass {
    /// Module-scoped resource or private variable.
    Global,
    /// Stage interface variable (`Input` or `Output` storage).
    Io,
    /// Function-local variable (`Function` storage).
    Local,
}

impl VariableClass {
    /// Classifies `instruction`, or returns `None` when it is not a
    /// well-formed `OpVariable`.
    pub fn of(instruction: &Instruction<'_>) -> Option<Self> {
        if instruction.op() != Some(Op::Variable) {
            return None;
        }
        let storage = instruction.operand("StorageClass").ok()?.as_u32()?;
        Some(match storage {
            STORAGE_CLASS_FUNCTION => Self::Local,
            STORAGE_CLASS_INPUT | STORAGE_CLASS_OUTPUT => Self::Io,
            _ => Self::Global,
        })
    }
}

/// One function body, from `OpFunction` to `OpFunctionEnd`.
#[derive(Debug)]
pub struct FunctionBuffer {
    name: String,
    id: Id,
    buffer: WordBuffer,
}

impl FunctionBuffer {
    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the `OpFunction` result id.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the body words.
    pub fn buffer(&self) -> &WordBuffer {
        &self.buffer
    }

    /// Returns `true` once the body holds a basic block.
    pub fn is_definition(&self) -> bool {
        self.buffer
            .iter()
            .any(|instruction| instruction.op() == Some(Op::Label))
    }

    /// Returns `true` once `OpFunctionEnd` was emitted.
    pub fn is_closed(&self) -> bool {
        self.buffer
            .iter()
            .last()
            .is_some_and(|instruction| instruction.op() == Some(Op::FunctionEnd))
    }
}

/// Module under construction.
#[derive(Debug)]
pub struct ModuleBuffer {
    options: SpirvOptions,
    pool: Arc<WordPool>,
    declarations: WordBuffer,
    functions: Vec<FunctionBuffer>,
    by_name: HashMap<String, usize>,
    open: Option<usize>,
    ids: IdAllocator,
    bound: BoundTracker,
}

impl ModuleBuffer {
    /// Creates an empty module on the shared pool.
    pub fn new(options: SpirvOptions) -> Self {
        Self::with_pool(&WordPool::shared(), options)
    }

    /// Creates an empty module on `pool`.
    pub fn with_pool(pool: &Arc<WordPool>, options: SpirvOptions) -> Self {
        Self {
            options,
            pool: Arc::clone(pool),
            declarations: WordBuffer::with_pool(pool, options),
            functions: Vec::new(),
            by_name: HashMap::new(),
            open: None,
            ids: IdAllocator::new(),
            bound: BoundTracker::new(),
        }
    }

    /// Returns the module options.
    pub fn options(&self) -> &SpirvOptions {
        &self.options
    }

    /// Returns the pool every section rents from.
    pub fn pool(&self) -> &Arc<WordPool> {
        &self.pool
    }

    /// Returns the declarations section.
    pub fn declarations(&self) -> &WordBuffer {
        &self.declarations
    }

    /// Returns every function in insertion order.
    pub fn functions(&self) -> &[FunctionBuffer] {
        &self.functions
    }

    /// Looks up a function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionBuffer> {
        self.by_name.get(name).map(|&index| &self.functions[index])
    }

    /// Returns the function currently receiving body instructions.
    pub fn open_function(&self) -> Option<&FunctionBuffer> {
        self.open.map(|index| &self.functions[index])
    }

    /// Takes a fresh id from the module's allocator.
    pub fn alloc_id(&mut self) -> Result<Id, SpirvError> {
        self.ids.alloc()
    }

    /// Returns the incrementally tracked bound (`1 + max result id`).
    pub fn bound(&self) -> u32 {
        self.bound.bound()
    }

    /// Rescans every section and resets the tracked bound.
    pub fn recompute_bound(&mut self) -> u32 {
        let bound = recompute_bound(self.iter());
        self.bound.reset(bound);
        bound
    }

    /// Returns the total number of words across all sections.
    pub fn len_words(&self) -> usize {
        self.declarations.len_words()
            + self
                .functions
                .iter()
                .map(|function| function.buffer.len_words())
                .sum::<usize>()
    }

    // -----------------------------------------------------------------------
    // Emission
    // -----------------------------------------------------------------------

    /// Routes one instruction to its section.
    ///
    /// `OpFunction` opens a function named after the `OpName` that targets
    /// its result id (or `%<id>` when unnamed). `OpFunctionEnd` closes it.
    pub fn add(&mut self, instruction: &Instruction<'_>) -> Result<ModuleHandle, SpirvError> {
        match instruction.op() {
            Some(Op::Function) => {
                let id = function_result(instruction)?;
                let name = self.name_of(id).unwrap_or_else(|| id.to_string());
                self.begin_function(&name, instruction)
            }
            Some(Op::FunctionEnd) => {
                let index = self.open.ok_or_else(|| {
                    SpirvError::sequencing(
                        SpirvErrorKind::UnopenedFunction,
                        "OpFunctionEnd emitted with no open function",
                    )
                })?;
                let handle = self.functions[index].buffer.add(instruction)?;
                self.open = None;
                tracing::trace!(function = %self.functions[index].name, "closed function");
                Ok(ModuleHandle {
                    section: Section::Function(index),
                    handle,
                })
            }
            _ => match self.route(instruction)? {
                Section::Declarations => self.push_declaration(instruction),
                Section::Function(index) => self.push_body(index, instruction),
            },
        }
    }

    /// Opens a function under an explicit name. `instruction` must be the
    /// `OpFunction` that starts it.
    pub fn begin_function(
        &mut self,
        name: &str,
        instruction: &Instruction<'_>,
    ) -> Result<ModuleHandle, SpirvError> {
        let id = function_result(instruction)?;
        if let Some(open) = self.open {
            return Err(SpirvError::sequencing(
                SpirvErrorKind::UnterminatedFunction,
                format!(
                    "function `{name}` opened while `{}` is still open",
                    self.functions[open].name
                ),
            ));
        }
        if self.by_name.contains_key(name) {
            return Err(SpirvError::sequencing(
                SpirvErrorKind::DuplicateFunction,
                format!("function `{name}` is already defined"),
            ));
        }

        let mut buffer = WordBuffer::with_pool(&self.pool, self.options);
        let handle = buffer.add(instruction)?;
        let index = self.functions.len();
        self.functions.push(FunctionBuffer {
            name: name.to_string(),
            id,
            buffer,
        });
        self.by_name.insert(name.to_string(), index);
        self.open = Some(index);
        self.track(id);
        tracing::trace!(function = name, %id, "opened function");

        Ok(ModuleHandle {
            section: Section::Function(index),
            handle,
        })
    }

    /// Inserts a module-scoped instruction before declaration ordinal
    /// `index`, e.g. a capability at index 0.
    pub fn insert_declaration(
        &mut self,
        index: usize,
        instruction: &Instruction<'_>,
    ) -> Result<InstructionHandle, SpirvError> {
        match InstructionGroup::of(instruction.opcode()) {
            Some(group) if group.is_module_scoped() => {}
            _ => {
                return Err(SpirvError::schema(
                    "instruction is not module scoped",
                    format!("{instruction:?} cannot be inserted into declarations"),
                ));
            }
        }
        let handle = self.declarations.insert(index, instruction)?;
        self.track_instruction(instruction);
        Ok(handle)
    }

    /// Removes every declaration for which `keep` returns `false`. Returns
    /// the number removed.
    pub fn retain_declarations(&mut self, keep: impl FnMut(&Instruction<'_>) -> bool) -> usize {
        self.declarations.retain(keep)
    }

    /// Resolves a handle returned by [`ModuleBuffer::add`].
    pub fn view(&self, handle: ModuleHandle) -> Result<Instruction<'_>, SpirvError> {
        match handle.section {
            Section::Declarations => self.declarations.view(handle.handle),
            Section::Function(index) => match self.functions.get(index) {
                Some(function) => function.buffer.view(handle.handle),
                None => Err(SpirvError::invariant_violation(
                    "function section out of range",
                    format!("section {index}, {} functions", self.functions.len()),
                )),
            },
        }
    }

    fn route(&self, instruction: &Instruction<'_>) -> Result<Section, SpirvError> {
        let op = instruction.op();
        let group = match InstructionGroup::of(instruction.opcode()) {
            Some(group) => group,
            None if self.options.unknown_opcodes == UnknownOpcodePolicy::Reject => {
                return Err(SpirvError::unknown_opcode(instruction.opcode()));
            }
            None => InstructionGroup::FunctionDefinition,
        };

        let function_local = match op {
            Some(Op::Variable) => is_function_storage(instruction)?,
            Some(Op::Undef | Op::Line | Op::NoLine) => self.open.is_some(),
            _ => !group.is_module_scoped(),
        };
        if !function_local {
            return Ok(Section::Declarations);
        }
        self.open.map(Section::Function).ok_or_else(|| {
            SpirvError::sequencing(
                SpirvErrorKind::NoOpenFunction,
                format!("{} emitted outside a function", op_label(instruction)),
            )
        })
    }

    fn push_declaration(&mut self, instruction: &Instruction<'_>) -> Result<ModuleHandle, SpirvError> {
        let handle = self.declarations.add(instruction)?;
        self.track_instruction(instruction);
        Ok(ModuleHandle {
            section: Section::Declarations,
            handle,
        })
    }

    fn push_body(
        &mut self,
        index: usize,
        instruction: &Instruction<'_>,
    ) -> Result<ModuleHandle, SpirvError> {
        let handle = self.functions[index].buffer.add(instruction)?;
        self.track_instruction(instruction);
        Ok(ModuleHandle {
            section: Section::Function(index),
            handle,
        })
    }

    fn track(&mut self, id: Id) {
        self.bound.observe_id(id);
        self.ids.observe(id);
    }

    fn track_instruction(&mut self, instruction: &Instruction<'_>) {
        for id in defined_ids(instruction) {
            self.track(id);
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    fn name_of(&self, id: Id) -> Option<String> {
        self.declarations.iter().find_map(|instruction| {
            if instruction.op() != Some(Op::Name) {
                return None;
            }
            let target = instruction.operand("Target").ok()?.as_id()?;
            if target != id {
                return None;
            }
            let name = instruction.operand("Name").ok()?;
            name.as_str().map(str::to_string)
        })
    }

    fn ids_named(&self, name: &str) -> SmallVec<[Id; 4]> {
        self.declarations
            .iter()
            .filter(|instruction| instruction.op() == Some(Op::Name))
            .filter_map(|instruction| {
                let value = instruction.operand("Name").ok()?;
                if value.as_str()? != name {
                    return None;
                }
                instruction.operand("Target").ok()?.as_id()
            })
            .collect()
    }

    fn declared_variable(
        &self,
        name: &str,
        accept: impl Fn(VariableClass) -> bool,
    ) -> Option<Instruction<'_>> {
        let ids = self.ids_named(name);
        if ids.is_empty() {
            return None;
        }
        self.declarations.iter().find(|instruction| {
            VariableClass::of(instruction).is_some_and(&accept)
                && instruction.result_id().is_some_and(|id| ids.contains(&id))
        })
    }

    /// Finds a module-scoped variable, IO variables included, by its debug
    /// name.
    pub fn global_variable(&self, name: &str) -> Option<Instruction<'_>> {
        self.declared_variable(name, |class| class != VariableClass::Local)
    }

    /// Finds a stage input or output variable by its debug name.
    pub fn io_variable(&self, name: &str) -> Option<Instruction<'_>> {
        self.declared_variable(name, |class| class == VariableClass::Io)
    }

    /// Iterates the stage input and output variables in declaration order.
    pub fn io_variables(&self) -> impl Iterator<Item = Instruction<'_>> {
        self.declarations
            .iter()
            .filter(|instruction| VariableClass::of(instruction) == Some(VariableClass::Io))
    }

    /// Finds a parameter or local variable of the open function by its debug
    /// name. Globals are never returned.
    pub fn local_variable(&self, name: &str) -> Option<Instruction<'_>> {
        let function = self.open_function()?;
        let ids = self.ids_named(name);
        if ids.is_empty() {
            return None;
        }
        function.buffer.iter().find(|instruction| {
            matches!(instruction.op(), Some(Op::FunctionParameter | Op::Variable))
                && instruction.result_id().is_some_and(|id| ids.contains(&id))
        })
    }

    // -----------------------------------------------------------------------
    // Duplication
    // -----------------------------------------------------------------------

    /// Returns a detached copy of `instruction` with every non-zero id
    /// shifted by `offset`.
    pub fn duplicate(instruction: &Instruction<'_>, offset: u32) -> Result<Instruction<'static>, SpirvError> {
        instruction.with_ids_offset(offset)
    }

    /// Adds a copy of `instruction` with its ids shifted by `offset`.
    pub fn add_duplicate(
        &mut self,
        instruction: &Instruction<'_>,
        offset: u32,
    ) -> Result<ModuleHandle, SpirvError> {
        let copy = Self::duplicate(instruction, offset)?;
        self.add(&copy)
    }

    /// Replays every instruction of `source` with ids shifted by `offset`.
    /// Returns the number of instructions added.
    pub fn append_duplicated<'a>(
        &mut self,
        source: impl IntoIterator<Item = Instruction<'a>>,
        offset: u32,
    ) -> Result<usize, SpirvError> {
        let mut added = 0;
        for instruction in source {
            self.add_duplicate(&instruction, offset)?;
            added += 1;
        }
        tracing::debug!(added, offset, "appended duplicated instructions");
        Ok(added)
    }

    // -----------------------------------------------------------------------
    // Whole-module passes
    // -----------------------------------------------------------------------

    /// Iterates declarations, then each function in insertion order.
    pub fn iter(&self) -> ModuleIter<'_> {
        ModuleIter {
            current: self.declarations.iter(),
            functions: self.functions.iter(),
        }
    }

    /// Sorts declarations into layout-group order and moves function
    /// declarations ahead of definitions, keeping relative order.
    pub fn sort(&mut self) -> Result<(), SpirvError> {
        if let Some(open) = self.open {
            return Err(SpirvError::sequencing(
                SpirvErrorKind::UnterminatedFunction,
                format!("function `{}` is still open", self.functions[open].name),
            ));
        }
        sort_buffer(&mut self.declarations, self.options.unknown_opcodes)?;

        if !self
            .functions
            .is_sorted_by_key(FunctionBuffer::is_definition)
        {
            self.functions.sort_by_key(FunctionBuffer::is_definition);
            self.by_name = self
                .functions
                .iter()
                .enumerate()
                .map(|(index, function)| (function.name.clone(), index))
                .collect();
        }
        Ok(())
    }

    /// Sorts, flattens and prepends the module header.
    pub fn assemble(&mut self) -> Result<AssembledModule, SpirvError> {
        assemble::assemble(self)
    }
}

impl<'a> IntoIterator for &'a ModuleBuffer {
    type Item = Instruction<'a>;
    type IntoIter = ModuleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over every section of a [`ModuleBuffer`].
#[derive(Debug, Clone)]
pub struct ModuleIter<'a> {
    current: Iter<'a>,
    functions: std::slice::Iter<'a, FunctionBuffer>,
}

impl<'a> Iterator for ModuleIter<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(instruction) = self.current.next() {
                return Some(instruction);
            }
            self.current = self.functions.next()?.buffer.iter();
        }
    }
}

impl std::iter::FusedIterator for ModuleIter<'_> {}

fn function_result(instruction: &Instruction<'_>) -> Result<Id, SpirvError> {
    if instruction.op() != Some(Op::Function) {
        return Err(SpirvError::schema(
            "function must start with OpFunction",
            format!("got {}", op_label(instruction)),
        ));
    }
    instruction.result_id().ok_or_else(|| {
        SpirvError::invariant_violation("OpFunction has no result id", format!("{instruction:?}"))
    })
}

fn is_function_storage(instruction: &Instruction<'_>) -> Result<bool, SpirvError> {
    let storage = instruction.operand("StorageClass")?;
    Ok(storage.as_u32() == Some(STORAGE_CLASS_FUNCTION))
}

fn op_label(instruction: &Instruction<'_>) -> String {
    match instruction.op() {
        Some(op) => op.name().to_string(),
        None => format!("opcode {}", instruction.opcode()),
    }
}
