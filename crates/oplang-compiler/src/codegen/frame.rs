//! Per-routine code generation state.
//!
//! A [`Frame`] is created when a routine starts and dropped when it ends. It
//! handles:
//! - Local slot allocation: slot 0 is `this` (or `args` for the entry point),
//!   then parameters and locals in declaration order. Slots are never reused.
//! - Label numbering
//! - Block scopes: symbols declared in a block are dropped on exit, exposing
//!   any shadowed outer symbol again
//! - Operand stack depth, with the maximum feeding `.limit stack`
//! - Loop targets (see [`LoopManager`])

use std::fmt::{self, Display, Formatter};

use oplang_core::{CompilationError, Type};

use super::jumps::LoopManager;

type Result<T> = std::result::Result<T, CompilationError>;

/// A jump target, printed as `Label<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Label{}", self.0)
    }
}

/// A local variable or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSymbol {
    pub name: String,
    pub ty: Type,
    pub slot: u16,
}

/// Labels delimiting a block, used as `.var` validity ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLabels {
    pub start: Label,
    pub end: Label,
}

#[derive(Debug)]
struct BlockScope {
    labels: BlockLabels,
    /// Symbol count on entry.
    visible: usize,
}

#[derive(Debug)]
pub struct Frame {
    pub name: String,
    pub return_type: Type,
    pub is_static: bool,
    next_slot: u16,
    next_label: u32,
    depth: i32,
    max_depth: i32,
    symbols: Vec<LocalSymbol>,
    blocks: Vec<BlockScope>,
    loops: LoopManager,
}

impl Frame {
    pub fn new(name: impl Into<String>, return_type: Type, is_static: bool) -> Self {
        Self {
            name: name.into(),
            return_type,
            is_static,
            next_slot: 0,
            next_label: 0,
            depth: 0,
            max_depth: 0,
            symbols: Vec::new(),
            blocks: Vec::new(),
            loops: LoopManager::new(),
        }
    }

    // ==========================================================================
    // Slots and labels
    // ==========================================================================

    pub fn new_slot(&mut self) -> u16 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Value of `.limit locals`.
    pub fn max_locals(&self) -> u16 {
        self.next_slot
    }

    // ==========================================================================
    // Operand stack
    // ==========================================================================

    /// Apply an instruction's net effect on the operand stack.
    ///
    /// Returns `Internal` if the depth would drop below zero.
    pub fn adjust(&mut self, delta: i32) -> Result<()> {
        let depth = self.depth + delta;
        if depth < 0 {
            return Err(CompilationError::internal(format!(
                "operand stack underflow in {} (depth {}, delta {delta})",
                self.name, self.depth
            )));
        }
        self.depth = depth;
        self.max_depth = self.max_depth.max(depth);
        Ok(())
    }

    pub fn stack_depth(&self) -> i32 {
        self.depth
    }

    /// Value of `.limit stack`.
    pub fn max_stack(&self) -> i32 {
        self.max_depth
    }

    // ==========================================================================
    // Scopes and symbols
    // ==========================================================================

    /// Open a block scope with fresh start/end labels.
    pub fn enter_block(&mut self) -> BlockLabels {
        let labels = BlockLabels {
            start: self.new_label(),
            end: self.new_label(),
        };
        self.blocks.push(BlockScope {
            labels,
            visible: self.symbols.len(),
        });
        labels
    }

    /// Close the innermost block, dropping its symbols.
    pub fn exit_block(&mut self) -> Result<BlockLabels> {
        let block = self
            .blocks
            .pop()
            .ok_or_else(|| CompilationError::internal("block scope underflow"))?;
        self.symbols.truncate(block.visible);
        Ok(block.labels)
    }

    /// Make a local visible under `name`.
    pub fn bind(&mut self, name: impl Into<String>, ty: Type, slot: u16) {
        self.symbols.push(LocalSymbol {
            name: name.into(),
            ty,
            slot,
        });
    }

    /// Innermost visible local named `name`.
    pub fn lookup(&self, name: &str) -> Option<&LocalSymbol> {
        self.symbols.iter().rev().find(|s| s.name == name)
    }

    // ==========================================================================
    // Loops
    // ==========================================================================

    pub fn enter_loop(&mut self, continue_label: Label, break_label: Label) {
        self.loops.enter_loop(continue_label, break_label);
    }

    pub fn exit_loop(&mut self) {
        self.loops.exit_loop();
    }

    pub fn continue_label(&self) -> Result<Label> {
        self.loops.continue_label()
    }

    pub fn break_label(&self) -> Result<Label> {
        self.loops.break_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_never_reused() {
        let mut frame = Frame::new("f", Type::VOID, false);
        assert_eq!(frame.new_slot(), 0);
        frame.enter_block();
        assert_eq!(frame.new_slot(), 1);
        frame.exit_block().unwrap();
        assert_eq!(frame.new_slot(), 2);
        assert_eq!(frame.max_locals(), 3);
    }

    #[test]
    fn labels_print_sequentially() {
        let mut frame = Frame::new("f", Type::VOID, true);
        assert_eq!(frame.new_label().to_string(), "Label0");
        assert_eq!(frame.new_label().to_string(), "Label1");
    }

    #[test]
    fn stack_tracking() {
        let mut frame = Frame::new("f", Type::VOID, true);
        frame.adjust(2).unwrap();
        frame.adjust(-1).unwrap();
        frame.adjust(1).unwrap();
        assert_eq!(frame.stack_depth(), 2);
        assert_eq!(frame.max_stack(), 2);

        let err = frame.adjust(-3).unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
        assert_eq!(frame.stack_depth(), 2);
    }

    #[test]
    fn block_exit_restores_shadowed_symbol() {
        let mut frame = Frame::new("f", Type::VOID, true);
        frame.bind("x", Type::INT, 0);
        frame.enter_block();
        frame.bind("x", Type::STRING, 1);
        assert_eq!(frame.lookup("x").map(|s| s.slot), Some(1));

        let labels = frame.exit_block().unwrap();
        assert_eq!(labels.start, Label(0));
        assert_eq!(labels.end, Label(1));
        assert_eq!(frame.lookup("x").map(|s| &s.ty), Some(&Type::INT));
        assert!(frame.exit_block().is_err());
    }

    #[test]
    fn loop_targets() {
        let mut frame = Frame::new("f", Type::VOID, true);
        assert!(frame.break_label().is_err());
        let (c, b) = (frame.new_label(), frame.new_label());
        frame.enter_loop(c, b);
        assert_eq!(frame.continue_label(), Ok(c));
        assert_eq!(frame.break_label(), Ok(b));
        frame.exit_loop();
        assert!(frame.continue_label().is_err());
    }
}
