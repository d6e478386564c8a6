//! Loop targets for `break` and `continue`.
//!
//! Tracks a stack of loop contexts so nested loops bind `break`/`continue`
//! to the innermost one.

use oplang_core::CompilationError;

use super::frame::Label;

/// Manages the labels of enclosing loops.
#[derive(Debug, Default)]
pub struct LoopManager {
    /// Innermost last.
    loops: Vec<LoopLabels>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoopLabels {
    /// Placed before the loop variable update.
    continue_label: Label,
    /// Placed after the loop.
    break_label: Label,
}

impl LoopManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, continue_label: Label, break_label: Label) {
        self.loops.push(LoopLabels {
            continue_label,
            break_label,
        });
    }

    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }

    /// Target of `continue` in the innermost loop.
    pub fn continue_label(&self) -> Result<Label, CompilationError> {
        self.loops
            .last()
            .map(|l| l.continue_label)
            .ok_or_else(|| CompilationError::internal("continue outside of a loop"))
    }

    /// Target of `break` in the innermost loop.
    pub fn break_label(&self) -> Result<Label, CompilationError> {
        self.loops
            .last()
            .map(|l| l.break_label)
            .ok_or_else(|| CompilationError::internal("break outside of a loop"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_not_in_loop() {
        let manager = LoopManager::new();
        assert!(!manager.in_loop());
        assert_eq!(manager.loop_depth(), 0);
        assert!(manager.break_label().is_err());
        assert!(manager.continue_label().is_err());
    }

    #[test]
    fn nested_loops() {
        let mut manager = LoopManager::new();
        manager.enter_loop(Label(1), Label(2));
        manager.enter_loop(Label(3), Label(4));

        assert_eq!(manager.loop_depth(), 2);
        assert_eq!(manager.break_label(), Ok(Label(4)));
        assert_eq!(manager.continue_label(), Ok(Label(3)));

        manager.exit_loop();
        assert_eq!(manager.break_label(), Ok(Label(2)));
        assert_eq!(manager.continue_label(), Ok(Label(1)));
    }

    #[test]
    fn exit_empty_is_harmless() {
        let mut manager = LoopManager::new();
        manager.exit_loop();
        assert!(!manager.in_loop());
    }
}
