//! Lexical scopes for the static checker.
//!
//! This module provides [`ScopeStack`] for tracking names visible while a
//! class is checked. It handles:
//! - Pre-seeded bindings (`io` at program level, `this` at class level)
//! - Parameters and locals, each frame rejecting a repeated name
//! - Shadowing of outer names by inner frames
//!
//! Attribute fallback is not handled here; see
//! [`CheckContext::resolve_name`](crate::context::CheckContext::resolve_name).

use oplang_core::{CompilationError, DeclKind, Span, Type};
use rustc_hash::FxHashMap;

/// A name bound in some frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    pub ty: Type,
    pub is_final: bool,
    pub span: Span,
}

/// Nested frames, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<FxHashMap<String, ScopeEntry>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    fn innermost(&mut self) -> &mut FxHashMap<String, ScopeEntry> {
        if self.frames.is_empty() {
            self.frames.push(FxHashMap::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Bind a name in the innermost frame without a redeclaration check.
    pub fn bind(&mut self, name: impl Into<String>, entry: ScopeEntry) {
        self.innermost().insert(name.into(), entry);
    }

    /// Declare a local variable or constant.
    ///
    /// A name already bound in the innermost frame is `Redeclared Constant`
    /// for `final` declarations and `Redeclared Variable` otherwise.
    pub fn declare_local(
        &mut self,
        name: &str,
        ty: Type,
        is_final: bool,
        span: Span,
    ) -> Result<(), CompilationError> {
        let frame = self.innermost();
        if frame.contains_key(name) {
            let kind = if is_final {
                DeclKind::Constant
            } else {
                DeclKind::Variable
            };
            return Err(CompilationError::redeclared(kind, name, span));
        }
        frame.insert(
            name.to_string(),
            ScopeEntry {
                ty,
                is_final,
                span,
            },
        );
        Ok(())
    }

    /// Declare a routine parameter.
    pub fn declare_param(
        &mut self,
        name: &str,
        ty: Type,
        span: Span,
    ) -> Result<(), CompilationError> {
        let frame = self.innermost();
        if frame.contains_key(name) {
            return Err(CompilationError::redeclared(DeclKind::Parameter, name, span));
        }
        frame.insert(
            name.to_string(),
            ScopeEntry {
                ty,
                is_final: false,
                span,
            },
        );
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&ScopeEntry> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Binding of `name` in the innermost frame only.
    pub fn lookup_current(&self, name: &str) -> Option<&ScopeEntry> {
        self.frames.last().and_then(|frame| frame.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_same_frame() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes
            .declare_local("x", Type::INT, false, Span::default())
            .unwrap();
        let err = scopes
            .declare_local("x", Type::INT, false, Span::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CompilationError::Redeclared { kind: DeclKind::Variable, .. }
        ));
        let err = scopes
            .declare_local("x", Type::INT, true, Span::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CompilationError::Redeclared { kind: DeclKind::Constant, .. }
        ));
    }

    #[test]
    fn parameter_redeclaration() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.declare_param("a", Type::INT, Span::default()).unwrap();
        let err = scopes.declare_param("a", Type::FLOAT, Span::default()).unwrap_err();
        assert_eq!(err.to_string(), "at 0:0: Redeclared Parameter: a");
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes
            .declare_local("x", Type::INT, false, Span::default())
            .unwrap();
        scopes.push();
        scopes
            .declare_local("x", Type::STRING, true, Span::default())
            .unwrap();
        assert_eq!(scopes.lookup("x").map(|e| &e.ty), Some(&Type::STRING));
        scopes.pop();
        assert_eq!(scopes.lookup("x").map(|e| &e.ty), Some(&Type::INT));
        assert!(scopes.lookup_current("x").is_some());
    }

    #[test]
    fn lookup_walks_outward() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.bind(
            "io",
            ScopeEntry {
                ty: Type::class("IO"),
                is_final: true,
                span: Span::default(),
            },
        );
        scopes.push();
        scopes.push();
        assert!(scopes.lookup("io").is_some());
        assert!(scopes.lookup_current("io").is_none());
    }
}
