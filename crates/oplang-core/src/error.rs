//! Error types for the compiler.
//!
//! Every failure is a compile-time [`CompilationError`]. Checking is
//! fail-fast: the first error aborts the compilation unit, so there is no
//! accumulation type.
//!
//! ```text
//! CompilationError
//! ├── Redeclared / Undeclared        - name resolution
//! ├── TypeMismatchIn{Statement,Expression,Constant}
//! ├── CannotAssignToConstant, MustInLoop, Illegal*
//! ├── NoEntryPoint, CircularInheritance
//! └── Internal                      - code generator defects
//! ```

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::Span;

/// The kind of declaration named by a [`CompilationError::Redeclared`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Attribute,
    Constant,
    Method,
    Constructor,
    Destructor,
    Variable,
    Parameter,
}

impl Display for DeclKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclKind::Class => "Class",
            DeclKind::Attribute => "Attribute",
            DeclKind::Constant => "Constant",
            DeclKind::Method => "Method",
            DeclKind::Constructor => "Constructor",
            DeclKind::Destructor => "Destructor",
            DeclKind::Variable => "Variable",
            DeclKind::Parameter => "Parameter",
        })
    }
}

/// The kind of name that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndeclaredKind {
    Identifier,
    Class,
    Attribute,
    Method,
}

impl Display for UndeclaredKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UndeclaredKind::Identifier => "Identifier",
            UndeclaredKind::Class => "Class",
            UndeclaredKind::Attribute => "Attribute",
            UndeclaredKind::Method => "Method",
        })
    }
}

/// Errors raised while building the class table, checking, or generating code.
///
/// `construct` fields hold the source-like rendering of the offending node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    #[error("at {span}: Redeclared {kind}: {name}")]
    Redeclared {
        kind: DeclKind,
        name: String,
        span: Span,
    },

    #[error("at {span}: Undeclared {kind}: {name}")]
    Undeclared {
        kind: UndeclaredKind,
        name: String,
        span: Span,
    },

    #[error("at {span}: Cannot Assign To Constant: {construct}")]
    CannotAssignToConstant { construct: String, span: Span },

    #[error("at {span}: Type Mismatch In Statement: {construct}")]
    TypeMismatchInStatement { construct: String, span: Span },

    #[error("at {span}: Type Mismatch In Expression: {construct}")]
    TypeMismatchInExpression { construct: String, span: Span },

    #[error("at {span}: Type Mismatch In Constant: {construct}")]
    TypeMismatchInConstant { construct: String, span: Span },

    /// `break`/`continue` outside any loop.
    #[error("at {span}: {construct} Must In Loop")]
    MustInLoop { construct: String, span: Span },

    #[error("at {span}: Illegal Constant Expression: {construct}")]
    IllegalConstantExpression { construct: String, span: Span },

    #[error("at {span}: Illegal Array Literal: {construct}")]
    IllegalArrayLiteral { construct: String, span: Span },

    #[error("at {span}: Illegal Member Access: {construct}")]
    IllegalMemberAccess { construct: String, span: Span },

    /// No `static void main()` in any class.
    #[error("No Entry Point")]
    NoEntryPoint,

    /// A class is (transitively) its own ancestor.
    ///
    /// Raised once while the class table is built, so later ancestor walks
    /// never meet a cycle. Recorded as an open-question decision in
    /// DESIGN.md.
    #[error("at {span}: circular inheritance for '{name}'")]
    CircularInheritance { name: String, span: Span },

    /// The code generator found an inconsistency the checker should have
    /// ruled out.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Redeclared { span, .. }
            | CompilationError::Undeclared { span, .. }
            | CompilationError::CannotAssignToConstant { span, .. }
            | CompilationError::TypeMismatchInStatement { span, .. }
            | CompilationError::TypeMismatchInExpression { span, .. }
            | CompilationError::TypeMismatchInConstant { span, .. }
            | CompilationError::MustInLoop { span, .. }
            | CompilationError::IllegalConstantExpression { span, .. }
            | CompilationError::IllegalArrayLiteral { span, .. }
            | CompilationError::IllegalMemberAccess { span, .. }
            | CompilationError::CircularInheritance { span, .. } => *span,
            CompilationError::NoEntryPoint | CompilationError::Internal { .. } => Span::default(),
        }
    }

    /// Name-resolution and access errors that tolerant call sites must never
    /// swallow.
    pub fn is_priority(&self) -> bool {
        matches!(
            self,
            CompilationError::Undeclared { .. }
                | CompilationError::Redeclared { .. }
                | CompilationError::IllegalMemberAccess { .. }
        )
    }

    pub fn redeclared(kind: DeclKind, name: impl Into<String>, span: Span) -> Self {
        CompilationError::Redeclared {
            kind,
            name: name.into(),
            span,
        }
    }

    pub fn undeclared(kind: UndeclaredKind, name: impl Into<String>, span: Span) -> Self {
        CompilationError::Undeclared {
            kind,
            name: name.into(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclared_display() {
        let err = CompilationError::redeclared(DeclKind::Method, "area", Span::new(4, 3, 4));
        assert_eq!(err.to_string(), "at 4:3: Redeclared Method: area");
    }

    #[test]
    fn undeclared_display() {
        let err = CompilationError::undeclared(UndeclaredKind::Class, "Shape", Span::default());
        assert_eq!(err.to_string(), "at 0:0: Undeclared Class: Shape");
    }

    #[test]
    fn span_accessor() {
        let span = Span::new(7, 2, 5);
        let err = CompilationError::MustInLoop {
            construct: "break".into(),
            span,
        };
        assert_eq!(err.span(), span);
        assert_eq!(CompilationError::NoEntryPoint.span(), Span::default());
    }

    #[test]
    fn priority_categories() {
        assert!(
            CompilationError::undeclared(UndeclaredKind::Identifier, "x", Span::default())
                .is_priority()
        );
        assert!(
            !CompilationError::TypeMismatchInExpression {
                construct: "1 + true".into(),
                span: Span::default(),
            }
            .is_priority()
        );
    }
}
