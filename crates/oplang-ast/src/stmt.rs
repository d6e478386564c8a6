//! Statement nodes.
//!
//! OPLang statements are assignments, `if`, counted `for` loops, `break`,
//! `continue`, `return`, blocks, and method-invocation statements. Variable
//! declarations only appear at the head of a [`Block`].

use std::fmt::{self, Display, Formatter};

use oplang_core::{Span, Type};

use crate::expr::{Expr, Ident, PostfixExpr};
use crate::ops::ForDirection;

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `lhs := rhs;`
    Assign(AssignStmt),
    /// `if cond then s [else s]`
    If(Box<IfStmt>),
    /// `for var := start to|downto end do s`
    For(Box<ForStmt>),
    /// `break;`
    Break(Span),
    /// `continue;`
    Continue(Span),
    /// `return [expr];`
    Return(ReturnStmt),
    /// `{ decls stmts }`
    Block(Block),
    /// `receiver.method(args);`
    Invoke(InvokeStmt),
}

impl Stmt {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Assign(s) => s.span,
            Self::If(s) => s.span,
            Self::For(s) => s.span,
            Self::Break(span) | Self::Continue(span) => *span,
            Self::Return(s) => s.span,
            Self::Block(s) => s.span,
            Self::Invoke(s) => s.span,
        }
    }
}

/// Target of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Lhs {
    Ident(Ident),
    Postfix(PostfixExpr),
}

impl Lhs {
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(id) => id.span,
            Self::Postfix(p) => p.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Lhs,
    pub rhs: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
    pub span: Span,
}

/// Counted loop over an existing `int` variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub var: Ident,
    pub start: Expr,
    pub direction: ForDirection,
    pub end: Expr,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// A method call used as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeStmt {
    pub call: PostfixExpr,
    pub span: Span,
}

/// A block: local declarations followed by statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub var_decls: Vec<VariableDecl>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `[final] T a := e, b;`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub is_final: bool,
    pub ty: Type,
    pub variables: Vec<Variable>,
    pub span: Span,
}

/// One declarator of a [`VariableDecl`].
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

// ============================================================================
// Source rendering
// ============================================================================

impl Display for Lhs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(id) => f.write_str(&id.name),
            Self::Postfix(p) => p.fmt(f),
        }
    }
}

impl Display for AssignStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.lhs, self.rhs)
    }
}

impl Display for ForStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "for {} := {} {} {} do",
            self.var.name, self.start, self.direction, self.end
        )
    }
}

impl Display for ReturnStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "return {value}"),
            None => f.write_str("return"),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.init {
            Some(init) => write!(f, "{} := {}", self.name, init),
            None => f.write_str(&self.name),
        }
    }
}

impl Display for VariableDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_final {
            f.write_str("final ")?;
        }
        write!(f, "{} ", self.ty)?;
        crate::expr::write_list(f, &self.variables)
    }
}

/// Statements render as their heading only; nested bodies are elided.
impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign(s) => s.fmt(f),
            Self::If(s) => write!(f, "if {} then", s.condition),
            Self::For(s) => s.fmt(f),
            Self::Break(_) => f.write_str("break"),
            Self::Continue(_) => f.write_str("continue"),
            Self::Return(s) => s.fmt(f),
            Self::Block(_) => f.write_str("{...}"),
            Self::Invoke(s) => s.call.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_statement_headings() {
        let s = Stmt::for_loop(
            "i",
            Expr::int(1),
            ForDirection::Up,
            Expr::int(5),
            Stmt::break_stmt(),
        );
        assert_eq!(s.to_string(), "for i := 1 to 5 do");
        assert_eq!(Stmt::assign("x", Expr::int(6)).to_string(), "x := 6");
        assert_eq!(Stmt::ret(None).to_string(), "return");
    }

    #[test]
    fn renders_declarations() {
        let d = VariableDecl::constant(Type::INT, "X", Expr::int(5));
        assert_eq!(d.to_string(), "final int X := 5");
        let d = VariableDecl::new(Type::array(Type::FLOAT, 2), vec![Variable::new("a", None)]);
        assert_eq!(d.to_string(), "float[2] a");
    }
}
