//! Expression nodes.
//!
//! Provides nodes for every expression kind:
//! - Literals (int, float, boolean, string, `nil`)
//! - Binary and prefix unary operations
//! - Postfix chains (member access, array access, method call)
//! - Identifiers and `this`
//! - Array literals (`{1, 2, 3}`) and object creation (`new A(...)`)
//! - Parenthesized expressions
//!
//! Every node renders back to source-like text through `Display`; the checker
//! uses that text to name the offending construct in diagnostics.

use std::fmt::{self, Display, Formatter};

use oplang_core::Span;

use crate::ops::{BinaryOp, UnaryOp};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Literal),
    /// Identifier reference
    Ident(Ident),
    /// `this`
    This(Span),
    /// Binary operation
    Binary(Box<BinaryExpr>),
    /// Prefix unary operation
    Unary(Box<UnaryExpr>),
    /// Member/index/call chain
    Postfix(Box<PostfixExpr>),
    /// `{e1, e2, ...}`
    ArrayLiteral(ArrayLiteral),
    /// `new C(args)`
    New(NewExpr),
    /// Parenthesized expression
    Paren(Box<ParenExpr>),
}

impl Expr {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::This(span) => *span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Postfix(e) => e.span,
            Self::ArrayLiteral(e) => e.span,
            Self::New(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        match self {
            Self::Paren(p) => p.expr.unparenthesized(),
            other => other,
        }
    }
}

/// An identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The value of a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Nil,
}

/// A literal expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub span: Span,
}

/// `left op right`
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
    pub span: Span,
}

/// `op operand`
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub span: Span,
}

/// A base expression followed by one or more postfix steps, applied left to
/// right.
#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpr {
    pub base: Expr,
    pub ops: Vec<PostfixOp>,
    pub span: Span,
}

impl PostfixExpr {
    /// Whether any step is a method call.
    pub fn has_call(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, PostfixOp::Call { .. }))
    }

    /// Whether the chain ends in a method call.
    pub fn ends_in_call(&self) -> bool {
        matches!(self.ops.last(), Some(PostfixOp::Call { .. }))
    }
}

/// A single postfix step.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    /// `.name`
    Member { name: String, span: Span },
    /// `[index]`
    Index { index: Expr, span: Span },
    /// `.name(args)`
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
}

impl PostfixOp {
    pub fn span(&self) -> Span {
        match self {
            Self::Member { span, .. } | Self::Index { span, .. } | Self::Call { span, .. } => *span,
        }
    }
}

/// `{e1, e2, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// `new ClassName(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub class_name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `(expr)`
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub expr: Expr,
    pub span: Span,
}

// ============================================================================
// Source rendering
// ============================================================================

pub(crate) fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(e) => e.fmt(f),
            Self::Ident(e) => f.write_str(&e.name),
            Self::This(_) => f.write_str("this"),
            Self::Binary(e) => write!(f, "{} {} {}", e.left, e.op, e.right),
            Self::Unary(e) => write!(f, "{}{}", e.op, e.operand),
            Self::Postfix(e) => e.fmt(f),
            Self::ArrayLiteral(e) => e.fmt(f),
            Self::New(e) => e.fmt(f),
            Self::Paren(e) => write!(f, "({})", e.expr),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LiteralKind::Int(v) => write!(f, "{v}"),
            LiteralKind::Float(v) => write!(f, "{v:?}"),
            LiteralKind::Bool(v) => write!(f, "{v}"),
            LiteralKind::String(s) => write!(f, "{s:?}"),
            LiteralKind::Nil => f.write_str("nil"),
        }
    }
}

impl Display for PostfixExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for op in &self.ops {
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

impl Display for PostfixOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member { name, .. } => write!(f, ".{name}"),
            Self::Index { index, .. } => write!(f, "[{index}]"),
            Self::Call { name, args, .. } => {
                write!(f, ".{name}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
        }
    }
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        write_list(f, &self.elements)?;
        f.write_str("}")
    }
}

impl Display for NewExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "new {}(", self.class_name)?;
        write_list(f, &self.args)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_postfix_chain() {
        let e = Expr::call(
            Expr::index(Expr::member(Expr::this(), "items"), Expr::int(0)),
            "area",
            vec![Expr::float(1.0), Expr::string("cm")],
        );
        assert_eq!(e.to_string(), "this.items[0].area(1.0, \"cm\")");
    }

    #[test]
    fn renders_operators_and_creation() {
        let e = Expr::binary(
            Expr::paren(Expr::binary(Expr::int(5), BinaryOp::IntDiv, Expr::int(2))),
            BinaryOp::Add,
            Expr::unary(UnaryOp::Neg, Expr::ident("x")),
        );
        assert_eq!(e.to_string(), "(5 \\ 2) + -x");
        let n = Expr::new_object("Point", vec![Expr::int(1), Expr::nil()]);
        assert_eq!(n.to_string(), "new Point(1, nil)");
        assert_eq!(
            Expr::array(vec![Expr::boolean(true), Expr::boolean(false)]).to_string(),
            "{true, false}"
        );
    }

    #[test]
    fn unparenthesized_strips_nesting() {
        let e = Expr::paren(Expr::paren(Expr::ident("a")));
        assert!(matches!(e.unparenthesized(), Expr::Ident(id) if id.name == "a"));
    }

    #[test]
    fn call_detection() {
        let Expr::Postfix(p) = Expr::call(Expr::ident("io"), "readInt", vec![]) else {
            panic!("expected postfix");
        };
        assert!(p.has_call());
        assert!(p.ends_in_call());
        let Expr::Postfix(m) = Expr::member(Expr::ident("a"), "b") else {
            panic!("expected postfix");
        };
        assert!(!m.has_call());
    }
}
