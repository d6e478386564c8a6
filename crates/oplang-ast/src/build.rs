//! Convenience constructors.
//!
//! The parser lives outside this workspace; these helpers let tests,
//! benchmarks and embedders assemble trees directly. Every node built here
//! carries [`Span::default()`] unless a `*_at` variant is used.

use oplang_core::{Modifiers, Span, Type};

use crate::decl::*;
use crate::expr::*;
use crate::ops::{BinaryOp, ForDirection, UnaryOp};
use crate::stmt::*;

impl Expr {
    fn literal(kind: LiteralKind) -> Self {
        Expr::Literal(Literal {
            kind,
            span: Span::default(),
        })
    }

    pub fn int(value: i64) -> Self {
        Self::literal(LiteralKind::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::literal(LiteralKind::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(LiteralKind::Bool(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(LiteralKind::String(value.into()))
    }

    pub fn nil() -> Self {
        Self::literal(LiteralKind::Nil)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name, Span::default()))
    }

    pub fn ident_at(name: impl Into<String>, span: Span) -> Self {
        Expr::Ident(Ident::new(name, span))
    }

    pub fn this() -> Self {
        Expr::This(Span::default())
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        let span = left.span().to(right.span());
        Expr::Binary(Box::new(BinaryExpr {
            left,
            op,
            right,
            span,
        }))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let span = operand.span();
        Expr::Unary(Box::new(UnaryExpr { op, operand, span }))
    }

    pub fn paren(expr: Expr) -> Self {
        let span = expr.span();
        Expr::Paren(Box::new(ParenExpr { expr, span }))
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        Expr::ArrayLiteral(ArrayLiteral {
            elements,
            span: Span::default(),
        })
    }

    pub fn new_object(class_name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::New(NewExpr {
            class_name: class_name.into(),
            args,
            span: Span::default(),
        })
    }

    /// Append a postfix step, extending an existing chain rather than
    /// nesting one chain inside another.
    fn with_postfix(self, op: PostfixOp) -> Self {
        match self {
            Expr::Postfix(mut chain) => {
                chain.span = chain.span.to(op.span());
                chain.ops.push(op);
                Expr::Postfix(chain)
            }
            base => {
                let span = base.span().to(op.span());
                Expr::Postfix(Box::new(PostfixExpr {
                    base,
                    ops: vec![op],
                    span,
                }))
            }
        }
    }

    /// `base.name`
    pub fn member(base: Expr, name: impl Into<String>) -> Self {
        base.with_postfix(PostfixOp::Member {
            name: name.into(),
            span: Span::default(),
        })
    }

    /// `base[index]`
    pub fn index(base: Expr, index: Expr) -> Self {
        base.with_postfix(PostfixOp::Index {
            index,
            span: Span::default(),
        })
    }

    /// `base.name(args)`
    pub fn call(base: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        base.with_postfix(PostfixOp::Call {
            name: name.into(),
            args,
            span: Span::default(),
        })
    }

    fn into_chain(self) -> PostfixExpr {
        match self {
            Expr::Postfix(chain) => *chain,
            base => {
                let span = base.span();
                PostfixExpr {
                    base,
                    ops: Vec::new(),
                    span,
                }
            }
        }
    }
}

impl Stmt {
    /// `name := rhs`
    pub fn assign(name: impl Into<String>, rhs: Expr) -> Self {
        Stmt::Assign(AssignStmt {
            lhs: Lhs::Ident(Ident::new(name, Span::default())),
            rhs,
            span: Span::default(),
        })
    }

    /// `target := rhs` where `target` is an identifier or a postfix chain.
    pub fn assign_to(target: Expr, rhs: Expr) -> Self {
        let lhs = match target {
            Expr::Ident(id) => Lhs::Ident(id),
            other => Lhs::Postfix(other.into_chain()),
        };
        let span = lhs.span();
        Stmt::Assign(AssignStmt { lhs, rhs, span })
    }

    pub fn if_then(condition: Expr, then_branch: Stmt) -> Self {
        Self::if_else(condition, then_branch, None)
    }

    pub fn if_else(condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Stmt::If(Box::new(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: Span::default(),
        }))
    }

    pub fn for_loop(
        var: impl Into<String>,
        start: Expr,
        direction: ForDirection,
        end: Expr,
        body: Stmt,
    ) -> Self {
        Stmt::For(Box::new(ForStmt {
            var: Ident::new(var, Span::default()),
            start,
            direction,
            end,
            body,
            span: Span::default(),
        }))
    }

    pub fn break_stmt() -> Self {
        Stmt::Break(Span::default())
    }

    pub fn continue_stmt() -> Self {
        Stmt::Continue(Span::default())
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::Return(ReturnStmt {
            value,
            span: Span::default(),
        })
    }

    pub fn block(block: Block) -> Self {
        Stmt::Block(block)
    }

    /// `call;` where `call` is a postfix chain (normally ending in a call).
    pub fn invoke(call: Expr) -> Self {
        let call = call.into_chain();
        let span = call.span;
        Stmt::Invoke(InvokeStmt { call, span })
    }
}

impl Block {
    pub fn new(var_decls: Vec<VariableDecl>, stmts: Vec<Stmt>) -> Self {
        Self {
            var_decls,
            stmts,
            span: Span::default(),
        }
    }

    /// A block without declarations.
    pub fn of(stmts: Vec<Stmt>) -> Self {
        Self::new(Vec::new(), stmts)
    }
}

impl Variable {
    pub fn new(name: impl Into<String>, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            init,
            span: Span::default(),
        }
    }
}

impl VariableDecl {
    pub fn new(ty: Type, variables: Vec<Variable>) -> Self {
        Self {
            is_final: false,
            ty,
            variables,
            span: Span::default(),
        }
    }

    /// `T name [:= init]`
    pub fn single(ty: Type, name: impl Into<String>, init: Option<Expr>) -> Self {
        Self::new(ty, vec![Variable::new(name, init)])
    }

    /// `final T name := init`
    pub fn constant(ty: Type, name: impl Into<String>, init: Expr) -> Self {
        Self {
            is_final: true,
            ..Self::single(ty, name, Some(init))
        }
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            init,
            span: Span::default(),
        }
    }
}

impl AttributeDecl {
    pub fn new(modifiers: Modifiers, ty: Type, attributes: Vec<Attribute>) -> Self {
        Self {
            modifiers,
            ty,
            attributes,
            span: Span::default(),
        }
    }
}

impl MethodDecl {
    pub fn new(
        is_static: bool,
        return_type: Type,
        name: impl Into<String>,
        params: Vec<Param>,
        body: Block,
    ) -> Self {
        Self {
            is_static,
            return_type,
            name: name.into(),
            params,
            body,
            span: Span::default(),
        }
    }

    /// `static void main() { body }`
    pub fn main(body: Block) -> Self {
        Self::new(true, Type::VOID, "main", Vec::new(), body)
    }
}

impl ConstructorDecl {
    pub fn new(name: impl Into<String>, params: Vec<Param>, body: Block) -> Self {
        Self {
            name: name.into(),
            params,
            body,
            span: Span::default(),
        }
    }
}

impl DestructorDecl {
    pub fn new(name: impl Into<String>, body: Block) -> Self {
        Self {
            name: name.into(),
            body,
            span: Span::default(),
        }
    }
}

impl ClassDecl {
    pub fn new(name: impl Into<String>, superclass: Option<&str>) -> Self {
        Self {
            name: name.into(),
            superclass: superclass.map(str::to_string),
            members: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_member(mut self, member: ClassMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_method(self, method: MethodDecl) -> Self {
        self.with_member(ClassMember::Method(method))
    }

    pub fn with_attribute(self, decl: AttributeDecl) -> Self {
        self.with_member(ClassMember::Attribute(decl))
    }

    pub fn with_constructor(self, ctor: ConstructorDecl) -> Self {
        self.with_member(ClassMember::Constructor(ctor))
    }

    pub fn with_destructor(self, dtor: DestructorDecl) -> Self {
        self.with_member(ClassMember::Destructor(dtor))
    }
}

impl Program {
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        Self {
            classes,
            span: Span::default(),
        }
    }
}
