//! Constant-expression classification.
//!
//! `final` initializers must be built from literals, other `final` names and
//! operators over them. `nil` is never constant. Attribute initializers also
//! accept object creation and indexing into a `final` attribute of `this`.

use oplang_ast::{Expr, LiteralKind, PostfixExpr, PostfixOp};

use super::StaticChecker;

impl StaticChecker<'_> {
    /// Whether a local constant may be initialized with `expr`.
    pub(super) fn is_constant(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Literal(lit) => lit.kind != LiteralKind::Nil,
            Expr::ArrayLiteral(lit) => lit.elements.iter().all(|e| self.is_constant(e)),
            Expr::Binary(b) => self.is_constant(&b.left) && self.is_constant(&b.right),
            Expr::Unary(u) => self.is_constant(&u.operand),
            Expr::Paren(p) => self.is_constant(&p.expr),
            Expr::Ident(id) => self.ctx.is_final_name(&id.name),
            Expr::Postfix(chain) => self.is_constant_chain(chain),
            Expr::This(_) | Expr::New(_) => false,
        }
    }

    /// `K[i]...` over a final local, or `this.K` for a final attribute.
    fn is_constant_chain(&self, chain: &PostfixExpr) -> bool {
        match &chain.base {
            Expr::Ident(id) => {
                self.ctx.scopes.lookup(&id.name).is_some_and(|e| e.is_final)
                    && chain.ops.iter().all(|op| match op {
                        PostfixOp::Index { index, .. } => self.is_constant(index),
                        _ => false,
                    })
            }
            Expr::This(_) => match chain.ops.as_slice() {
                [PostfixOp::Member { name, .. }] => self.ctx.is_final_attribute(name),
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether an attribute may be initialized with `expr` when declared
    /// `final`.
    pub(super) fn is_attr_constant(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Literal(lit) => lit.kind != LiteralKind::Nil,
            Expr::New(_) => true,
            Expr::ArrayLiteral(lit) => lit.elements.iter().all(|e| self.is_attr_constant(e)),
            Expr::Binary(b) => self.is_attr_constant(&b.left) && self.is_attr_constant(&b.right),
            Expr::Unary(u) => self.is_attr_constant(&u.operand),
            Expr::Paren(p) => self.is_attr_constant(&p.expr),
            Expr::Ident(id) => self.ctx.is_final_name(&id.name),
            Expr::Postfix(chain) => self.is_attr_constant_chain(chain),
            Expr::This(_) => false,
        }
    }

    /// `this.K` or `this.K[i]...` where `K` is a final attribute.
    fn is_attr_constant_chain(&self, chain: &PostfixExpr) -> bool {
        let base_is_this = matches!(chain.base.unparenthesized(), Expr::This(_));
        let Some((PostfixOp::Member { name, .. }, rest)) = chain.ops.split_first() else {
            return false;
        };
        base_is_this
            && self.ctx.is_final_attribute(name)
            && rest.iter().all(|op| match op {
                PostfixOp::Index { index, .. } => self.is_attr_constant(index),
                _ => false,
            })
    }
}
