//! Expression typing.

use oplang_ast::{ArrayLiteral, Expr, LiteralKind, NewExpr};
use oplang_core::{CompilationError, Type, UndeclaredKind};

use super::{Result, StaticChecker};
use crate::context::NameRef;
use crate::conversion::resolve_constructor;
use crate::operators::{binary_result, unary_result};

impl StaticChecker<'_> {
    /// Type of an expression.
    pub(crate) fn check_expr(&mut self, expr: &Expr) -> Result<Type> {
        match expr {
            Expr::Literal(lit) => Ok(match lit.kind {
                LiteralKind::Int(_) => Type::INT,
                LiteralKind::Float(_) => Type::FLOAT,
                LiteralKind::Bool(_) => Type::BOOL,
                LiteralKind::String(_) => Type::STRING,
                LiteralKind::Nil => Type::Nil,
            }),
            Expr::Ident(id) => match self.ctx.resolve_name(&id.name) {
                Some(NameRef::Class(_)) => Err(mismatch_in_expression(expr)),
                Some(NameRef::Scoped(entry)) => Ok(entry.ty.dereferenced().clone()),
                Some(NameRef::Attribute(found)) => Ok(found.info.ty.dereferenced().clone()),
                None => Err(CompilationError::undeclared(
                    UndeclaredKind::Identifier,
                    id.name.clone(),
                    id.span,
                )),
            },
            Expr::This(span) => {
                if self.ctx.in_static_context() {
                    return Err(CompilationError::IllegalMemberAccess {
                        construct: expr.to_string(),
                        span: *span,
                    });
                }
                Ok(self.current_class_type())
            }
            Expr::Binary(b) => {
                let left = self.check_expr(&b.left)?;
                let right = self.check_expr(&b.right)?;
                binary_result(b.op, &left, &right).ok_or_else(|| mismatch_in_expression(expr))
            }
            Expr::Unary(u) => {
                let operand = self.check_expr(&u.operand)?;
                unary_result(u.op, &operand).ok_or_else(|| mismatch_in_expression(expr))
            }
            Expr::Postfix(chain) => self.check_postfix(chain),
            Expr::ArrayLiteral(lit) => self.check_array_literal(lit),
            Expr::New(new) => self.check_new(new),
            Expr::Paren(p) => self.check_expr(&p.expr),
        }
    }

    /// Every element must have the first element's type.
    fn check_array_literal(&mut self, lit: &ArrayLiteral) -> Result<Type> {
        let Some((first, rest)) = lit.elements.split_first() else {
            return Ok(Type::array(Type::VOID, 0));
        };
        let first_ty = self.check_expr(first)?;
        if first_ty.is_error() {
            return Ok(Type::Error);
        }
        for elem in rest {
            let ty = self.check_expr(elem)?;
            if ty.is_error() {
                continue;
            }
            if !first_ty.same_as(&ty) {
                return Err(CompilationError::IllegalArrayLiteral {
                    construct: lit.to_string(),
                    span: lit.span,
                });
            }
        }
        Ok(Type::array(first_ty, lit.elements.len() as u32))
    }

    /// `new C(args)`: an exact constructor signature match wins, otherwise
    /// any constructor whose parameters accept the arguments.
    fn check_new(&mut self, new: &NewExpr) -> Result<Type> {
        let table = self.table();
        let Some(record) = table.get(&new.class_name) else {
            return Err(CompilationError::undeclared(
                UndeclaredKind::Class,
                new.class_name.clone(),
                new.span,
            ));
        };

        let args = new
            .args
            .iter()
            .map(|arg| self.check_expr(arg))
            .collect::<Result<Vec<_>>>()?;

        let accepted = if args.is_empty() {
            record.has_default_constructor()
        } else {
            resolve_constructor(table, &new.class_name, &args).is_some()
        };
        if !accepted {
            return Err(CompilationError::TypeMismatchInExpression {
                construct: new.to_string(),
                span: new.span,
            });
        }
        Ok(Type::class(new.class_name.clone()))
    }
}

pub(super) fn mismatch_in_expression(expr: &Expr) -> CompilationError {
    CompilationError::TypeMismatchInExpression {
        construct: expr.to_string(),
        span: expr.span(),
    }
}
