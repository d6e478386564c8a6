//! Member access, indexing and calls.
//!
//! A postfix chain is walked left to right. The base decides how the first
//! member is reached:
//!
//! ```text
//! Shape.count       static access, member must be static
//! io.writeInt(1)    through the `io` handle, member must be static
//! this.count        own members, static ones included
//! s.area()          instance access, member must not be static
//! ```
//!
//! After the first member every later step is an instance access.

use oplang_ast::{AssignStmt, Expr, PostfixExpr, PostfixOp};
use oplang_core::{CompilationError, Type, UndeclaredKind};
use oplang_registry::{IO_BINDING, IO_CLASS};

use super::{Result, StaticChecker};
use crate::context::NameRef;

/// How the current step of a chain was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Through a class name.
    Static,
    /// Through the `io` binding.
    Io,
    /// Through `this`.
    This,
    /// Through any other value.
    Value,
}

impl StaticChecker<'_> {
    /// Type of a postfix chain read as a value.
    pub(crate) fn check_postfix(&mut self, chain: &PostfixExpr) -> Result<Type> {
        self.walk_chain(chain, None)
    }

    /// Type of a postfix chain used as an assignment target.
    ///
    /// Calls are not assignable, and the last member must not be `final`.
    pub(super) fn check_postfix_target(
        &mut self,
        chain: &PostfixExpr,
        assign: &AssignStmt,
    ) -> Result<Type> {
        if chain.has_call() {
            return Err(chain_mismatch(chain));
        }
        self.walk_chain(chain, Some(assign))
    }

    fn walk_chain(&mut self, chain: &PostfixExpr, target: Option<&AssignStmt>) -> Result<Type> {
        let (mut current, mut access) = self.chain_base(&chain.base)?;
        let last = chain.ops.len().saturating_sub(1);

        for (i, op) in chain.ops.iter().enumerate() {
            if current.is_error() {
                return Ok(Type::Error);
            }
            match op {
                PostfixOp::Member { name, span } => {
                    let class = self.accessed_class(&current, access).ok_or_else(|| {
                        CompilationError::TypeMismatchInExpression {
                            construct: chain.base.to_string(),
                            span: chain.base.span(),
                        }
                    })?;
                    let found = self.ctx.lookup_attribute(&class, name).ok_or_else(|| {
                        CompilationError::undeclared(
                            UndeclaredKind::Attribute,
                            name.clone(),
                            *span,
                        )
                    })?;
                    check_member_access(access, found.info.is_static(), chain)?;
                    if let Some(assign) = target
                        && i == last
                        && found.info.is_final()
                    {
                        return Err(CompilationError::CannotAssignToConstant {
                            construct: assign.to_string(),
                            span: assign.span,
                        });
                    }
                    current = found.info.ty.dereferenced().clone();
                }
                PostfixOp::Index { index, .. } => {
                    let index_ty = self.check_expr(index)?;
                    let Some(element) = current.element().cloned() else {
                        return Err(chain_mismatch(chain));
                    };
                    if !index_ty.is_error() && !index_ty.is_int() {
                        return Err(CompilationError::TypeMismatchInExpression {
                            construct: op.to_string(),
                            span: op.span(),
                        });
                    }
                    current = element;
                }
                PostfixOp::Call { name, args, span } => {
                    let arg_types = args
                        .iter()
                        .map(|arg| self.check_expr(arg))
                        .collect::<Result<Vec<_>>>()?;
                    let class = self
                        .accessed_class(&current, access)
                        .ok_or_else(|| chain_mismatch(chain))?;
                    let found = self.table().lookup_method(&class, name).ok_or_else(|| {
                        CompilationError::undeclared(UndeclaredKind::Method, name.clone(), *span)
                    })?;
                    check_member_access(access, found.info.is_static, chain)?;
                    if found.info.params.len() != arg_types.len()
                        || !found
                            .info
                            .params
                            .iter()
                            .zip(&arg_types)
                            .all(|(param, arg)| self.compatible(param, arg))
                    {
                        return Err(chain_mismatch(chain));
                    }
                    current = found.info.return_type.dereferenced().clone();
                }
            }
            access = Access::Value;
        }
        Ok(current)
    }

    /// Type of the chain base and how its first member is reached.
    fn chain_base(&mut self, base: &Expr) -> Result<(Type, Access)> {
        match base.unparenthesized() {
            Expr::Ident(id) => match self.ctx.resolve_name(&id.name) {
                Some(NameRef::Class(name)) => Ok((Type::class(name), Access::Static)),
                Some(NameRef::Scoped(entry))
                    if id.name == IO_BINDING && entry.ty.class_name() == Some(IO_CLASS) =>
                {
                    Ok((entry.ty, Access::Io))
                }
                _ => Ok((self.check_expr(base)?, Access::Value)),
            },
            Expr::This(_) => Ok((self.check_expr(base)?, Access::This)),
            _ => Ok((self.check_expr(base)?, Access::Value)),
        }
    }

    /// Class whose members the next step looks up.
    fn accessed_class(&self, current: &Type, access: Access) -> Option<String> {
        match access {
            Access::Io => Some(IO_CLASS.to_string()),
            _ => current.class_name().map(str::to_string),
        }
    }
}

fn check_member_access(access: Access, is_static: bool, chain: &PostfixExpr) -> Result<()> {
    let legal = match access {
        Access::Static | Access::Io => is_static,
        Access::This => true,
        Access::Value => !is_static,
    };
    if legal {
        Ok(())
    } else {
        Err(CompilationError::IllegalMemberAccess {
            construct: chain.to_string(),
            span: chain.span,
        })
    }
}

fn chain_mismatch(chain: &PostfixExpr) -> CompilationError {
    CompilationError::TypeMismatchInExpression {
        construct: chain.to_string(),
        span: chain.span,
    }
}
