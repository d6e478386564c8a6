//! Statement and local declaration checks.

use oplang_ast::{AssignStmt, Block, ForStmt, Lhs, ReturnStmt, Stmt, VariableDecl};
use oplang_core::{CompilationError, DeclKind, Type, UndeclaredKind};

use super::{Result, StaticChecker};
use crate::context::{NameRef, RoutineKind};

impl StaticChecker<'_> {
    /// Declarations first, then statements, in the current scope.
    pub(super) fn check_block_content(&mut self, block: &Block) -> Result<()> {
        for decl in &block.var_decls {
            self.check_var_decl(decl)?;
        }
        for stmt in &block.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_var_decl(&mut self, decl: &VariableDecl) -> Result<()> {
        self.require_class_defined(&decl.ty, decl.span)?;

        for var in &decl.variables {
            if self.ctx.scopes.lookup_current(&var.name).is_some() {
                let kind = if decl.is_final {
                    DeclKind::Constant
                } else {
                    DeclKind::Variable
                };
                return Err(CompilationError::redeclared(kind, var.name.clone(), var.span));
            }

            if let Some(init) = &var.init {
                if decl.is_final {
                    if !self.is_constant(init) {
                        return Err(CompilationError::IllegalConstantExpression {
                            construct: init.to_string(),
                            span: init.span(),
                        });
                    }
                    let ty = self.check_expr(init)?;
                    if !self.compatible(&decl.ty, &ty) {
                        return Err(CompilationError::TypeMismatchInConstant {
                            construct: decl.to_string(),
                            span: decl.span,
                        });
                    }
                } else {
                    let ty = self.check_expr(init)?;
                    if !self.compatible(&decl.ty, &ty) {
                        if ty.is_void() {
                            return Err(CompilationError::TypeMismatchInExpression {
                                construct: init.to_string(),
                                span: init.span(),
                            });
                        }
                        return Err(CompilationError::TypeMismatchInStatement {
                            construct: decl.to_string(),
                            span: decl.span,
                        });
                    }
                }
            }

            self.ctx.scopes.declare_local(
                &var.name,
                decl.ty.clone(),
                decl.is_final,
                var.span,
            )?;
        }
        Ok(())
    }

    pub(super) fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::If(s) => {
                let cond = self.check_expr(&s.condition)?;
                if !cond.is_error() && !cond.is_bool() {
                    return Err(mismatch_in_statement(stmt));
                }
                self.check_stmt(&s.then_branch)?;
                if let Some(else_branch) = &s.else_branch {
                    self.check_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::For(s) => self.check_for(s, stmt),
            Stmt::Break(span) | Stmt::Continue(span) => {
                if self.ctx.loop_depth == 0 {
                    return Err(CompilationError::MustInLoop {
                        construct: stmt.to_string(),
                        span: *span,
                    });
                }
                Ok(())
            }
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::Block(block) => {
                self.ctx.scopes.push();
                self.check_block_content(block)?;
                self.ctx.scopes.pop();
                Ok(())
            }
            Stmt::Invoke(invoke) => match self.check_postfix(&invoke.call) {
                Err(CompilationError::TypeMismatchInExpression { .. }) => {
                    Err(CompilationError::TypeMismatchInStatement {
                        construct: invoke.call.to_string(),
                        span: invoke.span,
                    })
                }
                other => other.map(|_| ()),
            },
        }
    }

    fn check_assign(&mut self, assign: &AssignStmt) -> Result<()> {
        let (rhs, held) = match self.check_expr(&assign.rhs) {
            Ok(ty) => (ty, None),
            Err(err) if err.is_priority() => return Err(err),
            Err(err) => (Type::Error, Some(err)),
        };

        let target = match &assign.lhs {
            Lhs::Ident(id) => match self.ctx.resolve_name(&id.name) {
                Some(NameRef::Scoped(entry)) => {
                    if entry.is_final {
                        return Err(cannot_assign(assign));
                    }
                    entry.ty.dereferenced().clone()
                }
                Some(NameRef::Attribute(found)) => {
                    if found.info.is_final() {
                        return Err(cannot_assign(assign));
                    }
                    found.info.ty.dereferenced().clone()
                }
                Some(NameRef::Class(_)) => {
                    return Err(CompilationError::TypeMismatchInStatement {
                        construct: assign.to_string(),
                        span: assign.span,
                    });
                }
                None => {
                    return Err(CompilationError::undeclared(
                        UndeclaredKind::Identifier,
                        id.name.clone(),
                        id.span,
                    ));
                }
            },
            Lhs::Postfix(chain) => self.check_postfix_target(chain, assign)?,
        };

        if let Some(err) = held {
            return Err(err);
        }
        if rhs.is_error() || target.is_error() {
            return Ok(());
        }
        if !self.compatible(&target, &rhs) {
            return Err(CompilationError::TypeMismatchInStatement {
                construct: assign.to_string(),
                span: assign.span,
            });
        }
        Ok(())
    }

    fn check_for(&mut self, s: &ForStmt, stmt: &Stmt) -> Result<()> {
        let var_ty = match self.ctx.resolve_name(&s.var.name) {
            Some(NameRef::Scoped(entry)) => {
                if entry.is_final {
                    return Err(CompilationError::CannotAssignToConstant {
                        construct: stmt.to_string(),
                        span: s.span,
                    });
                }
                entry.ty.dereferenced().clone()
            }
            Some(NameRef::Attribute(found)) => {
                if found.info.is_final() {
                    return Err(CompilationError::CannotAssignToConstant {
                        construct: stmt.to_string(),
                        span: s.span,
                    });
                }
                found.info.ty.clone()
            }
            Some(NameRef::Class(_)) => return Err(mismatch_in_statement(stmt)),
            None => {
                return Err(CompilationError::undeclared(
                    UndeclaredKind::Identifier,
                    s.var.name.clone(),
                    s.var.span,
                ));
            }
        };
        if !var_ty.is_int() {
            return Err(mismatch_in_statement(stmt));
        }

        let start = self.check_expr(&s.start)?;
        let end = self.check_expr(&s.end)?;
        if (!start.is_error() && !start.is_int()) || (!end.is_error() && !end.is_int()) {
            return Err(mismatch_in_statement(stmt));
        }

        self.ctx.loop_depth += 1;
        self.check_stmt(&s.body)?;
        self.ctx.loop_depth -= 1;
        Ok(())
    }

    fn check_return(&mut self, ret: &ReturnStmt) -> Result<()> {
        let actual = match &ret.value {
            Some(value) => Some(self.check_expr(value)?),
            None => None,
        };
        let Some(routine) = self.ctx.routine.as_ref() else {
            return Ok(());
        };
        let mismatch = || CompilationError::TypeMismatchInStatement {
            construct: ret.to_string(),
            span: ret.span,
        };

        match actual {
            None if routine.return_type.is_void() || routine.kind == RoutineKind::Constructor => {
                Ok(())
            }
            None => Err(mismatch()),
            Some(ty) if ty.is_error() => Ok(()),
            Some(_) if routine.return_type.is_void() => Err(mismatch()),
            Some(ty) if self.compatible(&routine.return_type, &ty) => Ok(()),
            Some(_) => Err(mismatch()),
        }
    }
}

fn mismatch_in_statement(stmt: &Stmt) -> CompilationError {
    CompilationError::TypeMismatchInStatement {
        construct: stmt.to_string(),
        span: stmt.span(),
    }
}

fn cannot_assign(assign: &AssignStmt) -> CompilationError {
    CompilationError::CannotAssignToConstant {
        construct: assign.to_string(),
        span: assign.span,
    }
}
