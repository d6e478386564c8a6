//! Statement lowering.
//!
//! ```text
//! if c then s1 else s2          for i := a to b do s
//!     <c>                           <a>; store i
//!     ifeq Else                 Cond:
//!     <s1>                          load i; <b>; if_icmpgt Break
//!     goto End                      <s>
//! Else:                         Continue:
//!     <s2>                          i := i + 1
//! End:                              goto Cond
//!                               Break:
//! ```
//!
//! `downto` loops test with `if_icmplt` and decrement.

use oplang_ast::{AssignStmt, BinaryOp, ForDirection, ForStmt, Ident, IfStmt, Lhs, ReturnStmt, Stmt};
use oplang_core::{CompilationError, Type};
use oplang_registry::IO_CLASS;

use super::routine::{Place, Resolved, Result, RoutineCompiler};
use crate::emit::Condition;
use crate::emit::descriptor::ValueKind;

impl RoutineCompiler<'_> {
    pub(super) fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => self.compile_assign(assign),
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::For(for_stmt) => self.compile_for(for_stmt),
            Stmt::Break(_) => {
                let target = self.emitter.frame().break_label()?;
                self.emitter.goto(target)
            }
            Stmt::Continue(_) => {
                let target = self.emitter.frame().continue_label()?;
                self.emitter.goto(target)
            }
            Stmt::Return(ret) => self.compile_return(ret),
            Stmt::Block(block) => self.compile_nested_block(block),
            Stmt::Invoke(invoke) => {
                let ty = self.compile_postfix(&invoke.call)?;
                if !ty.is_void() {
                    self.emitter.pop()?;
                }
                Ok(())
            }
        }
    }

    fn compile_assign(&mut self, assign: &AssignStmt) -> Result<()> {
        let place = match &assign.lhs {
            Lhs::Ident(ident) => self.ident_place(ident)?,
            Lhs::Postfix(chain) => self.chain_place(chain)?,
        };
        let actual = self.compile_expr(&assign.rhs)?;
        self.widen(place.ty(), &actual)?;
        self.store(&place)
    }

    fn compile_if(&mut self, stmt: &IfStmt) -> Result<()> {
        let else_label = self.emitter.frame_mut().new_label();
        self.compile_expr(&stmt.condition)?;
        self.emitter.if_false(else_label)?;
        self.compile_stmt(&stmt.then_branch)?;

        match &stmt.else_branch {
            Some(else_branch) => {
                let end_label = self.emitter.frame_mut().new_label();
                self.emitter.goto(end_label)?;
                self.emitter.label(else_label);
                self.compile_stmt(else_branch)?;
                self.emitter.label(end_label);
            }
            None => self.emitter.label(else_label),
        }
        Ok(())
    }

    fn compile_for(&mut self, stmt: &ForStmt) -> Result<()> {
        let frame = self.emitter.frame_mut();
        let cond_label = frame.new_label();
        let continue_label = frame.new_label();
        let break_label = frame.new_label();

        let place = self.ident_place(&stmt.var)?;
        self.compile_expr(&stmt.start)?;
        self.store(&place)?;

        self.emitter.label(cond_label);
        self.load_ident(&stmt.var)?;
        self.compile_expr(&stmt.end)?;
        let exit = match stmt.direction {
            ForDirection::Up => Condition::Gt,
            ForDirection::Down => Condition::Lt,
        };
        self.emitter.if_int_cmp(exit, break_label)?;

        self.emitter.frame_mut().enter_loop(continue_label, break_label);
        let body = self.compile_stmt(&stmt.body);
        self.emitter.frame_mut().exit_loop();
        body?;

        self.emitter.label(continue_label);
        self.step(&stmt.var, stmt.direction)?;
        self.emitter.goto(cond_label)?;
        self.emitter.label(break_label);
        Ok(())
    }

    /// Move the loop variable one step.
    fn step(&mut self, var: &Ident, direction: ForDirection) -> Result<()> {
        let delta = match direction {
            ForDirection::Up => 1,
            ForDirection::Down => -1,
        };
        if let Resolved::Local(local) = self.resolve(&var.name)? {
            return self.emitter.emit(format!("iinc {} {delta}", local.slot), 0);
        }

        let place = self.ident_place(var)?;
        self.load_ident(var)?;
        self.emitter.push_int(1)?;
        let op = match direction {
            ForDirection::Up => BinaryOp::Add,
            ForDirection::Down => BinaryOp::Sub,
        };
        self.emitter.arithmetic(op, ValueKind::Int)?;
        self.store(&place)
    }

    fn compile_return(&mut self, ret: &ReturnStmt) -> Result<()> {
        let return_type = self.emitter.frame().return_type.clone();
        match &ret.value {
            Some(value) => {
                let actual = self.compile_expr(value)?;
                if return_type.is_void() {
                    if !actual.is_void() {
                        self.emitter.pop()?;
                    }
                    self.emitter.return_void()
                } else {
                    self.widen(&return_type, &actual)?;
                    self.emitter.return_value(&return_type)
                }
            }
            None => self.emitter.return_void(),
        }
    }

    // ==========================================================================
    // Places
    // ==========================================================================

    /// Place named by a bare identifier. Pushes `this` for instance
    /// attributes.
    pub(super) fn ident_place(&mut self, ident: &Ident) -> Result<Place> {
        match self.resolve(&ident.name)? {
            Resolved::Local(local) => Ok(Place::Local {
                slot: local.slot,
                ty: local.ty,
            }),
            Resolved::Attribute(attr) if attr.info.is_static() => Ok(Place::Static {
                host: attr.host_name().to_string(),
                name: attr.info.name.clone(),
                ty: attr.info.ty.clone(),
            }),
            Resolved::Attribute(attr) => {
                let this = self.this_type();
                self.emitter.load_local(&this, 0)?;
                Ok(Place::Field {
                    host: attr.host_name().to_string(),
                    name: attr.info.name.clone(),
                    ty: attr.info.ty.clone(),
                })
            }
            Resolved::Class(_) | Resolved::Io => Err(CompilationError::internal(format!(
                "`{}` is not assignable",
                ident.name
            ))),
        }
    }

    /// Store the value on top of the stack into `place`.
    pub(super) fn store(&mut self, place: &Place) -> Result<()> {
        match place {
            Place::Local { slot, ty } => self.emitter.store_local(ty, *slot),
            Place::Static { host, name, ty } => self.emitter.put_static(host, name, ty),
            Place::Field { host, name, ty } => self.emitter.put_field(host, name, ty),
            Place::Element { ty } => self.emitter.array_store(ty),
        }
    }

    /// Push the value of a bare identifier.
    pub(super) fn load_ident(&mut self, ident: &Ident) -> Result<Type> {
        match self.resolve(&ident.name)? {
            Resolved::Local(local) => {
                self.emitter.load_local(&local.ty, local.slot)?;
                Ok(local.ty.dereferenced().clone())
            }
            Resolved::Attribute(attr) => {
                let info = attr.info;
                if info.is_static() {
                    self.emitter.get_static(attr.host_name(), &info.name, &info.ty)?;
                } else {
                    let this = self.this_type();
                    self.emitter.load_local(&this, 0)?;
                    self.emitter.get_field(attr.host_name(), &info.name, &info.ty)?;
                }
                Ok(info.ty.dereferenced().clone())
            }
            Resolved::Io => {
                self.emitter.push_null()?;
                Ok(Type::class(IO_CLASS))
            }
            Resolved::Class(name) => Err(CompilationError::internal(format!(
                "class `{name}` used as a value"
            ))),
        }
    }
}
