//! Routine compiler.
//!
//! [`RoutineCompiler`] generates the text of one method, constructor,
//! destructor or static initializer. Statement, expression and postfix
//! chain compilation live in sibling modules as further `impl` blocks.
//!
//! Layout of every routine:
//!
//! ```text
//! .method public [static] name(desc)ret
//! .var 0 is this LC; from Label0 to Label1
//! .var 1 is x I from Label0 to Label1
//! Label0:
//!     prologue, local initializers, statements
//!     [return]
//! Label1:
//! .limit stack N
//! .limit locals M
//! .end method
//! ```

use oplang_ast::{Block, Param, Stmt, Variable};
use oplang_core::{CompilationError, Type};
use oplang_registry::{AttributeInfo, ClassTable, Hosted, IO_BINDING};

use super::frame::{BlockLabels, Frame, LocalSymbol};
use crate::conversion::needs_widening;
use crate::emit::JasminEmitter;
use crate::emit::descriptor::descriptor;
use crate::options::CompileOptions;

pub(super) type Result<T> = std::result::Result<T, CompilationError>;

/// What occupies slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Receiver {
    /// Instance routines.
    This,
    /// The entry point's argument array.
    Args,
    /// Other static routines.
    None,
}

/// What a bare identifier refers to at code generation time.
#[derive(Debug, Clone)]
pub(super) enum Resolved<'t> {
    Class(&'t str),
    Local(LocalSymbol),
    /// The pre-bound I/O handle.
    Io,
    Attribute(Hosted<'t, AttributeInfo>),
}

/// Where an assignment stores its value. Receivers, arrays and indexes are
/// already on the stack when a place is returned.
#[derive(Debug, Clone)]
pub(super) enum Place {
    Local { slot: u16, ty: Type },
    Static { host: String, name: String, ty: Type },
    Field { host: String, name: String, ty: Type },
    Element { ty: Type },
}

impl Place {
    pub(super) fn ty(&self) -> &Type {
        match self {
            Place::Local { ty, .. }
            | Place::Static { ty, .. }
            | Place::Field { ty, .. }
            | Place::Element { ty } => ty,
        }
    }
}

/// A local whose slot and `.var` entry exist but which is not visible yet.
struct PendingLocal<'b> {
    var: &'b Variable,
    ty: Type,
    slot: u16,
}

/// Compiles one routine of the current class.
pub(crate) struct RoutineCompiler<'t> {
    pub(super) table: &'t ClassTable,
    pub(super) options: &'t CompileOptions,
    pub(super) class_name: &'t str,
    pub(super) emitter: JasminEmitter,
    labels: BlockLabels,
}

impl<'t> RoutineCompiler<'t> {
    /// Start a routine: writes the `.method` directive and the `.var` entry
    /// of slot 0.
    pub(crate) fn new(
        table: &'t ClassTable,
        options: &'t CompileOptions,
        class_name: &'t str,
        header: &str,
        frame: Frame,
        receiver: Receiver,
    ) -> Self {
        let mut emitter = JasminEmitter::new(frame);
        let labels = emitter.frame_mut().enter_block();
        emitter.directive(format!(".method {header}"));

        match receiver {
            Receiver::This => {
                let slot = emitter.frame_mut().new_slot();
                emitter.var_directive(slot, "this", &Type::class(class_name), labels);
            }
            Receiver::Args => {
                let slot = emitter.frame_mut().new_slot();
                emitter.var_directive(slot, "args", &Type::array(Type::STRING, 0), labels);
            }
            Receiver::None => {}
        }

        Self {
            table,
            options,
            class_name,
            emitter,
            labels,
        }
    }

    /// Allocate parameter slots. They stay invisible until
    /// [`bind_params`](Self::bind_params).
    pub(crate) fn declare_params(&mut self, params: &[Param]) -> Vec<u16> {
        params
            .iter()
            .map(|param| {
                let slot = self.emitter.frame_mut().new_slot();
                self.emitter
                    .var_directive(slot, &param.name, &param.ty, self.labels);
                slot
            })
            .collect()
    }

    pub(crate) fn bind_params(&mut self, params: &[Param], slots: &[u16]) {
        for (param, slot) in params.iter().zip(slots) {
            self.emitter
                .frame_mut()
                .bind(param.name.clone(), param.ty.clone(), *slot);
        }
    }

    /// Mark the start of the routine's code.
    pub(crate) fn start(&mut self) {
        self.emitter.label(self.labels.start);
    }

    /// Finish the routine, adding a `return` to `void` routines whose body
    /// does not end in one.
    pub(crate) fn finish(mut self, body: Option<&Block>) -> Result<String> {
        let ends_in_return = body
            .and_then(|b| b.stmts.last())
            .is_some_and(|s| matches!(s, Stmt::Return(_)));
        if self.emitter.frame().return_type.is_void() && !ends_in_return {
            self.emitter.return_void()?;
        }
        self.emitter.label(self.labels.end);
        self.emitter.frame_mut().exit_block()?;
        Ok(self.emitter.end_method())
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    /// Compile the body block of the routine, whose locals share the
    /// routine's label range. `prologue` runs after the start label and
    /// before any local is initialized.
    pub(crate) fn compile_body(
        &mut self,
        body: &Block,
        prologue: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let pending = self.declare_locals(body, self.labels);
        self.start();
        prologue(self)?;
        self.init_locals(pending)?;
        self.compile_stmts(&body.stmts)
    }

    /// A nested block with its own label range.
    pub(super) fn compile_nested_block(&mut self, block: &Block) -> Result<()> {
        let labels = self.emitter.frame_mut().enter_block();
        let pending = self.declare_locals(block, labels);
        self.emitter.label(labels.start);
        self.init_locals(pending)?;
        self.compile_stmts(&block.stmts)?;
        self.emitter.label(labels.end);
        self.emitter.frame_mut().exit_block()?;
        Ok(())
    }

    fn declare_locals<'b>(
        &mut self,
        block: &'b Block,
        range: BlockLabels,
    ) -> Vec<PendingLocal<'b>> {
        let mut pending = Vec::new();
        for decl in &block.var_decls {
            for var in &decl.variables {
                let slot = self.emitter.frame_mut().new_slot();
                self.emitter.var_directive(slot, &var.name, &decl.ty, range);
                pending.push(PendingLocal {
                    var,
                    ty: decl.ty.clone(),
                    slot,
                });
            }
        }
        pending
    }

    /// Initialize locals in declaration order. Each becomes visible only
    /// after its own initializer, so `int x := x` reads an outer `x`.
    fn init_locals(&mut self, pending: Vec<PendingLocal<'_>>) -> Result<()> {
        for local in pending {
            match &local.var.init {
                Some(init) => {
                    let actual = self.compile_expr(init)?;
                    self.widen(&local.ty, &actual)?;
                }
                None => self.push_zero(&local.ty)?,
            }
            self.emitter.store_local(&local.ty, local.slot)?;
            self.emitter
                .frame_mut()
                .bind(local.var.name.clone(), local.ty, local.slot);
        }
        Ok(())
    }

    fn compile_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    // ==========================================================================
    // Class-level initialization
    // ==========================================================================

    /// `aload_0; invokespecial Parent/<init>()V`
    pub(crate) fn call_super_constructor(&mut self, parent: &str) -> Result<()> {
        self.emitter.load_local(&Type::class(self.class_name), 0)?;
        self.emitter.invoke_special(&format!("{parent}/<init>"), &[])
    }

    /// Store the initial value of one attribute of the current class: its
    /// initializer, or a fresh array for uninitialized array attributes.
    pub(crate) fn init_attribute(&mut self, info: &AttributeInfo) -> Result<()> {
        if info.init.is_none() && !info.ty.is_array() {
            return Ok(());
        }
        if !info.is_static() {
            self.emitter.load_local(&Type::class(self.class_name), 0)?;
        }
        match &info.init {
            Some(init) => {
                let actual = self.compile_expr(init)?;
                self.widen(&info.ty, &actual)?;
            }
            None => self.push_zero(&info.ty)?,
        }
        if info.is_static() {
            self.emitter.put_static(self.class_name, &info.name, &info.ty)
        } else {
            self.emitter.put_field(self.class_name, &info.name, &info.ty)
        }
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    /// Default value of a declaration without initializer. Arrays are
    /// allocated at their declared size.
    pub(super) fn push_zero(&mut self, ty: &Type) -> Result<()> {
        match ty.dereferenced() {
            Type::Array { element, size } => self.emitter.new_array(element, *size),
            other => self.emitter.push_default(other),
        }
    }

    /// `i2f` when an int value is stored as a float.
    pub(super) fn widen(&mut self, target: &Type, actual: &Type) -> Result<()> {
        if needs_widening(target, actual) {
            self.emitter.int_to_float()?;
        }
        Ok(())
    }

    /// Resolve a bare identifier: class names, then visible locals, then the
    /// I/O handle, then attributes of the current class and its ancestors.
    pub(super) fn resolve(&self, name: &str) -> Result<Resolved<'t>> {
        if let Some(record) = self.table.get(name) {
            return Ok(Resolved::Class(&record.name));
        }
        if let Some(local) = self.emitter.frame().lookup(name) {
            return Ok(Resolved::Local(local.clone()));
        }
        if name == IO_BINDING {
            return Ok(Resolved::Io);
        }
        self.table
            .lookup_attribute(self.class_name, name)
            .map(Resolved::Attribute)
            .ok_or_else(|| CompilationError::internal(format!("unresolved identifier `{name}`")))
    }

    /// Type of `this`.
    pub(super) fn this_type(&self) -> Type {
        Type::class(self.class_name)
    }
}

/// `.method` header of the entry point.
pub(crate) fn entry_point_header() -> String {
    format!("public static main([{})V", descriptor(&Type::STRING))
}
