//! Static checker.
//!
//! Walks a program against a frozen [`ClassTable`], giving every expression a
//! [`Type`] and validating every statement. Checking is fail-fast: the first
//! violation aborts with a [`CompilationError`] naming the offending
//! construct.
//!
//! ## Scopes
//!
//! ```text
//! program scope   io : IO (final)
//! └── class scope this : C (final)
//!     └── routine scope   parameters
//!         └── block scopes locals
//! ```
//!
//! Identifiers resolve class names first, then scopes innermost to
//! outermost, then attributes of the current class and its ancestors.
//!
//! ## Tolerated failures
//!
//! Assignment checks its right-hand side before its target. Priority errors
//! (see [`CompilationError::is_priority`]) abort at once; any other failure
//! is held as [`Type::Error`] while the target is validated, then re-raised.

mod constant;
mod expr;
mod postfix;
mod stmt;

use log::{debug, trace};
use oplang_ast::{
    AttributeDecl, Block, ClassDecl, ClassMember, ConstructorDecl, DestructorDecl, Expr,
    LiteralKind, MethodDecl, Param, Program,
};
use oplang_core::{CompilationError, Span, Type, UndeclaredKind};
use oplang_registry::{ClassTable, IO_BINDING, IO_CLASS};

use crate::context::{CheckContext, RoutineKind};
use crate::conversion::compatible;
use crate::options::CompileOptions;
use crate::scope::ScopeEntry;

type Result<T> = std::result::Result<T, CompilationError>;

/// The static checker.
pub struct StaticChecker<'t> {
    ctx: CheckContext<'t>,
    options: &'t CompileOptions,
}

impl<'t> StaticChecker<'t> {
    pub fn new(table: &'t ClassTable, options: &'t CompileOptions) -> Self {
        Self {
            ctx: CheckContext::new(table),
            options,
        }
    }

    /// Check a whole program.
    pub fn check(mut self, program: &Program) -> Result<()> {
        self.ctx.scopes.push();
        self.ctx.scopes.bind(
            IO_BINDING,
            ScopeEntry {
                ty: Type::class(IO_CLASS),
                is_final: true,
                span: Span::default(),
            },
        );

        for class in &program.classes {
            self.check_class(class)?;
        }
        self.ctx.scopes.pop();

        if self.options.require_entry_point && self.ctx.table.entry_point().is_none() {
            return Err(CompilationError::NoEntryPoint);
        }
        Ok(())
    }

    pub(crate) fn table(&self) -> &'t ClassTable {
        self.ctx.table
    }

    pub(crate) fn compatible(&self, expected: &Type, actual: &Type) -> bool {
        compatible(self.ctx.table, expected, actual)
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    fn check_class(&mut self, class: &ClassDecl) -> Result<()> {
        debug!("checking class {}", class.name);
        self.ctx.current_class = Some(class.name.clone());
        self.ctx.scopes.push();
        self.ctx.scopes.bind(
            "this",
            ScopeEntry {
                ty: Type::class(class.name.clone()),
                is_final: true,
                span: class.span,
            },
        );

        for member in &class.members {
            match member {
                ClassMember::Attribute(decl) => self.check_attribute_decl(decl)?,
                ClassMember::Method(method) => self.check_method(method)?,
                ClassMember::Constructor(ctor) => self.check_constructor(ctor)?,
                ClassMember::Destructor(dtor) => self.check_destructor(dtor)?,
            }
        }

        self.ctx.scopes.pop();
        self.ctx.current_class = None;
        Ok(())
    }

    /// Class types named in a declaration must exist.
    fn require_class_defined(&self, ty: &Type, span: Span) -> Result<()> {
        match ty {
            Type::Class(name) if !self.ctx.table.contains(name) => Err(
                CompilationError::undeclared(UndeclaredKind::Class, name.clone(), span),
            ),
            Type::Array { element, .. } => self.require_class_defined(element, span),
            Type::Reference(inner) => self.require_class_defined(inner, span),
            _ => Ok(()),
        }
    }

    // ==========================================================================
    // Attributes
    // ==========================================================================

    fn check_attribute_decl(&mut self, decl: &AttributeDecl) -> Result<()> {
        self.require_class_defined(&decl.ty, decl.span)?;

        for attr in &decl.attributes {
            let Some(init) = &attr.init else {
                continue;
            };
            self.ctx.initializing_attr = Some(attr.name.clone());
            self.ctx.enter_routine(
                RoutineKind::AttributeInit,
                decl.ty.clone(),
                decl.modifiers.is_static(),
            );
            let result = self.check_attribute_init(decl, init);
            self.ctx.exit_routine();
            self.ctx.initializing_attr = None;
            result?;
        }
        Ok(())
    }

    fn check_attribute_init(&mut self, decl: &AttributeDecl, init: &Expr) -> Result<()> {
        let construct = || decl.to_string();

        if !decl.modifiers.is_final() {
            let ty = self.check_expr(init)?;
            if !self.compatible(&decl.ty, &ty) {
                return Err(CompilationError::TypeMismatchInStatement {
                    construct: construct(),
                    span: decl.span,
                });
            }
            return Ok(());
        }

        if let Expr::Literal(lit) = init
            && lit.kind == LiteralKind::Nil
        {
            return Err(CompilationError::IllegalConstantExpression {
                construct: init.to_string(),
                span: init.span(),
            });
        }
        if !self.is_attr_constant(init) {
            return Err(CompilationError::IllegalConstantExpression {
                construct: construct(),
                span: decl.span,
            });
        }

        let ty = match self.check_expr(init) {
            Err(CompilationError::TypeMismatchInExpression { .. }) => {
                return Err(CompilationError::TypeMismatchInConstant {
                    construct: construct(),
                    span: decl.span,
                });
            }
            other => other?,
        };
        if !self.compatible(&decl.ty, &ty) {
            return Err(CompilationError::TypeMismatchInConstant {
                construct: construct(),
                span: decl.span,
            });
        }
        Ok(())
    }

    // ==========================================================================
    // Routines
    // ==========================================================================

    fn check_method(&mut self, method: &MethodDecl) -> Result<()> {
        trace!("checking method {}", method);
        self.ctx
            .enter_routine(RoutineKind::Method, method.return_type.clone(), method.is_static);
        self.check_routine_body(&method.params, &method.body)?;
        self.ctx.exit_routine();
        Ok(())
    }

    fn check_constructor(&mut self, ctor: &ConstructorDecl) -> Result<()> {
        trace!("checking constructor {}", ctor);
        let class = self.current_class_type();
        if class.class_name() != Some(ctor.name.as_str()) {
            return Err(CompilationError::TypeMismatchInStatement {
                construct: ctor.to_string(),
                span: ctor.span,
            });
        }
        self.ctx.enter_routine(RoutineKind::Constructor, class, false);
        self.check_routine_body(&ctor.params, &ctor.body)?;
        self.ctx.exit_routine();
        Ok(())
    }

    fn check_destructor(&mut self, dtor: &DestructorDecl) -> Result<()> {
        trace!("checking destructor {}", dtor);
        if self.ctx.current_class.as_deref() != Some(dtor.name.as_str()) {
            return Err(CompilationError::TypeMismatchInStatement {
                construct: dtor.to_string(),
                span: dtor.span,
            });
        }
        self.ctx.enter_routine(RoutineKind::Destructor, Type::VOID, false);
        self.check_routine_body(&[], &dtor.body)?;
        self.ctx.exit_routine();
        Ok(())
    }

    fn check_routine_body(&mut self, params: &[Param], body: &Block) -> Result<()> {
        self.ctx.scopes.push();
        for param in params {
            self.require_class_defined(&param.ty, param.span)?;
            self.ctx
                .scopes
                .declare_param(&param.name, param.ty.clone(), param.span)?;
        }
        self.check_block_content(body)?;
        self.ctx.scopes.pop();
        Ok(())
    }

    fn current_class_type(&self) -> Type {
        self.ctx
            .current_class
            .as_ref()
            .map_or(Type::Error, |name| Type::class(name.clone()))
    }
}
