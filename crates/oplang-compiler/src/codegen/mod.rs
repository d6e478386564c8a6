//! Code generation.
//!
//! Lowers a checked program to one Jasmin-style text unit per class. The
//! generator trusts the checker: a construct it cannot lower is reported as
//! [`CompilationError::Internal`].
//!
//! ## Unit layout
//!
//! ```text
//! .source Point.java
//! .class public Point
//! .super java/lang/Object
//! .field public x F
//! .field public static final ORIGIN I
//!
//! .method public <init>(FF)V        constructors, then methods and the
//! ...                               destructor in declaration order
//! .end method
//!
//! .method static <clinit>()V        only with static initializers
//! ...
//! ```
//!
//! Every constructor begins with `super()` followed by the instance
//! attribute initializers. A class without constructors gets a default
//! `<init>()V` doing just that. The destructor becomes `finalize()V` and the
//! entry point becomes `main([Ljava/lang/String;)V`.

pub mod frame;
pub mod jumps;

mod expr;
mod postfix;
mod routine;
mod stmt;


use std::fmt::Write;

use log::{debug, trace};
use oplang_ast::{ClassDecl, ClassMember, ConstructorDecl, DestructorDecl, MethodDecl, Program};
use oplang_core::{CompilationError, Type};
use oplang_registry::{AttributeInfo, ClassRecord, ClassTable};

pub use frame::{BlockLabels, Frame, Label, LocalSymbol};
pub use jumps::LoopManager;

use crate::emit::descriptor::{descriptor, method_descriptor};
use crate::options::CompileOptions;
use routine::{Receiver, RoutineCompiler, entry_point_header};

type Result<T> = std::result::Result<T, CompilationError>;

/// The generated text of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassUnit {
    pub class_name: String,
    /// `Name.<unit extension>`
    pub file_name: String,
    pub text: String,
}

/// Generates class units from a checked program.
pub struct CodeGenerator<'t> {
    table: &'t ClassTable,
    options: &'t CompileOptions,
}

impl<'t> CodeGenerator<'t> {
    pub fn new(table: &'t ClassTable, options: &'t CompileOptions) -> Self {
        Self { table, options }
    }

    /// One unit per class, in declaration order.
    pub fn generate(&self, program: &Program) -> Result<Vec<ClassUnit>> {
        program
            .classes
            .iter()
            .map(|class| self.generate_class(class))
            .collect()
    }

    pub fn generate_class(&self, class: &ClassDecl) -> Result<ClassUnit> {
        debug!("generating class {}", class.name);
        let record = self.table.get(&class.name).ok_or_else(|| {
            CompilationError::internal(format!("unregistered class {}", class.name))
        })?;
        let attributes = self.attributes_in_order(class, record)?;
        let parent = class
            .superclass
            .as_deref()
            .unwrap_or(&self.options.default_superclass);

        let mut text = String::new();
        let _ = writeln!(text, ".source {}.{}", class.name, self.options.source_extension);
        let _ = writeln!(text, ".class public {}", class.name);
        let _ = writeln!(text, ".super {parent}");
        for attr in &attributes {
            let _ = writeln!(text, "{}", field_directive(attr));
        }

        if class.constructors().next().is_none() {
            text.push('\n');
            text.push_str(&self.default_constructor(record, parent, &attributes)?);
        }

        for member in &class.members {
            let routine = match member {
                ClassMember::Attribute(_) => continue,
                ClassMember::Method(method) => self.method(record, method)?,
                ClassMember::Constructor(ctor) => {
                    self.constructor(record, parent, &attributes, ctor)?
                }
                ClassMember::Destructor(dtor) => self.destructor(record, dtor)?,
            };
            text.push('\n');
            text.push_str(&routine);
        }

        if attributes
            .iter()
            .any(|a| a.is_static() && (a.init.is_some() || a.ty.is_array()))
        {
            text.push('\n');
            text.push_str(&self.static_initializer(record, &attributes)?);
        }

        Ok(ClassUnit {
            class_name: class.name.clone(),
            file_name: format!("{}.{}", class.name, self.options.unit_extension),
            text,
        })
    }

    /// The class's own attributes, in declaration order.
    fn attributes_in_order<'r>(
        &self,
        class: &ClassDecl,
        record: &'r ClassRecord,
    ) -> Result<Vec<&'r AttributeInfo>> {
        class
            .attributes()
            .flat_map(|decl| &decl.attributes)
            .map(|attr| {
                record.attributes.get(&attr.name).ok_or_else(|| {
                    CompilationError::internal(format!(
                        "unregistered attribute {}.{}",
                        class.name, attr.name
                    ))
                })
            })
            .collect()
    }

    // ==========================================================================
    // Routines
    // ==========================================================================

    fn routine(
        &self,
        record: &'t ClassRecord,
        header: &str,
        frame: Frame,
        receiver: Receiver,
    ) -> RoutineCompiler<'t> {
        trace!("  routine {}", frame.name);
        RoutineCompiler::new(self.table, self.options, &record.name, header, frame, receiver)
    }

    fn method(&self, record: &'t ClassRecord, method: &MethodDecl) -> Result<String> {
        let (header, receiver) = if method.is_entry_point() {
            (entry_point_header(), Receiver::Args)
        } else {
            let params: Vec<Type> = method.params.iter().map(|p| p.ty.clone()).collect();
            let header = format!(
                "public {}{}{}",
                if method.is_static { "static " } else { "" },
                method.name,
                method_descriptor(&params, &method.return_type)
            );
            let receiver = if method.is_static {
                Receiver::None
            } else {
                Receiver::This
            };
            (header, receiver)
        };

        let frame = Frame::new(method.name.clone(), method.return_type.clone(), method.is_static);
        let mut routine = self.routine(record, &header, frame, receiver);
        let slots = routine.declare_params(&method.params);
        routine.compile_body(&method.body, |r| {
            r.bind_params(&method.params, &slots);
            Ok(())
        })?;
        routine.finish(Some(&method.body))
    }

    fn constructor(
        &self,
        record: &'t ClassRecord,
        parent: &str,
        attributes: &[&AttributeInfo],
        ctor: &ConstructorDecl,
    ) -> Result<String> {
        let params: Vec<Type> = ctor.params.iter().map(|p| p.ty.clone()).collect();
        let header = format!("public <init>{}", method_descriptor(&params, &Type::VOID));
        let frame = Frame::new("<init>", Type::VOID, false);
        let mut routine = self.routine(record, &header, frame, Receiver::This);
        let slots = routine.declare_params(&ctor.params);
        routine.compile_body(&ctor.body, |r| {
            r.call_super_constructor(parent)?;
            for attr in attributes.iter().filter(|a| !a.is_static()) {
                r.init_attribute(attr)?;
            }
            r.bind_params(&ctor.params, &slots);
            Ok(())
        })?;
        routine.finish(Some(&ctor.body))
    }

    fn default_constructor(
        &self,
        record: &'t ClassRecord,
        parent: &str,
        attributes: &[&AttributeInfo],
    ) -> Result<String> {
        let frame = Frame::new("<init>", Type::VOID, false);
        let mut routine = self.routine(record, "public <init>()V", frame, Receiver::This);
        routine.start();
        routine.call_super_constructor(parent)?;
        for attr in attributes.iter().filter(|a| !a.is_static()) {
            routine.init_attribute(attr)?;
        }
        routine.finish(None)
    }

    fn destructor(&self, record: &'t ClassRecord, dtor: &DestructorDecl) -> Result<String> {
        let frame = Frame::new("finalize", Type::VOID, false);
        let mut routine = self.routine(record, "public finalize()V", frame, Receiver::This);
        routine.compile_body(&dtor.body, |_| Ok(()))?;
        routine.finish(Some(&dtor.body))
    }

    fn static_initializer(
        &self,
        record: &'t ClassRecord,
        attributes: &[&AttributeInfo],
    ) -> Result<String> {
        let frame = Frame::new("<clinit>", Type::VOID, true);
        let mut routine = self.routine(record, "static <clinit>()V", frame, Receiver::None);
        routine.start();
        for attr in attributes.iter().filter(|a| a.is_static()) {
            routine.init_attribute(attr)?;
        }
        routine.finish(None)
    }
}

/// `.field public [static] [final] name desc`
fn field_directive(attr: &AttributeInfo) -> String {
    let mut out = String::from(".field public ");
    if attr.is_static() {
        out.push_str("static ");
    }
    if attr.is_final() {
        out.push_str("final ");
    }
    let _ = write!(out, "{} {}", attr.name, descriptor(&attr.ty));
    out
}
