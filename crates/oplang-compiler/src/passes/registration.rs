//! Registration Pass - build the class table.
//!
//! Runs before any body is checked, so every class and member is known up
//! front and forward references resolve.
//!
//! ## Steps
//!
//! 1. Register every class name (`Redeclared Class` on duplicates).
//! 2. Verify every declared parent exists (`Undeclared Class`), then reject
//!    cyclic hierarchies (`CircularInheritance`).
//! 3. Per class, register attributes, methods, constructors and the
//!    destructor, and record the entry point.
//! 4. Register the built-in `IO` class unless a user class took the name.
//!
//! ## Member namespace
//!
//! Attributes and methods share one set of used names. Constructors and
//! destructors named after their class do not enter the set, but once one
//! exists, an attribute or method reusing the class name is redeclared.
//! Constructors key by parameter-type signature.

use log::debug;
use oplang_ast::{
    AttributeDecl, ClassDecl, ClassMember, ConstructorDecl, DestructorDecl, MethodDecl, Program,
};
use oplang_core::{CompilationError, DeclKind, UndeclaredKind};
use oplang_registry::{
    AttributeInfo, ClassRecord, ClassTable, ConstructorInfo, DestructorInfo, IO_CLASS,
    InheritanceGraph, MethodInfo, ParamSignature, io_class_record,
};
use rustc_hash::FxHashSet;

type Result<T> = std::result::Result<T, CompilationError>;

/// Tracks the shared member namespace of one class.
#[derive(Debug, Default)]
struct MemberNames {
    used: FxHashSet<String>,
    class_named_constructor: bool,
    class_named_destructor: bool,
}

impl MemberNames {
    /// Whether `name` collides with an earlier member, including the class
    /// name once a class-named constructor or destructor exists.
    fn collides(&self, name: &str, class: &str) -> bool {
        self.used.contains(name)
            || (name == class && (self.class_named_constructor || self.class_named_destructor))
    }
}

/// Builds a [`ClassTable`] from a program.
pub struct ClassTableBuilder {
    table: ClassTable,
}

impl Default for ClassTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTableBuilder {
    pub fn new() -> Self {
        Self {
            table: ClassTable::new(),
        }
    }

    /// Run the pass.
    pub fn build(mut self, program: &Program) -> Result<ClassTable> {
        for class in &program.classes {
            self.table.register(ClassRecord::new(
                class.name.clone(),
                class.superclass.clone(),
                class.span,
            ))?;
        }

        self.verify_parents(program)?;
        InheritanceGraph::from_table(&self.table).check_acyclic(&self.table)?;

        for class in &program.classes {
            self.register_members(class)?;
        }

        if !self.table.contains(IO_CLASS) {
            self.table.register(io_class_record())?;
        }

        debug!(
            "class table built: {} classes, entry point {:?}",
            self.table.len(),
            self.table.entry_point()
        );
        Ok(self.table)
    }

    fn verify_parents(&self, program: &Program) -> Result<()> {
        for class in &program.classes {
            if let Some(parent) = &class.superclass
                && !self.table.contains(parent)
            {
                return Err(CompilationError::undeclared(
                    UndeclaredKind::Class,
                    parent.clone(),
                    class.span,
                ));
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    fn register_members(&mut self, class: &ClassDecl) -> Result<()> {
        debug!("registering members of class {}", class.name);
        let mut names = MemberNames::default();
        let mut record = ClassRecord::new(class.name.clone(), class.superclass.clone(), class.span);

        for member in &class.members {
            match member {
                ClassMember::Attribute(decl) => {
                    Self::register_attributes(&mut record, &mut names, decl)?
                }
                ClassMember::Method(method) => {
                    if method.is_entry_point() {
                        self.table.set_entry_point(class.name.clone());
                    }
                    Self::register_method(&mut record, &mut names, method)?
                }
                ClassMember::Constructor(ctor) => {
                    Self::register_constructor(&mut record, &mut names, ctor)?
                }
                ClassMember::Destructor(dtor) => {
                    Self::register_destructor(&mut record, &mut names, dtor)?
                }
            }
        }

        if let Some(slot) = self.table.get_mut(&class.name) {
            *slot = record;
        }
        Ok(())
    }

    fn register_attributes(
        record: &mut ClassRecord,
        names: &mut MemberNames,
        decl: &AttributeDecl,
    ) -> Result<()> {
        for attr in &decl.attributes {
            if names.collides(&attr.name, &record.name) {
                let kind = if decl.modifiers.is_final() {
                    DeclKind::Constant
                } else {
                    DeclKind::Attribute
                };
                return Err(CompilationError::redeclared(kind, attr.name.clone(), attr.span));
            }
            names.used.insert(attr.name.clone());
            record.attributes.insert(
                attr.name.clone(),
                AttributeInfo {
                    name: attr.name.clone(),
                    ty: decl.ty.clone(),
                    modifiers: decl.modifiers,
                    init: attr.init.clone(),
                    span: attr.span,
                },
            );
        }
        Ok(())
    }

    fn register_method(
        record: &mut ClassRecord,
        names: &mut MemberNames,
        method: &MethodDecl,
    ) -> Result<()> {
        if names.collides(&method.name, &record.name) {
            return Err(CompilationError::redeclared(
                DeclKind::Method,
                method.name.clone(),
                method.span,
            ));
        }
        names.used.insert(method.name.clone());
        record.methods.insert(
            method.name.clone(),
            MethodInfo {
                name: method.name.clone(),
                return_type: method.return_type.clone(),
                params: method.params.iter().map(|p| p.ty.clone()).collect(),
                is_static: method.is_static,
                span: method.span,
            },
        );
        Ok(())
    }

    fn register_constructor(
        record: &mut ClassRecord,
        names: &mut MemberNames,
        ctor: &ConstructorDecl,
    ) -> Result<()> {
        if names.used.contains(&ctor.name) {
            return Err(CompilationError::redeclared(
                DeclKind::Constructor,
                ctor.name.clone(),
                ctor.span,
            ));
        }

        let signature = ParamSignature::new(ctor.params.iter().map(|p| p.ty.clone()).collect());
        if record.constructors.contains_key(&signature) {
            return Err(CompilationError::redeclared(
                DeclKind::Constructor,
                record.name.clone(),
                ctor.span,
            ));
        }

        if ctor.name == record.name {
            names.class_named_constructor = true;
        } else {
            names.used.insert(ctor.name.clone());
        }

        record.constructors.insert(
            signature.clone(),
            ConstructorInfo {
                signature,
                span: ctor.span,
            },
        );
        Ok(())
    }

    fn register_destructor(
        record: &mut ClassRecord,
        names: &mut MemberNames,
        dtor: &DestructorDecl,
    ) -> Result<()> {
        if names.used.contains(&dtor.name) {
            return Err(CompilationError::redeclared(
                DeclKind::Destructor,
                dtor.name.clone(),
                dtor.span,
            ));
        }
        if record.destructor.is_some() {
            return Err(CompilationError::redeclared(
                DeclKind::Destructor,
                record.name.clone(),
                dtor.span,
            ));
        }

        if dtor.name == record.name {
            names.class_named_destructor = true;
        } else {
            names.used.insert(dtor.name.clone());
        }

        record.destructor = Some(DestructorInfo { span: dtor.span });
        Ok(())
    }
}
