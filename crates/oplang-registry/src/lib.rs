//! Class table for OPLang programs.
//!
//! This crate provides [`ClassTable`], the frozen per-program record of every
//! class and its attributes, methods, constructors and destructor, plus the
//! built-in I/O class and an [`InheritanceGraph`] used to reject cyclic
//! hierarchies.

pub mod class_record;
pub mod class_table;
pub mod hierarchy;
pub mod io;

pub use class_record::{
    AttributeInfo, ClassRecord, ConstructorInfo, DestructorInfo, MethodInfo, ParamSignature,
};
pub use class_table::{ClassTable, Hosted};
pub use hierarchy::InheritanceGraph;
pub use io::{IO_BINDING, IO_BUILTINS, IO_CLASS, IoBuiltin, IoTarget, io_builtin, io_class_record};
