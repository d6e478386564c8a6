//! Type model shared by every pass.
//!
//! A [`Type`] is what declarations carry and what the checker produces for
//! every expression. Two members have no source syntax:
//!
//! - [`Type::Nil`]: the type of the `nil` literal, compatible with any class
//!   or array type.
//! - [`Type::Error`]: the sentinel substituted for a locally tolerated failure.
//!   It is compatible with everything so one mistake is reported once.
//!
//! # Example
//!
//! ```
//! use oplang_core::Type;
//!
//! let grid = Type::array(Type::INT, 3);
//! assert_eq!(grid.to_string(), "int[3]");
//! assert!(!grid.same_as(&Type::array(Type::INT, 4)));
//! ```

use std::fmt::{self, Display, Formatter};

use bitflags::bitflags;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Float,
    Bool,
    String,
    /// Only valid as a routine return type.
    Void,
}

impl PrimitiveKind {
    /// Source spelling of the primitive.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::String => "string",
            PrimitiveKind::Void => "void",
        }
    }
}

/// A complete type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    /// Fixed-size array. The size is part of the identity.
    Array { element: Box<Type>, size: u32 },
    /// A user-declared (or built-in) class, by name.
    Class(String),
    /// A by-reference parameter or variable type (`T &`).
    Reference(Box<Type>),
    /// Type of the `nil` literal.
    Nil,
    /// Absorbing sentinel for expressions that already failed.
    Error,
}

impl Type {
    pub const INT: Type = Type::Primitive(PrimitiveKind::Int);
    pub const FLOAT: Type = Type::Primitive(PrimitiveKind::Float);
    pub const BOOL: Type = Type::Primitive(PrimitiveKind::Bool);
    pub const STRING: Type = Type::Primitive(PrimitiveKind::String);
    pub const VOID: Type = Type::Primitive(PrimitiveKind::Void);

    /// Create a class type.
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }

    /// Create a fixed-size array type.
    pub fn array(element: Type, size: u32) -> Self {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    /// Create a reference type.
    pub fn reference(inner: Type) -> Self {
        Type::Reference(Box::new(inner))
    }

    /// Structural equality where [`Type::Error`] equals nothing, itself included.
    pub fn same_as(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Error, _) | (_, Type::Error) => false,
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Class(a), Type::Class(b)) => a == b,
            (
                Type::Array { element: a, size: n },
                Type::Array { element: b, size: m },
            ) => n == m && a.same_as(b),
            (Type::Reference(a), Type::Reference(b)) => a.same_as(b),
            (Type::Nil, Type::Nil) => true,
            _ => false,
        }
    }

    /// Strip one level of [`Type::Reference`].
    pub fn dereferenced(&self) -> &Type {
        match self {
            Type::Reference(inner) => inner,
            other => other,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Int))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Float))
    }

    /// Int or float.
    pub fn is_numeric(&self) -> bool {
        self.is_int() || self.is_float()
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Bool))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::String))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Void))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Type::Class(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Type::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Class or array: the types `nil` may stand in for.
    pub fn is_nullable(&self) -> bool {
        self.is_class() || self.is_array()
    }

    /// Class name when this is a class type.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Element type when this is an array type.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => f.write_str(kind.name()),
            Type::Array { element, size } => write!(f, "{element}[{size}]"),
            Type::Class(name) => f.write_str(name),
            Type::Reference(inner) => write!(f, "{inner} &"),
            Type::Nil => f.write_str("nil"),
            Type::Error => f.write_str("<error>"),
        }
    }
}

bitflags! {
    /// Declaration modifiers on attributes, methods and variables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const STATIC = 1 << 0;
        const FINAL = 1 << 1;
    }
}

impl Modifiers {
    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_differ_by_size() {
        let a = Type::array(Type::INT, 3);
        assert!(a.same_as(&Type::array(Type::INT, 3)));
        assert!(!a.same_as(&Type::array(Type::INT, 5)));
        assert!(!a.same_as(&Type::array(Type::FLOAT, 3)));
    }

    #[test]
    fn error_equals_nothing() {
        assert!(!Type::Error.same_as(&Type::Error));
        assert!(!Type::INT.same_as(&Type::Error));
    }

    #[test]
    fn display_names() {
        assert_eq!(Type::BOOL.to_string(), "boolean");
        assert_eq!(Type::class("Shape").to_string(), "Shape");
        assert_eq!(Type::array(Type::STRING, 2).to_string(), "string[2]");
        assert_eq!(Type::reference(Type::INT).to_string(), "int &");
    }

    #[test]
    fn dereferenced_strips_one_level() {
        let r = Type::reference(Type::FLOAT);
        assert_eq!(r.dereferenced(), &Type::FLOAT);
        assert_eq!(Type::INT.dereferenced(), &Type::INT);
    }

    #[test]
    fn nullable_types() {
        assert!(Type::class("A").is_nullable());
        assert!(Type::array(Type::INT, 1).is_nullable());
        assert!(!Type::STRING.is_nullable());
    }

    #[test]
    fn modifiers_flags() {
        let m = Modifiers::STATIC | Modifiers::FINAL;
        assert!(m.is_static());
        assert!(m.is_final());
        assert!(!Modifiers::empty().is_final());
    }
}
