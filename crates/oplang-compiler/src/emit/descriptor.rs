//! Type descriptors and instruction-family selection.
//!
//! ```text
//! int      I                    boolean  Z
//! float    F                    void     V
//! string   Ljava/lang/String;   A        LA;
//! int[3]   [I                   A[2]     [LA;
//! ```
//!
//! Array sizes are not part of a descriptor. A by-reference type has the
//! descriptor of the type it refers to.

use oplang_core::{PrimitiveKind, Type};

pub const STRING_CLASS: &str = "java/lang/String";
pub const OBJECT_CLASS: &str = "java/lang/Object";

/// Field or parameter descriptor of a type.
pub fn descriptor(ty: &Type) -> String {
    match ty {
        Type::Primitive(kind) => match kind {
            PrimitiveKind::Int => "I".to_string(),
            PrimitiveKind::Float => "F".to_string(),
            PrimitiveKind::Bool => "Z".to_string(),
            PrimitiveKind::String => format!("L{STRING_CLASS};"),
            PrimitiveKind::Void => "V".to_string(),
        },
        Type::Array { element, .. } => format!("[{}", descriptor(element)),
        Type::Class(name) => format!("L{name};"),
        Type::Reference(inner) => descriptor(inner),
        Type::Nil | Type::Error => format!("L{OBJECT_CLASS};"),
    }
}

/// Method descriptor, `(params)ret`.
pub fn method_descriptor(params: &[Type], ret: &Type) -> String {
    let mut out = String::from("(");
    for param in params {
        out.push_str(&descriptor(param));
    }
    out.push(')');
    out.push_str(&descriptor(ret));
    out
}

/// The instruction family a value of this type uses for loads, stores and
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `int` and `boolean`.
    Int,
    Float,
    /// Strings, objects and arrays.
    Reference,
}

impl ValueKind {
    pub fn of(ty: &Type) -> Self {
        match ty.dereferenced() {
            Type::Primitive(PrimitiveKind::Int | PrimitiveKind::Bool) => ValueKind::Int,
            Type::Primitive(PrimitiveKind::Float) => ValueKind::Float,
            _ => ValueKind::Reference,
        }
    }

    /// Instruction prefix: `i`, `f` or `a`.
    pub fn prefix(self) -> char {
        match self {
            ValueKind::Int => 'i',
            ValueKind::Float => 'f',
            ValueKind::Reference => 'a',
        }
    }
}

/// Array element load/store prefix. Booleans are stored as bytes.
pub fn array_prefix(element: &Type) -> char {
    match element.dereferenced() {
        Type::Primitive(PrimitiveKind::Bool) => 'b',
        other => ValueKind::of(other).prefix(),
    }
}

/// Operand of the array allocation instruction for an element type:
/// `newarray int` for primitives, `anewarray java/lang/String` otherwise.
pub fn new_array_instruction(element: &Type) -> String {
    match element.dereferenced() {
        Type::Primitive(PrimitiveKind::Int) => "newarray int".to_string(),
        Type::Primitive(PrimitiveKind::Float) => "newarray float".to_string(),
        Type::Primitive(PrimitiveKind::Bool) => "newarray boolean".to_string(),
        Type::Primitive(PrimitiveKind::String) => format!("anewarray {STRING_CLASS}"),
        Type::Class(name) => format!("anewarray {name}"),
        Type::Array { .. } => format!("anewarray {}", descriptor(element)),
        // An empty array literal has no element type of its own.
        _ => "newarray int".to_string(),
    }
}

/// Quote a string literal for `ldc`.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_descriptors() {
        assert_eq!(descriptor(&Type::INT), "I");
        assert_eq!(descriptor(&Type::BOOL), "Z");
        assert_eq!(descriptor(&Type::STRING), "Ljava/lang/String;");
        assert_eq!(descriptor(&Type::reference(Type::FLOAT)), "F");
    }

    #[test]
    fn array_descriptor_drops_size() {
        assert_eq!(descriptor(&Type::array(Type::INT, 3)), "[I");
        assert_eq!(
            descriptor(&Type::array(Type::array(Type::class("A"), 2), 4)),
            "[[LA;"
        );
    }

    #[test]
    fn method_descriptors() {
        assert_eq!(method_descriptor(&[], &Type::VOID), "()V");
        assert_eq!(
            method_descriptor(&[Type::FLOAT, Type::class("Shape")], &Type::STRING),
            "(FLShape;)Ljava/lang/String;"
        );
    }

    #[test]
    fn instruction_families() {
        assert_eq!(ValueKind::of(&Type::BOOL).prefix(), 'i');
        assert_eq!(ValueKind::of(&Type::array(Type::INT, 1)).prefix(), 'a');
        assert_eq!(array_prefix(&Type::BOOL), 'b');
        assert_eq!(array_prefix(&Type::STRING), 'a');
        assert_eq!(new_array_instruction(&Type::FLOAT), "newarray float");
        assert_eq!(new_array_instruction(&Type::class("A")), "anewarray A");
        assert_eq!(new_array_instruction(&Type::array(Type::INT, 2)), "anewarray [I");
    }

    #[test]
    fn quoting() {
        assert_eq!(quote("hi"), "\"hi\"");
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }
}
