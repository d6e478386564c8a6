//! Per-class member records.
//!
//! A [`ClassRecord`] is created by the registration pass and never mutated
//! once the [`ClassTable`](crate::ClassTable) is frozen.

use oplang_ast::Expr;
use oplang_core::{Modifiers, Span, Type};
use rustc_hash::FxHashMap;

/// Parameter-type tuple identifying a constructor overload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParamSignature(pub Vec<Type>);

impl ParamSignature {
    pub fn new(types: Vec<Type>) -> Self {
        Self(types)
    }

    pub fn types(&self) -> &[Type] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ParamSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// An attribute (field) of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
    pub init: Option<Expr>,
    pub span: Span,
}

impl AttributeInfo {
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.is_final()
    }
}

/// A method. Methods are not overloaded: the name is the key.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Type>,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorInfo {
    pub signature: ParamSignature,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestructorInfo {
    pub span: Span,
}

/// Everything the checker and code generator need to know about one class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassRecord {
    pub name: String,
    pub parent: Option<String>,
    pub attributes: FxHashMap<String, AttributeInfo>,
    pub methods: FxHashMap<String, MethodInfo>,
    pub constructors: FxHashMap<ParamSignature, ConstructorInfo>,
    pub destructor: Option<DestructorInfo>,
    pub span: Span,
    /// Registered by the compiler rather than declared in source.
    pub is_builtin: bool,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>, parent: Option<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            parent,
            span,
            ..Self::default()
        }
    }

    /// Whether a zero-argument `new C()` is allowed.
    pub fn has_default_constructor(&self) -> bool {
        self.constructors.is_empty() || self.constructors.contains_key(&ParamSignature::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constructor_rules() {
        let mut record = ClassRecord::new("Point", None, Span::default());
        assert!(record.has_default_constructor());

        let sig = ParamSignature::new(vec![Type::INT, Type::INT]);
        record.constructors.insert(
            sig.clone(),
            ConstructorInfo {
                signature: sig,
                span: Span::default(),
            },
        );
        assert!(!record.has_default_constructor());

        record.constructors.insert(
            ParamSignature::default(),
            ConstructorInfo {
                signature: ParamSignature::default(),
                span: Span::default(),
            },
        );
        assert!(record.has_default_constructor());
    }

    #[test]
    fn signature_display() {
        let sig = ParamSignature::new(vec![Type::FLOAT, Type::class("A")]);
        assert_eq!(sig.to_string(), "(float, A)");
    }
}
