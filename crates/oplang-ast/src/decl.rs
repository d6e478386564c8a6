//! Declaration nodes: program, classes and class members.

use std::fmt::{self, Display, Formatter};

use oplang_core::{Modifiers, Span, Type};

use crate::expr::Expr;
use crate::stmt::Block;

/// A complete program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub span: Span,
}

/// `class Name [extends Parent] { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Attribute(a) => Some(a),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Constructor(c) => Some(c),
            _ => None,
        })
    }

    pub fn destructor(&self) -> Option<&DestructorDecl> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Destructor(d) => Some(d),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Attribute(AttributeDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Destructor(DestructorDecl),
}

impl ClassMember {
    pub fn span(&self) -> Span {
        match self {
            Self::Attribute(a) => a.span,
            Self::Method(m) => m.span,
            Self::Constructor(c) => c.span,
            Self::Destructor(d) => d.span,
        }
    }
}

/// `[static] [final] T a := e, b;`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub modifiers: Modifiers,
    pub ty: Type,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

/// One declarator of an [`AttributeDecl`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `[static] RetType name(params) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub is_static: bool,
    pub return_type: Type,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

impl MethodDecl {
    /// `static void main()`
    pub fn is_entry_point(&self) -> bool {
        self.is_static
            && self.name == "main"
            && self.params.is_empty()
            && self.return_type.is_void()
    }
}

/// `Name(params) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// `~Name() { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct DestructorDecl {
    pub name: String,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            span: Span::default(),
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.init {
            Some(init) => write!(f, "{} := {}", self.name, init),
            None => f.write_str(&self.name),
        }
    }
}

impl Display for AttributeDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_static() {
            f.write_str("static ")?;
        }
        if self.modifiers.is_final() {
            f.write_str("final ")?;
        }
        write!(f, "{} ", self.ty)?;
        crate::expr::write_list(f, &self.attributes)
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

impl Display for MethodDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(f, "{} {}(", self.return_type, self.name)?;
        crate::expr::write_list(f, &self.params)?;
        f.write_str(")")
    }
}

impl Display for ConstructorDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        crate::expr::write_list(f, &self.params)?;
        f.write_str(")")
    }
}

impl Display for DestructorDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "~{}()", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_point_shape() {
        let main = MethodDecl::new(true, Type::VOID, "main", vec![], Block::default());
        assert!(main.is_entry_point());
        let with_param = MethodDecl::new(
            true,
            Type::VOID,
            "main",
            vec![Param::new("n", Type::INT)],
            Block::default(),
        );
        assert!(!with_param.is_entry_point());
        let instance = MethodDecl::new(false, Type::VOID, "main", vec![], Block::default());
        assert!(!instance.is_entry_point());
    }

    #[test]
    fn member_views() {
        let class = ClassDecl::new("Shape", None)
            .with_member(ClassMember::Attribute(AttributeDecl::new(
                Modifiers::empty(),
                Type::FLOAT,
                vec![Attribute::new("w", None)],
            )))
            .with_member(ClassMember::Constructor(ConstructorDecl::new(
                "Shape",
                vec![],
                Block::default(),
            )))
            .with_member(ClassMember::Destructor(DestructorDecl::new(
                "Shape",
                Block::default(),
            )));
        assert_eq!(class.attributes().count(), 1);
        assert_eq!(class.methods().count(), 0);
        assert_eq!(class.constructors().count(), 1);
        assert!(class.destructor().is_some());
    }

    #[test]
    fn renders_signatures() {
        let m = MethodDecl::new(
            false,
            Type::FLOAT,
            "scale",
            vec![Param::new("k", Type::FLOAT), Param::new("v", Type::reference(Type::INT))],
            Block::default(),
        );
        assert_eq!(m.to_string(), "float scale(float k, int & v)");
        assert_eq!(DestructorDecl::new("A", Block::default()).to_string(), "~A()");
        let attr = AttributeDecl::new(
            Modifiers::STATIC | Modifiers::FINAL,
            Type::INT,
            vec![Attribute::new("MAX", Some(Expr::int(10))), Attribute::new("MIN", None)],
        );
        assert_eq!(attr.to_string(), "static final int MAX := 10, MIN");
    }
}
