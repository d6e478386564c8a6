//! Checker context.
//!
//! [`CheckContext`] carries everything the static checker needs besides the
//! node being visited: the frozen class table, the scope stack, the class and
//! routine being checked, loop depth and the attribute whose initializer is
//! being checked. It is passed explicitly rather than kept as ambient state,
//! so checking one class never observes another's state.

use oplang_core::Type;
use oplang_registry::{AttributeInfo, ClassTable, Hosted};

use crate::scope::{ScopeEntry, ScopeStack};

/// The kind of routine whose body is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Method,
    Constructor,
    Destructor,
    /// Initializer expression of an attribute.
    AttributeInit,
}

/// The routine whose body is being checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineContext {
    pub kind: RoutineKind,
    /// Declared return type; constructors return their class, destructors
    /// `void`.
    pub return_type: Type,
    pub is_static: bool,
}

/// What a bare identifier refers to.
#[derive(Debug, Clone)]
pub enum NameRef<'t> {
    /// A class name used as a static access marker.
    Class(&'t str),
    /// A local, parameter or pre-seeded binding.
    Scoped(ScopeEntry),
    /// An attribute of the current class or an ancestor.
    Attribute(Hosted<'t, AttributeInfo>),
}

/// State threaded through every check call.
pub struct CheckContext<'t> {
    pub table: &'t ClassTable,
    pub scopes: ScopeStack,
    pub current_class: Option<String>,
    pub routine: Option<RoutineContext>,
    pub loop_depth: u32,
    /// Attribute whose initializer is being checked; it is not visible to
    /// itself.
    pub initializing_attr: Option<String>,
}

impl<'t> CheckContext<'t> {
    pub fn new(table: &'t ClassTable) -> Self {
        Self {
            table,
            scopes: ScopeStack::new(),
            current_class: None,
            routine: None,
            loop_depth: 0,
            initializing_attr: None,
        }
    }

    pub fn enter_routine(&mut self, kind: RoutineKind, return_type: Type, is_static: bool) {
        self.routine = Some(RoutineContext {
            kind,
            return_type,
            is_static,
        });
        self.loop_depth = 0;
    }

    pub fn exit_routine(&mut self) {
        self.routine = None;
    }

    /// Whether `this` and instance attributes are unavailable.
    pub fn in_static_context(&self) -> bool {
        self.routine.as_ref().is_some_and(|r| r.is_static)
    }

    /// Attribute lookup on `class` and its ancestors, hiding the attribute of
    /// the current class whose initializer is being checked.
    pub fn lookup_attribute(&self, class: &str, name: &str) -> Option<Hosted<'t, AttributeInfo>> {
        if self.current_class.as_deref() == Some(class)
            && self.initializing_attr.as_deref() == Some(name)
        {
            return None;
        }
        self.table.lookup_attribute(class, name)
    }

    /// Resolve a bare identifier: class names first, then scopes innermost
    /// to outermost, then attributes of the current class.
    ///
    /// Instance attributes are not reachable from a static context.
    pub fn resolve_name(&self, name: &str) -> Option<NameRef<'t>> {
        if let Some(record) = self.table.get(name) {
            return Some(NameRef::Class(&record.name));
        }
        if let Some(entry) = self.scopes.lookup(name) {
            return Some(NameRef::Scoped(entry.clone()));
        }
        let class = self.current_class.as_deref()?;
        let found = self.lookup_attribute(class, name)?;
        if self.in_static_context() && !found.info.is_static() {
            return None;
        }
        Some(NameRef::Attribute(found))
    }

    /// Whether a name resolves to something declared `final`.
    pub fn is_final_name(&self, name: &str) -> bool {
        if let Some(entry) = self.scopes.lookup(name) {
            return entry.is_final;
        }
        self.current_class
            .as_deref()
            .and_then(|class| self.lookup_attribute(class, name))
            .is_some_and(|found| found.info.is_final())
    }

    /// Whether `this.name` is a `final` attribute of the current class.
    pub fn is_final_attribute(&self, name: &str) -> bool {
        self.current_class
            .as_deref()
            .and_then(|class| self.lookup_attribute(class, name))
            .is_some_and(|found| found.info.is_final())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oplang_ast::{Attribute, AttributeDecl, ClassDecl, Program};
    use oplang_core::{Modifiers, Span};

    use crate::passes::ClassTableBuilder;

    fn table() -> ClassTable {
        let shape = ClassDecl::new("Shape", None)
            .with_attribute(AttributeDecl::new(
                Modifiers::empty(),
                Type::FLOAT,
                vec![Attribute::new("length", None)],
            ))
            .with_attribute(AttributeDecl::new(
                Modifiers::STATIC | Modifiers::FINAL,
                Type::INT,
                vec![Attribute::new("SIDES", None)],
            ));
        ClassTableBuilder::new()
            .build(&Program::new(vec![shape]))
            .unwrap()
    }

    fn entry(ty: Type, is_final: bool) -> ScopeEntry {
        ScopeEntry {
            ty,
            is_final,
            span: Span::default(),
        }
    }

    #[test]
    fn class_names_win_over_scopes() {
        let table = table();
        let mut ctx = CheckContext::new(&table);
        ctx.scopes.push();
        ctx.scopes.bind("Shape", entry(Type::INT, false));
        assert!(matches!(ctx.resolve_name("Shape"), Some(NameRef::Class("Shape"))));
    }

    #[test]
    fn scopes_shadow_attributes() {
        let table = table();
        let mut ctx = CheckContext::new(&table);
        ctx.current_class = Some("Shape".into());
        assert!(matches!(ctx.resolve_name("length"), Some(NameRef::Attribute(_))));

        ctx.scopes.push();
        ctx.scopes.bind("length", entry(Type::STRING, true));
        match ctx.resolve_name("length") {
            Some(NameRef::Scoped(found)) => assert!(found.ty.is_string()),
            other => panic!("expected a scoped name, got {other:?}"),
        }
        assert!(ctx.is_final_name("length"));
        assert!(!ctx.is_final_attribute("length"));
    }

    #[test]
    fn static_context_hides_instance_attributes() {
        let table = table();
        let mut ctx = CheckContext::new(&table);
        ctx.current_class = Some("Shape".into());
        ctx.enter_routine(RoutineKind::Method, Type::VOID, true);
        assert!(ctx.in_static_context());
        assert!(ctx.resolve_name("length").is_none());
        assert!(ctx.resolve_name("SIDES").is_some());

        ctx.exit_routine();
        assert!(!ctx.in_static_context());
        assert!(ctx.resolve_name("length").is_some());
    }

    #[test]
    fn initializing_attribute_is_invisible() {
        let table = table();
        let mut ctx = CheckContext::new(&table);
        ctx.current_class = Some("Shape".into());
        ctx.initializing_attr = Some("SIDES".into());
        assert!(ctx.lookup_attribute("Shape", "SIDES").is_none());
        assert!(!ctx.is_final_name("SIDES"));
        assert!(ctx.lookup_attribute("Shape", "length").is_some());
    }

    #[test]
    fn entering_a_routine_resets_loop_depth() {
        let table = table();
        let mut ctx = CheckContext::new(&table);
        ctx.loop_depth = 2;
        ctx.enter_routine(RoutineKind::Constructor, Type::class("Shape"), false);
        assert_eq!(ctx.loop_depth, 0);
        assert_eq!(ctx.routine.as_ref().map(|r| r.kind), Some(RoutineKind::Constructor));
    }
}
