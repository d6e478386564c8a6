//! The frozen class table.
//!
//! Built once by the registration pass, then read by the checker and the code
//! generator. Member lookups walk the class itself, then its ancestors from
//! the immediate parent upward, and report the class that actually hosts the
//! member.
//!
//! Ancestor walks keep a visited set so a malformed hierarchy can never make
//! a lookup loop; cycles themselves are rejected earlier by
//! [`InheritanceGraph`](crate::InheritanceGraph).

use oplang_core::{CompilationError, DeclKind};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::class_record::{
    AttributeInfo, ClassRecord, ConstructorInfo, MethodInfo, ParamSignature,
};

/// A member together with the class that declares it.
#[derive(Debug)]
pub struct Hosted<'a, T> {
    pub host: &'a ClassRecord,
    pub info: &'a T,
}

impl<T> Clone for Hosted<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Hosted<'_, T> {}

impl<'a, T> Hosted<'a, T> {
    pub fn host_name(&self) -> &'a str {
        &self.host.name
    }
}

/// All classes of a program plus the built-ins.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: FxHashMap<String, ClassRecord>,
    /// Registration order; user classes in declaration order, built-ins last.
    order: Vec<String>,
    entry_point: Option<String>,
}

impl ClassTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class record.
    ///
    /// Returns `Redeclared Class` if the name is already taken.
    pub fn register(&mut self, record: ClassRecord) -> Result<(), CompilationError> {
        if self.classes.contains_key(&record.name) {
            return Err(CompilationError::redeclared(
                DeclKind::Class,
                record.name.clone(),
                record.span,
            ));
        }
        self.order.push(record.name.clone());
        self.classes.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassRecord> {
        self.classes.get_mut(name)
    }

    /// Record the class hosting `static void main()`.
    pub fn set_entry_point(&mut self, class: impl Into<String>) {
        self.entry_point = Some(class.into());
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn get(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassRecord> {
        self.order.iter().filter_map(|name| self.classes.get(name))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class hosting the program entry point, if any.
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    // ==========================================================================
    // Inheritance Helpers
    // ==========================================================================

    /// The class itself followed by its ancestors, nearest first.
    ///
    /// Unknown names yield an empty chain.
    pub fn lineage(&self, name: &str) -> Vec<&ClassRecord> {
        let mut chain = Vec::new();
        let mut visited = FxHashSet::default();
        let mut current = self.classes.get(name);

        while let Some(record) = current {
            if !visited.insert(record.name.as_str()) {
                break;
            }
            chain.push(record);
            current = record.parent.as_deref().and_then(|p| self.classes.get(p));
        }

        chain
    }

    /// Ancestors of a class, immediate parent first.
    pub fn ancestors(&self, name: &str) -> Vec<&ClassRecord> {
        let mut chain = self.lineage(name);
        if !chain.is_empty() {
            chain.remove(0);
        }
        chain
    }

    /// Whether `sub` is `sup` or inherits from it.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        self.lineage(sub).iter().any(|record| record.name == sup)
    }

    // ==========================================================================
    // Member Lookup
    // ==========================================================================

    /// Find an attribute on the class or its nearest ancestor declaring it.
    pub fn lookup_attribute(&self, class: &str, name: &str) -> Option<Hosted<'_, AttributeInfo>> {
        self.lineage(class).into_iter().find_map(|host| {
            host.attributes
                .get(name)
                .map(|info| Hosted { host, info })
        })
    }

    /// Find a method on the class or its nearest ancestor declaring it.
    pub fn lookup_method(&self, class: &str, name: &str) -> Option<Hosted<'_, MethodInfo>> {
        self.lineage(class)
            .into_iter()
            .find_map(|host| host.methods.get(name).map(|info| Hosted { host, info }))
    }

    /// Constructor with exactly this parameter signature. Constructors are not
    /// inherited.
    pub fn lookup_constructor(
        &self,
        class: &str,
        signature: &ParamSignature,
    ) -> Option<&ConstructorInfo> {
        self.classes.get(class)?.constructors.get(signature)
    }

    /// Whether `name` is the built-in I/O class rather than a user class
    /// that took its name.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.classes.get(name).is_some_and(|record| record.is_builtin)
    }

    /// All constructors declared by a class.
    pub fn constructors(&self, class: &str) -> impl Iterator<Item = &ConstructorInfo> {
        self.classes
            .get(class)
            .into_iter()
            .flat_map(|record| record.constructors.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_record::MethodInfo;
    use oplang_core::{Modifiers, Span, Type};

    fn method(name: &str, is_static: bool) -> MethodInfo {
        MethodInfo {
            name: name.into(),
            return_type: Type::VOID,
            params: vec![],
            is_static,
            span: Span::default(),
        }
    }

    fn shapes() -> ClassTable {
        let mut table = ClassTable::new();

        let mut shape = ClassRecord::new("Shape", None, Span::default());
        shape.methods.insert("area".into(), method("area", false));
        shape.attributes.insert(
            "count".into(),
            AttributeInfo {
                name: "count".into(),
                ty: Type::INT,
                modifiers: Modifiers::STATIC,
                init: None,
                span: Span::default(),
            },
        );
        table.register(shape).unwrap();

        let mut square = ClassRecord::new("Square", Some("Shape".into()), Span::default());
        square.methods.insert("area".into(), method("area", false));
        table.register(square).unwrap();

        table
            .register(ClassRecord::new("Tile", Some("Square".into()), Span::default()))
            .unwrap();
        table
    }

    #[test]
    fn duplicate_class_rejected() {
        let mut table = shapes();
        let err = table
            .register(ClassRecord::new("Shape", None, Span::new(9, 1, 5)))
            .unwrap_err();
        assert_eq!(err.to_string(), "at 9:1: Redeclared Class: Shape");
    }

    #[test]
    fn lookup_prefers_nearest_host() {
        let table = shapes();
        let found = table.lookup_method("Tile", "area").unwrap();
        assert_eq!(found.host_name(), "Square");
        let found = table.lookup_attribute("Tile", "count").unwrap();
        assert_eq!(found.host_name(), "Shape");
        assert!(table.lookup_method("Shape", "perimeter").is_none());
    }

    #[test]
    fn subtyping_follows_single_chain() {
        let table = shapes();
        assert!(table.is_subtype("Tile", "Shape"));
        assert!(table.is_subtype("Square", "Square"));
        assert!(!table.is_subtype("Shape", "Square"));
        assert_eq!(
            table
                .ancestors("Tile")
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Square", "Shape"]
        );
    }

    #[test]
    fn cyclic_chain_terminates() {
        let mut table = ClassTable::new();
        table
            .register(ClassRecord::new("A", Some("B".into()), Span::default()))
            .unwrap();
        table
            .register(ClassRecord::new("B", Some("A".into()), Span::default()))
            .unwrap();
        assert_eq!(table.lineage("A").len(), 2);
        assert!(!table.is_subtype("A", "C"));
    }

    #[test]
    fn registration_order_is_kept() {
        let table = shapes();
        let names: Vec<_> = table.classes().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Shape", "Square", "Tile"]);
    }
}
