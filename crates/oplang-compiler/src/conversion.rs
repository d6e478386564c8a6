//! Assignment compatibility.
//!
//! `compatible(expected, actual)` decides whether a value of type `actual`
//! may flow into a slot of type `expected`: assignments, initializers,
//! arguments and returns all go through it.
//!
//! | expected      | actual accepted                                  |
//! |---------------|--------------------------------------------------|
//! | any           | structurally equal type                          |
//! | `float`       | `int` (widening, never the reverse)              |
//! | class `C`     | any subclass of `C`, `nil`                        |
//! | `T[n]`        | `T[n]` only, `nil`                                |
//! | `T &`         | exactly `T`                                      |
//!
//! [`Type::Error`] on either side is compatible so one failure is reported
//! once.

use oplang_core::Type;
use oplang_registry::{ClassTable, ConstructorInfo, ParamSignature};

/// Whether `actual` may be used where `expected` is required.
pub fn compatible(table: &ClassTable, expected: &Type, actual: &Type) -> bool {
    match (expected, actual) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::Reference(inner), actual) => inner.same_as(actual),
        (expected, actual) if expected.same_as(actual) => true,
        (expected, Type::Nil) => expected.is_nullable(),
        (Type::Primitive(_), _) => expected.is_float() && actual.is_int(),
        (Type::Class(sup), Type::Class(sub)) => table.is_subtype(sub, sup),
        (
            Type::Array { element: e, size: n },
            Type::Array { element: a, size: m },
        ) => n == m && e.same_as(a),
        _ => false,
    }
}

/// Whether an int value must be widened before being stored as `target`.
pub fn needs_widening(target: &Type, actual: &Type) -> bool {
    target.dereferenced().is_float() && actual.is_int()
}

/// Constructor of `class` accepting `args`.
///
/// An exact signature match wins. Otherwise the first constructor, in
/// signature order, whose parameters are all compatible with the arguments.
pub fn resolve_constructor<'t>(
    table: &'t ClassTable,
    class: &str,
    args: &[Type],
) -> Option<&'t ConstructorInfo> {
    let signature = ParamSignature::new(args.to_vec());
    if let Some(exact) = table.lookup_constructor(class, &signature) {
        return Some(exact);
    }

    let mut candidates: Vec<&ConstructorInfo> = table
        .constructors(class)
        .filter(|ctor| {
            ctor.signature.len() == args.len()
                && ctor
                    .signature
                    .types()
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| compatible(table, param, arg))
        })
        .collect();
    candidates.sort_by_cached_key(|ctor| ctor.signature.to_string());
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oplang_core::Span;
    use oplang_registry::ClassRecord;

    fn table() -> ClassTable {
        let mut table = ClassTable::new();
        table.register(ClassRecord::new("A", None, Span::default())).unwrap();
        table
            .register(ClassRecord::new("B", Some("A".into()), Span::default()))
            .unwrap();
        table
    }

    #[test]
    fn widening_is_one_directional() {
        let t = table();
        assert!(compatible(&t, &Type::FLOAT, &Type::INT));
        assert!(!compatible(&t, &Type::INT, &Type::FLOAT));
        assert!(compatible(&t, &Type::INT, &Type::INT));
        assert!(!compatible(&t, &Type::STRING, &Type::INT));
    }

    #[test]
    fn subclass_flows_to_superclass() {
        let t = table();
        assert!(compatible(&t, &Type::class("A"), &Type::class("B")));
        assert!(!compatible(&t, &Type::class("B"), &Type::class("A")));
    }

    #[test]
    fn arrays_need_identical_shape() {
        let t = table();
        let a3 = Type::array(Type::INT, 3);
        assert!(compatible(&t, &a3, &Type::array(Type::INT, 3)));
        assert!(!compatible(&t, &a3, &Type::array(Type::INT, 4)));
        assert!(!compatible(&t, &Type::array(Type::FLOAT, 3), &a3));
    }

    #[test]
    fn nil_only_for_references() {
        let t = table();
        assert!(compatible(&t, &Type::class("A"), &Type::Nil));
        assert!(compatible(&t, &Type::array(Type::INT, 2), &Type::Nil));
        assert!(!compatible(&t, &Type::INT, &Type::Nil));
        assert!(!compatible(&t, &Type::STRING, &Type::Nil));
    }

    #[test]
    fn reference_requires_exact_type() {
        let t = table();
        let r = Type::reference(Type::FLOAT);
        assert!(compatible(&t, &r, &Type::FLOAT));
        assert!(!compatible(&t, &r, &Type::INT));
    }

    #[test]
    fn constructor_resolution() {
        let mut t = table();
        let record = t.get_mut("A").unwrap();
        for sig in [vec![Type::FLOAT], vec![Type::INT, Type::STRING]] {
            let signature = ParamSignature::new(sig);
            record.constructors.insert(
                signature.clone(),
                ConstructorInfo {
                    signature,
                    span: Span::default(),
                },
            );
        }
        let exact = resolve_constructor(&t, "A", &[Type::INT, Type::STRING]).unwrap();
        assert_eq!(exact.signature.len(), 2);
        let widened = resolve_constructor(&t, "A", &[Type::INT]).unwrap();
        assert_eq!(widened.signature.types(), &[Type::FLOAT]);
        assert!(resolve_constructor(&t, "A", &[Type::STRING]).is_none());
        assert!(resolve_constructor(&t, "Missing", &[]).is_none());
    }

    #[test]
    fn error_absorbs() {
        let t = table();
        assert!(compatible(&t, &Type::INT, &Type::Error));
        assert!(compatible(&t, &Type::Error, &Type::STRING));
    }
}
