//! Operator result typing.
//!
//! Shared by the checker, which reports `None` as a type mismatch, and the
//! code generator, which uses the result type to pick instructions.

use oplang_ast::{BinaryOp, UnaryOp};
use oplang_core::Type;

/// Result type of `left op right`, or `None` when the operands are not
/// accepted. Either operand being [`Type::Error`] yields `Some(Type::Error)`.
pub fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    if left.is_error() || right.is_error() {
        return Some(Type::Error);
    }

    let numeric = left.is_numeric() && right.is_numeric();
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::IntDiv | BinaryOp::Mod => {
            if left.is_int() && right.is_int() {
                Some(Type::INT)
            } else if numeric {
                Some(Type::FLOAT)
            } else {
                None
            }
        }
        BinaryOp::Div => numeric.then_some(Type::FLOAT),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            numeric.then_some(Type::BOOL)
        }
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let accepted = (left.is_int() && right.is_int())
                || (left.is_bool() && right.is_bool())
                || nil_comparison(left, right);
            accepted.then_some(Type::BOOL)
        }
        BinaryOp::And | BinaryOp::Or => (left.is_bool() && right.is_bool()).then_some(Type::BOOL),
        BinaryOp::Concat => (left.is_string() && right.is_string()).then_some(Type::STRING),
    }
}

/// `nil` on one side and a class or array (or `nil`) on the other.
fn nil_comparison(left: &Type, right: &Type) -> bool {
    let reference = |t: &Type| t.is_nullable() || t.is_nil();
    (left.is_nil() || right.is_nil()) && reference(left) && reference(right)
}

/// Result type of `op operand`.
pub fn unary_result(op: UnaryOp, operand: &Type) -> Option<Type> {
    if operand.is_error() {
        return Some(Type::Error);
    }
    match op {
        UnaryOp::Plus | UnaryOp::Neg => operand.is_numeric().then(|| operand.clone()),
        UnaryOp::Not => operand.is_bool().then_some(Type::BOOL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_operators_differ() {
        assert_eq!(binary_result(BinaryOp::IntDiv, &Type::INT, &Type::INT), Some(Type::INT));
        assert_eq!(binary_result(BinaryOp::Div, &Type::INT, &Type::INT), Some(Type::FLOAT));
        assert_eq!(
            binary_result(BinaryOp::IntDiv, &Type::INT, &Type::FLOAT),
            Some(Type::FLOAT)
        );
    }

    #[test]
    fn arithmetic_mixing() {
        assert_eq!(binary_result(BinaryOp::Add, &Type::INT, &Type::INT), Some(Type::INT));
        assert_eq!(binary_result(BinaryOp::Mul, &Type::FLOAT, &Type::INT), Some(Type::FLOAT));
        assert_eq!(binary_result(BinaryOp::Add, &Type::STRING, &Type::STRING), None);
        assert_eq!(binary_result(BinaryOp::Mod, &Type::BOOL, &Type::INT), None);
    }

    #[test]
    fn equality_rules() {
        assert_eq!(binary_result(BinaryOp::Equal, &Type::INT, &Type::INT), Some(Type::BOOL));
        assert_eq!(binary_result(BinaryOp::NotEqual, &Type::BOOL, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(binary_result(BinaryOp::Equal, &Type::FLOAT, &Type::FLOAT), None);
        assert_eq!(binary_result(BinaryOp::Equal, &Type::INT, &Type::FLOAT), None);
        assert_eq!(
            binary_result(BinaryOp::Equal, &Type::class("A"), &Type::Nil),
            Some(Type::BOOL)
        );
        assert_eq!(binary_result(BinaryOp::Equal, &Type::STRING, &Type::Nil), None);
        assert_eq!(binary_result(BinaryOp::Equal, &Type::class("A"), &Type::class("A")), None);
    }

    #[test]
    fn logical_and_concat() {
        assert_eq!(binary_result(BinaryOp::And, &Type::BOOL, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(binary_result(BinaryOp::Or, &Type::INT, &Type::BOOL), None);
        assert_eq!(
            binary_result(BinaryOp::Concat, &Type::STRING, &Type::STRING),
            Some(Type::STRING)
        );
        assert_eq!(binary_result(BinaryOp::Concat, &Type::STRING, &Type::INT), None);
        assert_eq!(binary_result(BinaryOp::Less, &Type::INT, &Type::FLOAT), Some(Type::BOOL));
    }

    #[test]
    fn unary_rules() {
        assert_eq!(unary_result(UnaryOp::Neg, &Type::FLOAT), Some(Type::FLOAT));
        assert_eq!(unary_result(UnaryOp::Plus, &Type::BOOL), None);
        assert_eq!(unary_result(UnaryOp::Not, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(unary_result(UnaryOp::Not, &Type::INT), None);
    }

    #[test]
    fn error_operands_propagate() {
        assert_eq!(binary_result(BinaryOp::Add, &Type::Error, &Type::BOOL), Some(Type::Error));
        assert_eq!(unary_result(UnaryOp::Neg, &Type::Error), Some(Type::Error));
    }
}
