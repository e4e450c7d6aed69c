use super::*;
use crate::errors::EvalErrorKind;

fn binary(left: impl Into<Value>, op: BinaryOp, right: impl Into<Value>) -> EvalResult {
    evaluate_binary(&left.into(), &right.into(), op)
}

#[test]
fn int_arithmetic() {
    assert_eq!(binary(1, BinaryOp::Add, 1), Ok(Value::Int(2)));
    assert_eq!(binary(7, BinaryOp::Sub, 10), Ok(Value::Int(-3)));
    assert_eq!(binary(6, BinaryOp::Mul, 7), Ok(Value::Int(42)));
    assert_eq!(binary(7, BinaryOp::Mod, 3), Ok(Value::Int(1)));
}

#[test]
fn division_is_exact_or_float() {
    assert_eq!(binary(6, BinaryOp::Div, 3), Ok(Value::Int(2)));
    assert_eq!(binary(7, BinaryOp::Div, 2), Ok(Value::Float(3.5)));
}

#[test]
fn division_by_zero_is_error() {
    let err = binary(1, BinaryOp::Div, 0).err().map(|e| e.kind);
    assert_eq!(err, Some(EvalErrorKind::DivisionByZero));
    let err = binary(1.5, BinaryOp::Div, 0.0).err().map(|e| e.kind);
    assert_eq!(err, Some(EvalErrorKind::DivisionByZero));
    let err = binary(1, BinaryOp::Mod, 0).err().map(|e| e.kind);
    assert_eq!(err, Some(EvalErrorKind::ModuloByZero));
}

#[test]
fn overflow_is_error() {
    let err = binary(i64::MAX, BinaryOp::Add, 1).err().map(|e| e.kind);
    assert_eq!(
        err,
        Some(EvalErrorKind::IntegerOverflow {
            operation: "addition"
        })
    );
    assert!(binary(i64::MIN, BinaryOp::Div, -1).is_err());
}

#[test]
fn numeric_strings_coerce() {
    assert_eq!(binary("2", BinaryOp::Add, 3), Ok(Value::Int(5)));
    assert_eq!(binary("1.5", BinaryOp::Mul, 2), Ok(Value::Float(3.0)));
    assert!(binary("abc", BinaryOp::Add, 1).is_err());
}

#[test]
fn concat_uses_text_forms() {
    assert_eq!(binary("n=", BinaryOp::Concat, 2.0), Ok(Value::from("n=2")));
    assert_eq!(binary(true, BinaryOp::Concat, Value::Null), Ok(Value::from("1")));
}

#[test]
fn comparisons() {
    assert_eq!(binary(1, BinaryOp::Eq, "1"), Ok(Value::Bool(true)));
    assert_eq!(binary(1, BinaryOp::Identical, "1"), Ok(Value::Bool(false)));
    assert_eq!(binary(2, BinaryOp::LtEq, 2), Ok(Value::Bool(true)));
    assert_eq!(binary("b", BinaryOp::Gt, "a"), Ok(Value::Bool(true)));
}

#[test]
fn list_union_keeps_left_entries() {
    let left = Value::list(vec![Value::Int(1)]);
    let right = Value::list(vec![Value::Int(9), Value::Int(2)]);
    assert_eq!(
        evaluate_binary(&left, &right, BinaryOp::Add),
        Ok(Value::list(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn unary_ops() {
    assert_eq!(evaluate_unary(&Value::Int(3), UnaryOp::Neg), Ok(Value::Int(-3)));
    assert_eq!(evaluate_unary(&Value::from(""), UnaryOp::Not), Ok(Value::Bool(true)));
    assert_eq!(evaluate_unary(&Value::from("4"), UnaryOp::Plus), Ok(Value::Int(4)));
    assert!(evaluate_unary(&Value::Int(i64::MIN), UnaryOp::Neg).is_err());
}
