//! Operator implementations.
//!
//! Direct enum dispatch over the fixed value set. Short-circuiting operators
//! (`&&`, `||`, `??`) are handled by the interpreter before operands are
//! evaluated; they still have eager definitions here so the function is
//! total.

use std::cmp::Ordering;
use std::rc::Rc;

use slate_ir::{BinaryOp, UnaryOp};

use crate::errors::{
    binary_type_mismatch, division_by_zero, integer_overflow, modulo_by_zero, EvalResult,
};
use crate::value::{Number, Value};

/// Checked integer operation where the only failure is overflow.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Evaluate a binary operation on two already-evaluated operands.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(left, right, op)
        }
        BinaryOp::Concat => {
            let mut text = left.to_text()?.into_owned();
            text.push_str(&right.to_text()?);
            Ok(Value::Str(text))
        }
        BinaryOp::Eq => Ok(Value::Bool(left.loose_eq(right))),
        BinaryOp::NotEq => Ok(Value::Bool(!left.loose_eq(right))),
        BinaryOp::Identical => Ok(Value::Bool(left.strict_eq(right))),
        BinaryOp::NotIdentical => Ok(Value::Bool(!left.strict_eq(right))),
        BinaryOp::Lt => Ok(Value::Bool(left.compare(right) == Some(Ordering::Less))),
        BinaryOp::LtEq => Ok(Value::Bool(matches!(
            left.compare(right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOp::Gt => Ok(Value::Bool(left.compare(right) == Some(Ordering::Greater))),
        BinaryOp::GtEq => Ok(Value::Bool(matches!(
            left.compare(right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinaryOp::Coalesce => Ok(if left.is_null() {
            right.clone()
        } else {
            left.clone()
        }),
    }
}

fn arithmetic(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    if op == BinaryOp::Add {
        if let Some(union) = collection_union(left, right) {
            return Ok(union);
        }
    }

    let (Some(a), Some(b)) = (left.to_number(), right.to_number()) else {
        return Err(binary_type_mismatch(left.type_name(), op, right.type_name()));
    };

    if op == BinaryOp::Mod {
        // `%` always works on integers.
        let (a, b) = (Value::from(a).to_int(), Value::from(b).to_int());
        if b == 0 {
            return Err(modulo_by_zero());
        }
        return checked_arith(a.checked_rem(b), "remainder");
    }

    match (a, b) {
        (Number::Int(a), Number::Int(b)) => eval_int(a, b, op),
        _ => eval_float(a.as_f64(), b.as_f64(), op),
    }
}

fn eval_int(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            match a.checked_rem(b) {
                Some(0) => checked_arith(a.checked_div(b), "division"),
                Some(_) => eval_float(Number::Int(a).as_f64(), Number::Int(b).as_f64(), op),
                None => Err(integer_overflow("division")),
            }
        }
        _ => Err(binary_type_mismatch("int", op, "int")),
    }
}

fn eval_float(a: f64, b: f64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => {
            if b == 0.0 {
                Err(division_by_zero())
            } else {
                Ok(Value::Float(a / b))
            }
        }
        _ => Err(binary_type_mismatch("float", op, "float")),
    }
}

/// `+` on two collections: keys of the left operand win.
fn collection_union(left: &Value, right: &Value) -> Option<Value> {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            let mut items = a.as_ref().clone();
            items.extend(b.iter().skip(a.len()).cloned());
            Some(Value::List(Rc::new(items)))
        }
        (Value::Map(a), Value::Map(b)) => {
            let mut map = a.as_ref().clone();
            for (k, v) in b.iter() {
                map.entry(k.clone()).or_insert_with(|| v.clone());
            }
            Some(Value::Map(Rc::new(map)))
        }
        _ => None,
    }
}

/// Evaluate a unary operation.
pub fn evaluate_unary(operand: &Value, op: UnaryOp) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand.to_number() {
            Some(Number::Int(n)) => checked_arith(n.checked_neg(), "negation"),
            Some(Number::Float(f)) => Ok(Value::Float(-f)),
            None => Err(binary_type_mismatch("int", BinaryOp::Sub, operand.type_name())),
        },
        UnaryOp::Plus => operand
            .to_number()
            .map(Value::from)
            .ok_or_else(|| binary_type_mismatch("int", BinaryOp::Add, operand.type_name())),
    }
}

#[cfg(test)]
mod tests;
