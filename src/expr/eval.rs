//! Evaluates an [`Expr`] AST against a [`Case`], purely and totally except
//! for the well-defined error cases in [`ExprError`] (§4.3).

use crate::value::{Case, Value};

use super::ast::{CmpOp, Expr};
use super::error::ExprError;

/// Evaluate `expr` against `case`, returning its boolean truth value.
///
/// Never mutates `case`. `And`/`Or` short-circuit: the right operand is not
/// evaluated (and so cannot raise `FieldNotFound`) once the outcome is
/// already determined by the left operand.
pub fn eval(expr: &Expr, case: &Case) -> Result<bool, ExprError> {
    Ok(eval_value(expr, case)?.is_truthy())
}

fn eval_value(expr: &Expr, case: &Case) -> Result<Value, ExprError> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Num(n) => Ok(n.clone()),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Field(path) => case
            .resolve(path)
            .cloned()
            .map_err(|path| ExprError::FieldNotFound { path }),
        Expr::Not(inner) => {
            let v = eval_value(inner, case)?;
            Ok(Value::Bool(!v.is_truthy()))
        }
        Expr::And(l, r) => {
            let lv = eval_value(l, case)?;
            if !lv.is_truthy() {
                return Ok(Value::Bool(false));
            }
            let rv = eval_value(r, case)?;
            Ok(Value::Bool(rv.is_truthy()))
        }
        Expr::Or(l, r) => {
            let lv = eval_value(l, case)?;
            if lv.is_truthy() {
                return Ok(Value::Bool(true));
            }
            let rv = eval_value(r, case)?;
            Ok(Value::Bool(rv.is_truthy()))
        }
        Expr::Cmp(op, l, r) => {
            let lv = eval_value(l, case)?;
            let rv = eval_value(r, case)?;
            Ok(Value::Bool(eval_cmp(*op, &lv, &rv)?))
        }
    }
}

fn eval_cmp(op: CmpOp, l: &Value, r: &Value) -> Result<bool, ExprError> {
    // Three-valued null policy: a null operand never raises.
    if l.is_null() || r.is_null() {
        return Ok(match op {
            CmpOp::Eq => l.is_null() && r.is_null(),
            CmpOp::Ne => !(l.is_null() && r.is_null()),
            CmpOp::Ge | CmpOp::Gt | CmpOp::Le | CmpOp::Lt => false,
        });
    }

    if let (Some(ln), Some(rn)) = (l.as_number(), r.as_number()) {
        return Ok(match op {
            CmpOp::Eq => ln == rn,
            CmpOp::Ne => ln != rn,
            CmpOp::Ge => ln >= rn,
            CmpOp::Gt => ln > rn,
            CmpOp::Le => ln <= rn,
            CmpOp::Lt => ln < rn,
        });
    }

    match op {
        CmpOp::Eq => Ok(same_kind_eq(l, r)),
        CmpOp::Ne => Ok(!same_kind_eq(l, r)),
        CmpOp::Ge | CmpOp::Gt | CmpOp::Le | CmpOp::Lt => Err(ExprError::TypeError {
            message: format!(
                "cannot order-compare {} and {}",
                l.kind(),
                r.kind()
            ),
        }),
    }
}

/// `==`/`!=` between two non-null, non-numeric operands: same kind and equal
/// value, or mismatched kinds (which always compare unequal).
fn same_kind_eq(l: &Value, r: &Value) -> bool {
    l == r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::Parser;

    fn case_from(pairs: &[(&str, Value)]) -> Case {
        Case::new(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    fn run(src: &str, case: &Case) -> Result<bool, ExprError> {
        let expr = Parser::parse(src).unwrap();
        eval(&expr, case)
    }

    #[test]
    fn null_ordering_never_raises() {
        let case = case_from(&[("x", Value::Null)]);
        for op in ["<", "<=", ">", ">="] {
            let src = format!("x {op} 5");
            assert_eq!(run(&src, &case), Ok(false));
            let src2 = format!("5 {op} x");
            assert_eq!(run(&src2, &case), Ok(false));
        }
    }

    #[test]
    fn null_equality() {
        let case = case_from(&[("x", Value::Null), ("y", Value::Int(1))]);
        assert_eq!(run("x == null", &case), Ok(true));
        assert_eq!(run("y == null", &case), Ok(false));
        assert_eq!(run("y != null", &case), Ok(true));
    }

    #[test]
    fn numeric_mixing() {
        let case = case_from(&[("n", Value::Real(0.70))]);
        assert_eq!(run("n >= 0.70", &case), Ok(true));
        let case2 = case_from(&[("n", Value::Int(7))]);
        assert_eq!(run("n >= 0.70", &case2), Ok(true));
    }

    #[test]
    fn string_ordering_is_type_error() {
        let case = case_from(&[("s", Value::Str("a".into()))]);
        let expr = Parser::parse("s > 'b'").unwrap();
        assert!(matches!(eval(&expr, &case), Err(ExprError::TypeError { .. })));
    }

    #[test]
    fn string_equality_is_fine() {
        let case = case_from(&[("s", Value::Str("a".into()))]);
        assert_eq!(run("s == 'a'", &case), Ok(true));
        assert_eq!(run("s != 'b'", &case), Ok(true));
    }

    #[test]
    fn short_circuit_and_skips_missing_field() {
        let case = case_from(&[("a", Value::Bool(false))]);
        // `nonexistent.field` would raise FieldNotFound if evaluated.
        assert_eq!(run("a and nonexistent.field == true", &case), Ok(false));
    }

    #[test]
    fn short_circuit_or_skips_missing_field() {
        let case = case_from(&[("a", Value::Bool(true))]);
        assert_eq!(run("a or nonexistent.field == true", &case), Ok(true));
    }

    #[test]
    fn missing_field_raises() {
        let case = case_from(&[]);
        let expr = Parser::parse("nonexistent.field == true").unwrap();
        match eval(&expr, &case) {
            Err(ExprError::FieldNotFound { path }) => assert_eq!(path, "nonexistent.field"),
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn not_truthiness() {
        let case = case_from(&[("n", Value::Null)]);
        assert_eq!(run("not n", &case), Ok(true));
    }
}
