use frontend::ast::BinaryOperator;

use super::RuntimeError;
use crate::values::RuntimeVal;

// Arithmetic and comparison rules. Numbers are machine integers that wrap
// on overflow, only '+' has a meaning on strings
pub(super) fn binary_op(
    operator: BinaryOperator,
    lhs: RuntimeVal,
    rhs: RuntimeVal,
) -> Result<RuntimeVal, RuntimeError> {
    match (operator, &lhs, &rhs) {
        (BinaryOperator::Equal, _, _) => Ok(RuntimeVal::Bool(lhs == rhs)),
        (BinaryOperator::NotEqual, _, _) => Ok(RuntimeVal::Bool(lhs != rhs)),
        (BinaryOperator::Add, RuntimeVal::String(a), RuntimeVal::String(b)) => {
            Ok(RuntimeVal::String(format!("{a}{b}")))
        }
        (_, RuntimeVal::Number(a), RuntimeVal::Number(b)) => compute(operator, *a, *b),
        _ => Err(RuntimeError::InvalidOperands(
            operator.to_string(),
            lhs.type_name().into(),
            rhs.type_name().into(),
        )),
    }
}

fn compute(operator: BinaryOperator, a: i64, b: i64) -> Result<RuntimeVal, RuntimeError> {
    let res = match operator {
        BinaryOperator::Add => RuntimeVal::Number(a.wrapping_add(b)),
        BinaryOperator::Sub => RuntimeVal::Number(a.wrapping_sub(b)),
        BinaryOperator::Mul => RuntimeVal::Number(a.wrapping_mul(b)),
        BinaryOperator::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            RuntimeVal::Number(a.wrapping_div(b))
        }
        BinaryOperator::Mod => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            RuntimeVal::Number(a.wrapping_rem(b))
        }
        BinaryOperator::Pow => RuntimeVal::Number(power(a, b)),
        BinaryOperator::Less => RuntimeVal::Bool(a < b),
        BinaryOperator::Greater => RuntimeVal::Bool(a > b),
        BinaryOperator::LessEqual => RuntimeVal::Bool(a <= b),
        BinaryOperator::GreaterEqual => RuntimeVal::Bool(a >= b),
        BinaryOperator::Equal => RuntimeVal::Bool(a == b),
        BinaryOperator::NotEqual => RuntimeVal::Bool(a != b),
    };

    Ok(res)
}

// Negative exponents go through floats and truncate toward zero: 2 ** -1 == 0
fn power(base: i64, exp: i64) -> i64 {
    match u32::try_from(exp) {
        Ok(e) => base.wrapping_pow(e),
        Err(_) => (base as f64).powf(exp as f64) as i64,
    }
}
