use super::parser::{BinaryOp, Expr, UnaryOp};
use crate::context::Bindings;
use crate::error::{ScriptError, ScriptResult};
use crate::value::to_sql_text;
use serde_json::Value;
use std::cmp::Ordering;

/// Truthiness used by `test=` expressions: booleans as-is, numbers are true
/// unless zero, `null` is false, anything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Num::Int(i)),
                None => n.as_f64().map(Num::Float),
            },
            _ => None,
        }
    }

    /// Numbers, or strings that parse as numbers (`'5' == 5`).
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Num::Int)
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(Num::Float))
            }
            other => Self::of(other),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn compare(self, other: Num) -> Option<Ordering> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(i) => Value::from(i),
            Num::Float(f) => Value::from(f),
        }
    }
}

pub(crate) struct Evaluator<'a> {
    pub source: &'a str,
    pub bindings: &'a Bindings,
}

impl Evaluator<'_> {
    fn error(&self, msg: impl Into<String>) -> ScriptError {
        ScriptError::evaluation(self.source, msg)
    }

    pub fn eval(&self, expr: &Expr) -> ScriptResult<Value> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Var(name) => match self.bindings.get(name) {
                Some(value) => Ok(value.clone()),
                // An object parameter reads like a map: absent keys are null.
                None if self.bindings.parameter().is_object() => Ok(Value::Null),
                None => Err(self.error(format!("no binding named '{name}'"))),
            },
            Expr::Member(target, name) => {
                let target = self.eval(target)?;
                self.member(&target, name)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                self.index(&target, &index)
            }
            Expr::Call(target, method, args) => {
                let target = self.eval(target)?;
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<ScriptResult<Vec<_>>>()?;
                self.call(&target, method, &args)
            }
            Expr::List(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<ScriptResult<Vec<_>>>()?,
            )),
            Expr::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!is_truthy(&self.eval(inner)?))),
            Expr::Unary(UnaryOp::Neg, inner) => match Num::of(&self.eval(inner)?) {
                Some(Num::Int(i)) => i
                    .checked_neg()
                    .map(Value::from)
                    .ok_or_else(|| self.error("integer overflow")),
                Some(Num::Float(f)) => Ok(Value::from(-f)),
                None => Err(self.error("cannot negate a non-numeric value")),
            },
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                if !is_truthy(&self.eval(lhs)?) {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(is_truthy(&self.eval(rhs)?)))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                if is_truthy(&self.eval(lhs)?) {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(is_truthy(&self.eval(rhs)?)))
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.binary(*op, &lhs, &rhs)
            }
        }
    }

    fn member(&self, target: &Value, name: &str) -> ScriptResult<Value> {
        match target {
            Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
            Value::Null => Err(self.error(format!("source is null for property '{name}'"))),
            Value::Array(items) if name == "length" || name == "size" => {
                Ok(Value::from(items.len()))
            }
            other => Err(self.error(format!(
                "no property '{name}' on {}",
                crate::value::ValueType::of(other)
            ))),
        }
    }

    fn index(&self, target: &Value, index: &Value) -> ScriptResult<Value> {
        match (target, index) {
            (Value::Array(items), Value::Number(n)) => {
                let i = n
                    .as_u64()
                    .ok_or_else(|| self.error(format!("invalid list index {n}")))?;
                Ok(usize::try_from(i)
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            (Value::Object(map), key) => Ok(map.get(&to_sql_text(key)).cloned().unwrap_or(Value::Null)),
            (Value::Null, _) => Err(self.error("source is null for index access")),
            _ => Err(self.error("value is not indexable")),
        }
    }

    fn call(&self, target: &Value, method: &str, args: &[Value]) -> ScriptResult<Value> {
        let arity = |n: usize| -> ScriptResult<()> {
            if args.len() == n {
                Ok(())
            } else {
                Err(self.error(format!(
                    "method '{method}' expects {n} argument(s), got {}",
                    args.len()
                )))
            }
        };

        if target.is_null() {
            return Err(self.error(format!("source is null for method '{method}'")));
        }

        match (method, target) {
            ("size" | "length", Value::Array(items)) => {
                arity(0)?;
                Ok(Value::from(items.len()))
            }
            ("size" | "length", Value::Object(map)) => {
                arity(0)?;
                Ok(Value::from(map.len()))
            }
            ("size" | "length", Value::String(s)) => {
                arity(0)?;
                Ok(Value::from(s.chars().count()))
            }
            ("isEmpty", Value::Array(items)) => {
                arity(0)?;
                Ok(Value::Bool(items.is_empty()))
            }
            ("isEmpty", Value::Object(map)) => {
                arity(0)?;
                Ok(Value::Bool(map.is_empty()))
            }
            ("isEmpty", Value::String(s)) => {
                arity(0)?;
                Ok(Value::Bool(s.is_empty()))
            }
            ("trim", Value::String(s)) => {
                arity(0)?;
                Ok(Value::String(s.trim().to_string()))
            }
            ("toUpperCase", Value::String(s)) => {
                arity(0)?;
                Ok(Value::String(s.to_uppercase()))
            }
            ("toLowerCase", Value::String(s)) => {
                arity(0)?;
                Ok(Value::String(s.to_lowercase()))
            }
            ("toString", v) => {
                arity(0)?;
                Ok(Value::String(to_sql_text(v)))
            }
            ("startsWith", Value::String(s)) => {
                arity(1)?;
                Ok(Value::Bool(s.starts_with(&to_sql_text(&args[0]))))
            }
            ("endsWith", Value::String(s)) => {
                arity(1)?;
                Ok(Value::Bool(s.ends_with(&to_sql_text(&args[0]))))
            }
            ("contains", Value::String(s)) => {
                arity(1)?;
                Ok(Value::Bool(s.contains(&to_sql_text(&args[0]))))
            }
            ("contains", Value::Array(items)) => {
                arity(1)?;
                Ok(Value::Bool(items.iter().any(|v| loose_eq(v, &args[0]))))
            }
            ("containsKey", Value::Object(map)) => {
                arity(1)?;
                Ok(Value::Bool(map.contains_key(&to_sql_text(&args[0]))))
            }
            ("equals", v) => {
                arity(1)?;
                Ok(Value::Bool(loose_eq(v, &args[0])))
            }
            _ => Err(self.error(format!(
                "unknown method '{method}' on {}",
                crate::value::ValueType::of(target)
            ))),
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> ScriptResult<Value> {
        match op {
            BinaryOp::Eq => Ok(Value::Bool(loose_eq(lhs, rhs))),
            BinaryOp::Ne => Ok(Value::Bool(!loose_eq(lhs, rhs))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ord = compare(lhs, rhs)
                    .ok_or_else(|| self.error(format!("cannot compare {lhs} with {rhs}")))?;
                let result = match op {
                    BinaryOp::Lt => ord == Ordering::Less,
                    BinaryOp::Le => ord != Ordering::Greater,
                    BinaryOp::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                };
                Ok(Value::Bool(result))
            }
            BinaryOp::Add if lhs.is_string() || rhs.is_string() => Ok(Value::String(format!(
                "{}{}",
                to_sql_text(lhs),
                to_sql_text(rhs)
            ))),
            _ => self.arithmetic(op, lhs, rhs),
        }
    }

    fn arithmetic(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> ScriptResult<Value> {
        let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) else {
            return Err(self.error(format!("arithmetic on non-numeric values {lhs} and {rhs}")));
        };

        let result = match (a, b) {
            (Num::Int(a), Num::Int(b)) => {
                let v = match op {
                    BinaryOp::Add => a.checked_add(b),
                    BinaryOp::Sub => a.checked_sub(b),
                    BinaryOp::Mul => a.checked_mul(b),
                    BinaryOp::Div if b == 0 => return Err(self.error("division by zero")),
                    BinaryOp::Div => a.checked_div(b),
                    BinaryOp::Rem if b == 0 => return Err(self.error("division by zero")),
                    BinaryOp::Rem => a.checked_rem(b),
                    _ => None,
                };
                Num::Int(v.ok_or_else(|| self.error("integer overflow"))?)
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                Num::Float(match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    _ => a % b,
                })
            }
        };
        Ok(result.into_value())
    }
}

/// Equality with numeric coercion: `1 == 1.0`, `'5' == 5`, `null == null`.
pub(crate) fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (Num::coerce(lhs), Num::coerce(rhs)) {
                (Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
                _ => false,
            }
        }
        (a, b) => a == b,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => Num::coerce(lhs)?.compare(Num::coerce(rhs)?),
    }
}
