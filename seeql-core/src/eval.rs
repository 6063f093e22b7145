use crate::errors::QueryError;
use crate::graph::PropertyGraph;
use crate::prelude::Result;
use crate::value::{Binding, Number, Value};
use seeql_cypher::Expression;
use std::cmp::Ordering;

/// Evaluates expression trees against one binding at a time.
///
/// Children are evaluated before their parent, so an error anywhere in the
/// tree surfaces even when a boolean operator could short-circuit.
pub struct Evaluator<'g, G> {
    graph: &'g G,
}

impl<'g, G: PropertyGraph> Evaluator<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Evaluator { graph }
    }

    /// True only for `Bool(true)`; `Null` and `false` reject.
    pub fn evaluate_predicate(&self, expr: &Expression, binding: &Binding) -> Result<bool> {
        Ok(matches!(self.evaluate(expr, binding)?, Value::Bool(true)))
    }

    pub fn evaluate(&self, expr: &Expression, binding: &Binding) -> Result<Value> {
        match expr {
            Expression::Or { left, right } => {
                let (l, r) = self.truth_pair(expr, left, right, binding)?;
                Ok(match (l, r) {
                    (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                    (Some(false), Some(false)) => Value::Bool(false),
                    _ => Value::Null,
                })
            }
            Expression::Xor { left, right } => {
                let (l, r) = self.truth_pair(expr, left, right, binding)?;
                Ok(match (l, r) {
                    (Some(a), Some(b)) => Value::Bool(a != b),
                    _ => Value::Null,
                })
            }
            Expression::And { left, right } => {
                let (l, r) = self.truth_pair(expr, left, right, binding)?;
                Ok(match (l, r) {
                    (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                    (Some(true), Some(true)) => Value::Bool(true),
                    _ => Value::Null,
                })
            }
            Expression::Not { operand } => {
                let value = self.evaluate(operand, binding)?;
                Ok(match truth(expr, &value)? {
                    Some(b) => Value::Bool(!b),
                    None => Value::Null,
                })
            }
            Expression::Equal { left, right } => {
                let l = self.evaluate(left, binding)?;
                let r = self.evaluate(right, binding)?;
                Ok(Value::Bool(l.value_eq(&r)))
            }
            Expression::NotEqual { left, right } => {
                let l = self.evaluate(left, binding)?;
                let r = self.evaluate(right, binding)?;
                Ok(Value::Bool(!l.value_eq(&r)))
            }
            Expression::LessEqual { left, right } => {
                self.compare(expr, left, right, binding, |ord| ord != Ordering::Greater)
            }
            Expression::GreaterEqual { left, right } => {
                self.compare(expr, left, right, binding, |ord| ord != Ordering::Less)
            }
            Expression::Less { left, right } => {
                self.compare(expr, left, right, binding, |ord| ord == Ordering::Less)
            }
            Expression::Greater { left, right } => {
                self.compare(expr, left, right, binding, |ord| ord == Ordering::Greater)
            }
            // IS NOT NULL deliberately shares the IS NULL test.
            Expression::IsNull { operand } | Expression::IsNotNull { operand } => {
                Ok(Value::Bool(self.evaluate(operand, binding)?.is_null()))
            }
            Expression::TypeEquals { operand, type_name } => {
                match self.evaluate(operand, binding)? {
                    Value::Element(element) => Ok(Value::Bool(
                        self.graph.element_type(element) == Some(type_name.as_str()),
                    )),
                    _ => Err(QueryError::type_mismatch("element has no type")),
                }
            }
            Expression::Negate { operand } => match self.evaluate(operand, binding)? {
                Value::Number(number) => Ok(Value::Number(number.negate())),
                Value::Null => Ok(Value::Null),
                other => Err(QueryError::type_mismatch(format!(
                    "cannot negate {} value",
                    other.kind_name()
                ))),
            },
            Expression::Property { operand, key } => match self.evaluate(operand, binding)? {
                Value::Element(element) => {
                    if let Some(number) = self.graph.numeric_attribute(element, key) {
                        Ok(Value::Number(number))
                    } else if let Some(text) = self.graph.string_attribute(element, key) {
                        Ok(Value::text(text))
                    } else {
                        Ok(Value::Null)
                    }
                }
                other => Err(QueryError::type_mismatch(format!(
                    "cannot access property {key} of {} value",
                    other.kind_name()
                ))),
            },
            Expression::BooleanLiteral(text) => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
            Expression::NumericLiteral(text) => numeric_literal(text).map(Value::Number),
            Expression::StringLiteral(text) => Ok(Value::text(text.as_str())),
            Expression::Keyword(_) => Ok(Value::Null),
            Expression::Variable { name, kind } => Ok(match (kind, binding.get(name)) {
                (Some(kind), Some(element)) if element.kind() == *kind => Value::Element(element),
                _ => Value::Null,
            }),
            Expression::CountStar => Ok(Value::text("count(*)")),
            Expression::Unsupported(op) => Err(QueryError::unsupported_operator(op.as_str())),
        }
    }

    fn truth_pair(
        &self,
        expr: &Expression,
        left: &Expression,
        right: &Expression,
        binding: &Binding,
    ) -> Result<(Option<bool>, Option<bool>)> {
        let l = self.evaluate(left, binding)?;
        let r = self.evaluate(right, binding)?;
        Ok((truth(expr, &l)?, truth(expr, &r)?))
    }

    fn compare(
        &self,
        expr: &Expression,
        left: &Expression,
        right: &Expression,
        binding: &Binding,
        accept: impl Fn(Ordering) -> bool,
    ) -> Result<Value> {
        let l = decimal(expr, &self.evaluate(left, binding)?)?;
        let r = decimal(expr, &self.evaluate(right, binding)?)?;
        Ok(match (l, r) {
            (Some(a), Some(b)) => match a.partial_cmp(&b) {
                Some(ord) => Value::Bool(accept(ord)),
                None => Value::Bool(false),
            },
            _ => Value::Null,
        })
    }
}

fn truth(expr: &Expression, value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Bool(b) => Ok(Some(*b)),
        Value::Null => Ok(None),
        other => Err(QueryError::type_mismatch(format!(
            "{} expects boolean operands, found {}",
            expr.operator(),
            other.kind_name()
        ))),
    }
}

/// Numeric view of a comparison operand; `None` for `Null`.
fn decimal(expr: &Expression, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Number(number) => Ok(Some(number.as_f64())),
        Value::Text(text) => text.trim().parse::<f64>().map(Some).map_err(|_| {
            QueryError::type_mismatch(format!(
                "{} expects numeric operands, found text '{text}'",
                expr.operator()
            ))
        }),
        Value::Null => Ok(None),
        other => Err(QueryError::type_mismatch(format!(
            "{} expects numeric operands, found {}",
            expr.operator(),
            other.kind_name()
        ))),
    }
}

fn numeric_literal(text: &str) -> Result<Number> {
    let text = text.trim();
    let parsed = if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().ok().map(Number::Float)
    } else {
        text.parse::<i64>().ok().map(Number::Integer)
    };
    parsed.ok_or_else(|| QueryError::type_mismatch(format!("invalid numeric literal: {text}")))
}
