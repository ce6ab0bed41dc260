//! Expression evaluation against resolved attribute values
//!
//! The provisioning engine is the only party that knows attribute values.
//! A [`Resolver`] stands in for it, which lets callers preview what a
//! deferred expression would become for a hypothetical apply.

use crate::cidr::Ipv4Cidr;
use crate::expr::{Expr, Function, Reference};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while evaluating an expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Value only known once the engine applies the graph
    #[error("'{0}' is not known until apply")]
    Unresolved(String),

    #[error("{function}() expects {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{function}(): {message}")]
    Invalid {
        function: &'static str,
        message: String,
    },
}

/// Source of attribute values for references
///
/// Implement this trait to describe what the engine would report after
/// apply (or after reading a data source).
pub trait Resolver {
    /// Value of the referenced attribute, or `None` if unknown
    fn resolve(&self, reference: &Reference) -> Option<Value>;
}

/// Resolver that knows nothing; every reference stays deferred
pub struct Unresolved;

impl Resolver for Unresolved {
    fn resolve(&self, _reference: &Reference) -> Option<Value> {
        None
    }
}

/// Resolver backed by a fixed set of attribute values
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    values: HashMap<Reference, Value>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: Reference, value: Value) -> Self {
        self.values.insert(reference, value);
        self
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, reference: &Reference) -> Option<Value> {
        self.values.get(reference).cloned()
    }
}

/// Evaluate an expression to a concrete value
pub fn evaluate(expr: &Expr, resolver: &dyn Resolver) -> Result<Value, EvalError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::from(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::List(items) => items
            .iter()
            .map(|item| evaluate(item, resolver))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (k, v) in entries {
                object.insert(k.clone(), evaluate(v, resolver)?);
            }
            Ok(Value::Object(object))
        }
        Expr::Ref(reference) => resolver
            .resolve(reference)
            .ok_or_else(|| EvalError::Unresolved(reference.to_string())),
        Expr::Call(function, args) => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, resolver))
                .collect::<Result<Vec<_>, _>>()?;
            call(*function, &args)
        }
    }
}

fn call(function: Function, args: &[Value]) -> Result<Value, EvalError> {
    let name = function.name();
    match function {
        Function::Min => {
            if args.is_empty() {
                return Err(EvalError::Arity {
                    function: name,
                    expected: 1,
                    got: 0,
                });
            }
            let numbers = args
                .iter()
                .map(|v| as_int(name, v))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::from(numbers.into_iter().min().unwrap_or_default()))
        }
        Function::Length => {
            let [collection] = expect_args::<1>(name, args)?;
            let len = match collection {
                Value::Array(items) => items.len(),
                Value::Object(entries) => entries.len(),
                Value::String(s) => s.chars().count(),
                other => return Err(invalid(name, format!("cannot take length of {other}"))),
            };
            Ok(Value::from(len))
        }
        Function::Slice => {
            let [list, start, end] = expect_args::<3>(name, args)?;
            let items = as_list(name, list)?;
            let start = as_index(name, start)?;
            let end = as_index(name, end)?;
            if start > end || end > items.len() {
                return Err(invalid(
                    name,
                    format!("range {start}..{end} out of bounds for list of {}", items.len()),
                ));
            }
            Ok(Value::Array(items[start..end].to_vec()))
        }
        Function::Element => {
            let [list, index] = expect_args::<2>(name, args)?;
            let items = as_list(name, list)?;
            if items.is_empty() {
                return Err(invalid(name, "cannot use element on an empty list".into()));
            }
            let index = as_index(name, index)?;
            Ok(items[index % items.len()].clone())
        }
        Function::Cidrsubnet => {
            let [prefix, newbits, netnum] = expect_args::<3>(name, args)?;
            let prefix: Ipv4Cidr = prefix
                .as_str()
                .ok_or_else(|| invalid(name, "prefix must be a string".into()))?
                .parse()
                .map_err(|e: crate::Error| invalid(name, e.to_string()))?;
            let newbits = u8::try_from(as_int(name, newbits)?)
                .map_err(|_| invalid(name, "newbits out of range".into()))?;
            let netnum = u32::try_from(as_int(name, netnum)?)
                .map_err(|_| invalid(name, "netnum out of range".into()))?;
            let subnet = prefix
                .subnet(newbits, netnum)
                .map_err(|e| invalid(name, e.to_string()))?;
            Ok(Value::String(subnet.to_string()))
        }
    }
}

fn expect_args<'a, const N: usize>(
    function: &'static str,
    args: &'a [Value],
) -> Result<&'a [Value; N], EvalError> {
    args.try_into().map_err(|_| EvalError::Arity {
        function,
        expected: N,
        got: args.len(),
    })
}

fn invalid(function: &'static str, message: String) -> EvalError {
    EvalError::Invalid { function, message }
}

fn as_int(function: &'static str, value: &Value) -> Result<i64, EvalError> {
    value
        .as_i64()
        .ok_or_else(|| invalid(function, format!("expected a whole number, got {value}")))
}

fn as_index(function: &'static str, value: &Value) -> Result<usize, EvalError> {
    usize::try_from(as_int(function, value)?)
        .map_err(|_| invalid(function, format!("index must not be negative, got {value}")))
}

fn as_list<'a>(function: &'static str, value: &'a Value) -> Result<&'a [Value], EvalError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(function, format!("expected a list, got {value}")))
}
