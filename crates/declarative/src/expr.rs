//! Deferred expressions
//!
//! An [`Expr`] is either a literal value known at composition time or a
//! symbolic node (attribute reference, function call) that only the
//! provisioning engine can resolve during apply. Composition never
//! collapses symbolic nodes into guesses; it only records them.

use crate::types::Address;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Reference to a readable attribute of a previously declared address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    pub address: Address,
    pub attribute: String,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.attribute)
    }
}

/// Engine-side functions the builder is allowed to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Function {
    /// `min(a, b, ...)`
    Min,
    /// `length(collection)`
    Length,
    /// `slice(list, start, end)`
    Slice,
    /// `element(list, index)`, wrapping around like Terraform does
    Element,
    /// `cidrsubnet(prefix, newbits, netnum)`
    Cidrsubnet,
}

impl Function {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Length => "length",
            Self::Slice => "slice",
            Self::Element => "element",
            Self::Cidrsubnet => "cidrsubnet",
        }
    }
}

/// A literal value or a deferred, engine-resolved expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(i64),
    String(String),
    List(Vec<Expr>),
    Map(BTreeMap<String, Expr>),
    Ref(Reference),
    Call(Function, Vec<Expr>),
}

impl Expr {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn list<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<String>,
        E: Into<Expr>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        Self::Call(function, args)
    }

    /// True when the expression contains no references or function calls
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => true,
            Self::List(items) => items.iter().all(Expr::is_literal),
            Self::Map(entries) => entries.values().all(Expr::is_literal),
            Self::Ref(_) | Self::Call(..) => false,
        }
    }

    /// All references reachable from this expression, in traversal order
    pub fn references(&self) -> Vec<&Reference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a Reference>) {
        match self {
            Self::Ref(r) => out.push(r),
            Self::List(items) | Self::Call(_, items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            Self::Map(entries) => {
                for value in entries.values() {
                    value.collect_references(out);
                }
            }
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => {}
        }
    }

    /// Render as a Terraform expression (the body of a `${...}` interpolation)
    pub fn to_hcl(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => quote_hcl(s),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(Expr::to_hcl).collect();
                format!("[{}]", rendered.join(", "))
            }
            Self::Map(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{} = {}", hcl_key(k), v.to_hcl()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Self::Ref(r) => r.to_string(),
            Self::Call(function, args) => {
                let rendered: Vec<String> = args.iter().map(Expr::to_hcl).collect();
                format!("{}({})", function.name(), rendered.join(", "))
            }
        }
    }

    /// Render as a Terraform JSON value
    ///
    /// Literals become plain JSON (strings escaped so the engine does not
    /// interpolate them); symbolic nodes become `"${...}"` template strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::from(*n),
            Self::String(s) => Value::String(escape_template(s)),
            Self::List(items) => Value::Array(items.iter().map(Expr::to_json).collect()),
            Self::Map(entries) => {
                let mut object = Map::new();
                for (k, v) in entries {
                    object.insert(k.clone(), v.to_json());
                }
                Value::Object(object)
            }
            Self::Ref(_) | Self::Call(..) => Value::String(format!("${{{}}}", self.to_hcl())),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hcl())
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Expr {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for Expr {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<Reference> for Expr {
    fn from(r: Reference) -> Self {
        Self::Ref(r)
    }
}

impl From<Vec<Expr>> for Expr {
    fn from(items: Vec<Expr>) -> Self {
        Self::List(items)
    }
}

/// Builders mirroring the engine's built-in functions
pub mod fns {
    use super::{Expr, Function};

    pub fn min(args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::call(Function::Min, args.into_iter().collect())
    }

    pub fn length(collection: Expr) -> Expr {
        Expr::call(Function::Length, vec![collection])
    }

    pub fn slice(list: Expr, start: impl Into<Expr>, end: impl Into<Expr>) -> Expr {
        Expr::call(Function::Slice, vec![list, start.into(), end.into()])
    }

    pub fn element(list: Expr, index: impl Into<Expr>) -> Expr {
        Expr::call(Function::Element, vec![list, index.into()])
    }

    pub fn cidrsubnet(prefix: impl Into<Expr>, newbits: u32, netnum: u32) -> Expr {
        Expr::call(
            Function::Cidrsubnet,
            vec![prefix.into(), newbits.into(), netnum.into()],
        )
    }
}

/// Escape template sequences so the engine treats the string verbatim
pub fn escape_template(s: &str) -> String {
    s.replace("${", "$${").replace("%{", "%%{")
}

fn quote_hcl(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in escape_template(s).chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn hcl_key(key: &str) -> String {
    let bare = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare { key.to_string() } else { quote_hcl(key) }
}
