//! Resource trait for declaration graphs
//!
//! A Resource is the typed, in-memory description of something the
//! provisioning engine will create or read. It never talks to the real
//! world; it only describes attributes and which attributes later
//! declarations may read from it.

use crate::expr::Expr;
use crate::types::{Kind, ProviderRequirement};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute name to literal or deferred value
pub type Attributes = BTreeMap<String, Expr>;

/// Core trait for declarable resources
///
/// # Example
///
/// ```
/// use declarative::{Attributes, Expr, Kind, Resource};
///
/// #[derive(Debug)]
/// struct Bucket {
///     name: String,
/// }
///
/// impl Resource for Bucket {
///     fn kind(&self) -> Kind {
///         Kind::Resource
///     }
///
///     fn type_name(&self) -> &str {
///         "aws_s3_bucket"
///     }
///
///     fn attributes(&self) -> Attributes {
///         Attributes::from([("bucket".to_string(), Expr::string(&self.name))])
///     }
///
///     fn readable(&self) -> &'static [&'static str] {
///         &["id", "arn"]
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Category of the declaration
    fn kind(&self) -> Kind;

    /// Provider resource type (e.g. "aws_instance")
    ///
    /// For modules this is the module source; for providers the provider
    /// local name.
    fn type_name(&self) -> &str;

    /// Attributes handed to the engine
    fn attributes(&self) -> Attributes;

    /// Attribute names later declarations may reference
    fn readable(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the declaration carries the common tag set
    fn taggable(&self) -> bool {
        false
    }

    /// Registry requirement, for provider declarations
    fn provider_requirement(&self) -> Option<ProviderRequirement> {
        None
    }
}

/// Type-erased declaration as stored in a stack
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: Kind,
    pub type_name: String,
    pub name: String,
    pub attributes: Attributes,
    pub readable: &'static [&'static str],
    pub taggable: bool,
    pub requirement: Option<ProviderRequirement>,
}

impl Declaration {
    pub fn from_resource<R: Resource + ?Sized>(name: &str, resource: &R) -> Self {
        Self {
            kind: resource.kind(),
            type_name: resource.type_name().to_string(),
            name: name.to_string(),
            attributes: resource.attributes(),
            readable: resource.readable(),
            taggable: resource.taggable(),
            requirement: resource.provider_requirement(),
        }
    }

    pub fn address(&self) -> crate::Address {
        crate::Address::new(self.kind, self.type_name.clone(), self.name.clone())
    }

    /// Tag map, if the declaration is taggable and carries one
    pub fn tags(&self) -> Option<&BTreeMap<String, Expr>> {
        if !self.taggable {
            return None;
        }
        match self.attributes.get("tags") {
            Some(Expr::Map(tags)) => Some(tags),
            _ => None,
        }
    }
}
