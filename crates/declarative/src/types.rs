//! Core types for declaration graphs

use crate::expr::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a declaration
///
/// Determines the top-level block a declaration is synthesized into
/// and how its address is rendered in references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Provider configuration (`provider.<type>`)
    Provider,
    /// Read-only lookup (`data.<type>.<name>`)
    Data,
    /// Managed resource (`<type>.<name>`)
    Resource,
    /// Module call (`module.<name>`)
    Module,
}

impl Kind {
    /// Top-level block name in the synthesized document
    pub fn block(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Data => "data",
            Self::Resource => "resource",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.block())
    }
}

/// Stable address of a declaration within a stack
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address {
    pub kind: Kind,
    /// Provider resource type (e.g. "aws_instance"); the module source for modules
    pub type_name: String,
    /// Logical name, unique within the stack
    pub name: String,
}

impl Address {
    pub fn new(kind: Kind, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Provider => write!(f, "{}", self.type_name),
            Kind::Data => write!(f, "data.{}.{}", self.type_name, self.name),
            Kind::Resource => write!(f, "{}.{}", self.type_name, self.name),
            Kind::Module => write!(f, "module.{}", self.name),
        }
    }
}

/// Entry for the `terraform.required_providers` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequirement {
    /// Registry source (e.g. "hashicorp/aws")
    pub source: String,
    /// Version constraint (e.g. "~> 4.0")
    pub version: String,
}

impl ProviderRequirement {
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            version: version.into(),
        }
    }
}

/// A named value exported from the stack after apply
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub value: Expr,
    pub description: Option<String>,
    /// Sensitive outputs must never be displayed in plaintext
    pub sensitive: bool,
}

impl Output {
    /// Create a plain output
    pub fn new(value: Expr) -> Self {
        Self {
            value,
            description: None,
            sensitive: false,
        }
    }

    /// Create an output whose value is redacted by every consumer
    pub fn sensitive(value: Expr) -> Self {
        Self {
            value,
            description: None,
            sensitive: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Remote execution-state backend registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBackend {
    pub hostname: String,
    pub organization: String,
    /// Workspace name holding the apply state
    pub workspace: String,
}
