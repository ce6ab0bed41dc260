//! # Declarative
//!
//! Declaration graphs for infrastructure provisioning.
//!
//! This crate builds the in-memory description of desired infrastructure
//! and synthesizes it into a Terraform JSON document. Creating, diffing
//! and converging real resources is left to the provisioning engine that
//! consumes the document.
//!
//! ## Core Concepts
//!
//! - **Resource**: typed description of something the engine will create or read
//! - **Stack**: explicit graph builder; declarations are appended in order
//! - **Expr**: literal or deferred value (reference, engine function call)
//! - **Output**: named value exported after apply, optionally sensitive
//!
//! ## Example
//!
//! ```
//! use declarative::{Attributes, Expr, Kind, Output, Resource, Stack, fns, synth};
//!
//! #[derive(Debug)]
//! struct Zones;
//!
//! impl Resource for Zones {
//!     fn kind(&self) -> Kind { Kind::Data }
//!     fn type_name(&self) -> &str { "aws_availability_zones" }
//!     fn attributes(&self) -> Attributes {
//!         Attributes::from([("state".to_string(), Expr::string("available"))])
//!     }
//!     fn readable(&self) -> &'static [&'static str] { &["names"] }
//! }
//!
//! let mut stack = Stack::new("demo");
//! let azs = stack.add("azs", Zones)?;
//! let count = fns::min([fns::length(azs.attr("names")), Expr::Number(3)]);
//! stack.output("zoneCount", Output::new(count))?;
//!
//! let doc = synth::synthesize(&stack);
//! assert_eq!(
//!     doc["output"]["zoneCount"]["value"],
//!     "${min(length(data.aws_availability_zones.azs.names), 3)}"
//! );
//! # Ok::<(), declarative::Error>(())
//! ```
//!
//! ## Evaluation
//!
//! Deferred expressions are never resolved during composition. The
//! [`eval`] module evaluates them against a [`Resolver`], which stands in
//! for the engine when previewing or testing.

pub mod cidr;
pub mod diff;
mod error;
pub mod eval;
pub mod expr;
pub mod resource;
pub mod stack;
pub mod synth;
pub mod types;

// Re-export main types at crate root
pub use cidr::Ipv4Cidr;
pub use diff::{Change, DiffSummary, DocumentDiff, diff_documents, group_by_block};
pub use error::{Error, Result};
pub use eval::{EvalError, Resolver, StaticResolver, Unresolved, evaluate};
pub use expr::{Expr, Function, Reference, fns};
pub use resource::{Attributes, Declaration, Resource};
pub use stack::{Handle, Stack, is_valid_name};
pub use types::{Address, Kind, Output, ProviderRequirement, RemoteBackend};
