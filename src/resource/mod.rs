//! Provider resource bindings
//!
//! Typed descriptions of the AWS, TLS and random provider resources the
//! Minecraft stack declares. Each type implements
//! [`declarative::Resource`]: attribute names follow the provider schema
//! and `readable` lists the attributes later declarations may reference.

use declarative::Expr;
use std::collections::BTreeMap;

/// Tag set attached to every taggable declaration
pub type Tags = BTreeMap<String, String>;

/// Render a tag set as a literal map attribute
fn tags_attr(tags: &Tags) -> Expr {
    Expr::map(tags.iter().map(|(k, v)| (k.clone(), v.as_str())))
}

pub mod ami;
pub mod availability_zones;
pub mod instance;
pub mod key_pair;
pub mod provider;
pub mod security_group;
pub mod shuffle;
pub mod vpc;

pub use ami::AmiLookup;
pub use availability_zones::AvailabilityZones;
pub use instance::Instance;
pub use key_pair::{KeyPair, PrivateKey};
pub use provider::{AwsProvider, RandomProvider, TlsProvider};
pub use security_group::{SecurityGroup, SecurityRule};
pub use shuffle::Shuffle;
pub use vpc::VpcModule;
