//! Stack builder - the explicit declaration graph
//!
//! Declarations are appended in construction order. Every reference is
//! checked against what is already in the stack, so the graph is acyclic
//! by construction and never contains dangling edges.

use crate::error::{Error, Result};
use crate::expr::{Expr, Reference};
use crate::resource::{Declaration, Resource};
use crate::types::{Address, Output, ProviderRequirement, RemoteBackend};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

static LOGICAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("logical name pattern is valid")
});

/// Whether `name` is a valid logical name: a letter or underscore, then
/// letters, digits, `_` or `-`
pub fn is_valid_name(name: &str) -> bool {
    LOGICAL_NAME.is_match(name)
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Declaration(usize),
    Output,
}

/// Handle to a declaration already added to a stack
///
/// Used to build references for later declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    address: Address,
}

impl Handle {
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Deferred reference to one of the declaration's attributes
    pub fn attr(&self, attribute: &str) -> Expr {
        Expr::Ref(Reference {
            address: self.address.clone(),
            attribute: attribute.to_string(),
        })
    }
}

/// A named composition of declarations and outputs
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    declarations: Vec<Declaration>,
    outputs: Vec<(String, Output)>,
    names: HashMap<String, Slot>,
    backend: Option<RemoteBackend>,
}

impl Stack {
    /// Create an empty stack
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
            outputs: Vec::new(),
            names: HashMap::new(),
            backend: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a declaration under a unique logical name
    ///
    /// Fails without modifying the stack if the name is taken or invalid,
    /// or if any attribute references something not declared earlier.
    pub fn add<R: Resource>(&mut self, name: &str, resource: R) -> Result<Handle> {
        self.check_name(name)?;

        let declaration = Declaration::from_resource(name, &resource);
        for value in declaration.attributes.values() {
            self.check_references(name, value)?;
        }

        let address = declaration.address();
        log::debug!("declared {address}");
        self.names
            .insert(name.to_string(), Slot::Declaration(self.declarations.len()));
        self.declarations.push(declaration);
        Ok(Handle { address })
    }

    /// Add a named output
    pub fn output(&mut self, name: &str, output: Output) -> Result<()> {
        self.check_name(name)?;
        self.check_references(name, &output.value)?;

        log::debug!(
            "output {name}{}",
            if output.sensitive { " (sensitive)" } else { "" }
        );
        self.names.insert(name.to_string(), Slot::Output);
        self.outputs.push((name.to_string(), output));
        Ok(())
    }

    /// Register the remote state backend
    pub fn set_backend(&mut self, backend: RemoteBackend) {
        self.backend = Some(backend);
    }

    pub fn backend(&self) -> Option<&RemoteBackend> {
        self.backend.as_ref()
    }

    /// Declarations in construction order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Outputs in construction order
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Output)> {
        self.outputs.iter().map(|(name, o)| (name.as_str(), o))
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        match self.names.get(name)? {
            Slot::Declaration(index) => self.declarations.get(*index),
            Slot::Output => None,
        }
    }

    /// Number of declarations (outputs excluded)
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// True when there are no declarations (outputs excluded, as in `len`)
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations carrying the common tag set
    pub fn taggable(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.taggable)
    }

    /// Provider requirements keyed by provider local name
    pub fn requirements(&self) -> BTreeMap<String, ProviderRequirement> {
        self.declarations
            .iter()
            .filter_map(|d| d.requirement.clone().map(|r| (d.type_name.clone(), r)))
            .collect()
    }

    /// Addresses a declaration depends on, deduplicated and sorted
    pub fn dependencies(&self, name: &str) -> Vec<Address> {
        let Some(declaration) = self.get(name) else {
            return Vec::new();
        };
        declaration
            .attributes
            .values()
            .flat_map(Expr::references)
            .map(|r| r.address.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::InvalidName(name.to_string()));
        }
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn check_references(&self, from: &str, value: &Expr) -> Result<()> {
        for reference in value.references() {
            let target = self
                .get(&reference.address.name)
                .filter(|d| d.address() == reference.address)
                .ok_or_else(|| Error::ForwardReference {
                    from: from.to_string(),
                    target: reference.address.to_string(),
                })?;

            if !target.readable.contains(&reference.attribute.as_str()) {
                return Err(Error::UnknownAttribute {
                    from: from.to_string(),
                    target: reference.address.to_string(),
                    attribute: reference.attribute.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Attributes;
    use crate::types::Kind;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Network;

    impl Resource for Network {
        fn kind(&self) -> Kind {
            Kind::Resource
        }
        fn type_name(&self) -> &str {
            "test_network"
        }
        fn attributes(&self) -> Attributes {
            Attributes::from([("cidr".to_string(), Expr::string("10.0.0.0/16"))])
        }
        fn readable(&self) -> &'static [&'static str] {
            &["id"]
        }
    }

    #[derive(Debug)]
    struct Host {
        network: Expr,
    }

    impl Resource for Host {
        fn kind(&self) -> Kind {
            Kind::Resource
        }
        fn type_name(&self) -> &str {
            "test_host"
        }
        fn attributes(&self) -> Attributes {
            Attributes::from([("network_id".to_string(), self.network.clone())])
        }
        fn readable(&self) -> &'static [&'static str] {
            &["ip"]
        }
    }

    #[test]
    fn test_add_and_reference() {
        let mut stack = Stack::new("test");
        let net = stack.add("net", Network).unwrap();
        let host = stack
            .add("host", Host { network: net.attr("id") })
            .unwrap();

        assert_eq!(host.address().to_string(), "test_host.host");
        assert_eq!(stack.len(), 2);
        assert_eq!(
            stack.dependencies("host"),
            vec![Address::new(Kind::Resource, "test_network", "net")]
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut stack = Stack::new("test");
        stack.add("net", Network).unwrap();
        assert_eq!(
            stack.add("net", Network),
            Err(Error::DuplicateName("net".into()))
        );
        assert_eq!(
            stack.output("net", Output::new(Expr::Null)),
            Err(Error::DuplicateName("net".into()))
        );
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut stack = Stack::new("test");
        assert_eq!(
            stack.add("9lives", Network),
            Err(Error::InvalidName("9lives".into()))
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn test_forward_reference_rejected() {
        let mut stack = Stack::new("test");
        let dangling = Handle {
            address: Address::new(Kind::Resource, "test_network", "later"),
        };
        let err = stack
            .add("host", Host { network: dangling.attr("id") })
            .unwrap_err();
        assert_eq!(
            err,
            Error::ForwardReference {
                from: "host".into(),
                target: "test_network.later".into()
            }
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let mut stack = Stack::new("test");
        let net = stack.add("net", Network).unwrap();
        let err = stack
            .add("host", Host { network: net.attr("arn") })
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAttribute { attribute, .. } if attribute == "arn"));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_outputs_keep_order_and_flags() {
        let mut stack = Stack::new("test");
        let net = stack.add("net", Network).unwrap();
        stack.output("netId", Output::new(net.attr("id"))).unwrap();
        stack
            .output("secret", Output::sensitive(Expr::string("x")))
            .unwrap();

        let names: Vec<&str> = stack.outputs().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["netId", "secret"]);
        assert!(stack.outputs().any(|(n, o)| n == "secret" && o.sensitive));
        assert!(stack.get("netId").is_none());
    }

    #[test]
    fn test_len_and_is_empty_agree_on_outputs() {
        let mut stack = Stack::new("test");
        stack.output("constant", Output::new(Expr::string("x"))).unwrap();
        assert_eq!(stack.len(), 0);
        assert!(stack.is_empty());

        stack.add("net", Network).unwrap();
        assert_eq!(stack.len(), 1);
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_is_valid_name() {
        for good in ["minecraft-cdktf", "_x", "Stack_1"] {
            assert!(is_valid_name(good), "{good} should be valid");
        }
        for bad in ["", "../x", "a/b", "9lives", "with space", "."] {
            assert!(!is_valid_name(bad), "{bad} should be invalid");
        }
    }
}
