//! Provider configurations

use declarative::{Attributes, Expr, Kind, ProviderRequirement, Resource};

/// AWS provider bound to a region
#[derive(Debug, Clone)]
pub struct AwsProvider {
    pub region: String,
}

impl Resource for AwsProvider {
    fn kind(&self) -> Kind {
        Kind::Provider
    }

    fn type_name(&self) -> &str {
        "aws"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([("region".to_string(), Expr::string(&self.region))])
    }

    fn provider_requirement(&self) -> Option<ProviderRequirement> {
        Some(ProviderRequirement::new("hashicorp/aws", "~> 4.38"))
    }
}

/// Key material generation
#[derive(Debug, Clone, Default)]
pub struct TlsProvider;

impl Resource for TlsProvider {
    fn kind(&self) -> Kind {
        Kind::Provider
    }

    fn type_name(&self) -> &str {
        "tls"
    }

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    fn provider_requirement(&self) -> Option<ProviderRequirement> {
        Some(ProviderRequirement::new("hashicorp/tls", "~> 4.0"))
    }
}

/// Randomness (shuffles)
#[derive(Debug, Clone, Default)]
pub struct RandomProvider;

impl Resource for RandomProvider {
    fn kind(&self) -> Kind {
        Kind::Provider
    }

    fn type_name(&self) -> &str {
        "random"
    }

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    fn provider_requirement(&self) -> Option<ProviderRequirement> {
        Some(ProviderRequirement::new("hashicorp/random", "~> 3.4"))
    }
}
