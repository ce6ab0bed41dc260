//! Security group (firewall rule set)

use declarative::{Attributes, Expr, Kind, Resource};

use super::{Tags, tags_attr};

/// A single inbound or outbound rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    pub description: String,
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_blocks: Vec<String>,
}

impl SecurityRule {
    /// TCP rule for a single port
    pub fn tcp(description: &str, port: u16, cidr_blocks: &[String]) -> Self {
        Self {
            description: description.to_string(),
            protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr_blocks: cidr_blocks.to_vec(),
        }
    }

    /// All protocols, all ports
    pub fn all_traffic(description: &str, cidr_blocks: &[String]) -> Self {
        Self {
            description: description.to_string(),
            protocol: "-1".to_string(),
            from_port: 0,
            to_port: 0,
            cidr_blocks: cidr_blocks.to_vec(),
        }
    }

    // Inline rule blocks need every attribute present in JSON syntax
    fn to_expr(&self) -> Expr {
        let empty = || Expr::List(Vec::new());
        Expr::map([
            ("description", Expr::string(&self.description)),
            ("protocol", Expr::string(&self.protocol)),
            ("from_port", Expr::from(u32::from(self.from_port))),
            ("to_port", Expr::from(u32::from(self.to_port))),
            ("cidr_blocks", Expr::list(self.cidr_blocks.iter())),
            ("ipv6_cidr_blocks", empty()),
            ("prefix_list_ids", empty()),
            ("security_groups", empty()),
            ("self", Expr::Bool(false)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct SecurityGroup {
    pub vpc_id: Expr,
    pub ingress: Vec<SecurityRule>,
    pub egress: Vec<SecurityRule>,
    pub tags: Tags,
}

impl Resource for SecurityGroup {
    fn kind(&self) -> Kind {
        Kind::Resource
    }

    fn type_name(&self) -> &str {
        "aws_security_group"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("vpc_id".to_string(), self.vpc_id.clone()),
            (
                "ingress".to_string(),
                Expr::List(self.ingress.iter().map(SecurityRule::to_expr).collect()),
            ),
            (
                "egress".to_string(),
                Expr::List(self.egress.iter().map(SecurityRule::to_expr).collect()),
            ),
            ("tags".to_string(), tags_attr(&self.tags)),
        ])
    }

    fn readable(&self) -> &'static [&'static str] {
        &["id", "arn", "name"]
    }

    fn taggable(&self) -> bool {
        true
    }
}
