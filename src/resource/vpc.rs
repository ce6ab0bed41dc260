//! VPC network module

use declarative::{Attributes, Expr, Kind, Resource};

use super::{Tags, tags_attr};

/// Registry module providing the VPC, subnets, routing and NAT
pub const VPC_MODULE_SOURCE: &str = "terraform-aws-modules/vpc/aws";
pub const VPC_MODULE_VERSION: &str = "~> 3.18";

/// Network construct with private, database and public subnet tiers
#[derive(Debug, Clone)]
pub struct VpcModule {
    pub name: String,
    pub cidr: String,
    /// Zone names to spread subnets across
    pub azs: Expr,
    pub private_subnets: Expr,
    pub database_subnets: Expr,
    pub public_subnets: Expr,
    pub enable_nat_gateway: bool,
    /// One shared NAT gateway instead of one per zone
    pub single_nat_gateway: bool,
    pub tags: Tags,
}

impl Resource for VpcModule {
    fn kind(&self) -> Kind {
        Kind::Module
    }

    fn type_name(&self) -> &str {
        VPC_MODULE_SOURCE
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("version".to_string(), Expr::string(VPC_MODULE_VERSION)),
            ("name".to_string(), Expr::string(&self.name)),
            ("cidr".to_string(), Expr::string(&self.cidr)),
            ("azs".to_string(), self.azs.clone()),
            ("private_subnets".to_string(), self.private_subnets.clone()),
            ("database_subnets".to_string(), self.database_subnets.clone()),
            ("public_subnets".to_string(), self.public_subnets.clone()),
            ("enable_nat_gateway".to_string(), Expr::Bool(self.enable_nat_gateway)),
            ("single_nat_gateway".to_string(), Expr::Bool(self.single_nat_gateway)),
            ("tags".to_string(), tags_attr(&self.tags)),
        ])
    }

    fn readable(&self) -> &'static [&'static str] {
        &[
            "vpc_id",
            "vpc_cidr_block",
            "private_subnets",
            "database_subnets",
            "public_subnets",
            "nat_public_ips",
        ]
    }

    fn taggable(&self) -> bool {
        true
    }
}
