//! Compute instance

use declarative::{Attributes, Expr, Kind, Resource};

#[derive(Debug, Clone)]
pub struct Instance {
    pub ami: Expr,
    pub instance_type: String,
    pub associate_public_ip_address: bool,
    pub subnet_id: Expr,
    pub vpc_security_group_ids: Vec<Expr>,
    pub key_name: Expr,
    /// Boot script, passed verbatim
    pub user_data: String,
}

impl Resource for Instance {
    fn kind(&self) -> Kind {
        Kind::Resource
    }

    fn type_name(&self) -> &str {
        "aws_instance"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("ami".to_string(), self.ami.clone()),
            ("instance_type".to_string(), Expr::string(&self.instance_type)),
            (
                "associate_public_ip_address".to_string(),
                Expr::Bool(self.associate_public_ip_address),
            ),
            ("subnet_id".to_string(), self.subnet_id.clone()),
            (
                "vpc_security_group_ids".to_string(),
                Expr::List(self.vpc_security_group_ids.clone()),
            ),
            ("key_name".to_string(), self.key_name.clone()),
            ("user_data".to_string(), Expr::string(&self.user_data)),
        ])
    }

    fn readable(&self) -> &'static [&'static str] {
        &["id", "arn", "public_ip", "private_ip", "public_dns"]
    }
}
