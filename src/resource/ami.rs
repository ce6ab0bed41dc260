//! Machine image lookup

use declarative::{Attributes, Expr, Kind, Resource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmiFilter {
    pub name: String,
    pub values: Vec<String>,
}

impl AmiFilter {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            values: values.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Read-only query for an image; resolved by the engine
#[derive(Debug, Clone)]
pub struct AmiLookup {
    pub most_recent: bool,
    pub filters: Vec<AmiFilter>,
}

impl AmiLookup {
    /// Latest Amazon Linux 2 HVM image on EBS
    pub fn amazon_linux_2() -> Self {
        Self {
            most_recent: true,
            filters: vec![
                AmiFilter::new("owner-alias", &["amazon"]),
                AmiFilter::new("name", &["amzn2-ami-hvm-*-x86_64-ebs"]),
            ],
        }
    }
}

impl Resource for AmiLookup {
    fn kind(&self) -> Kind {
        Kind::Data
    }

    fn type_name(&self) -> &str {
        "aws_ami"
    }

    fn attributes(&self) -> Attributes {
        let filters = self
            .filters
            .iter()
            .map(|f| {
                Expr::map([
                    ("name", Expr::string(&f.name)),
                    ("values", Expr::list(f.values.iter())),
                ])
            })
            .collect();
        Attributes::from([
            ("most_recent".to_string(), Expr::Bool(self.most_recent)),
            ("filter".to_string(), Expr::List(filters)),
        ])
    }

    fn readable(&self) -> &'static [&'static str] {
        &["id", "arn", "name", "image_id", "architecture"]
    }
}
