//! Generated key material and its registration as an EC2 key pair

use declarative::{Attributes, Expr, Kind, Resource};

use super::{Tags, tags_attr};

/// Asymmetric key generated by the TLS provider at apply time
///
/// The private half ends up in engine state; treat every reference to
/// `private_key_pem` as sensitive.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    pub algorithm: String,
    pub rsa_bits: u32,
}

impl PrivateKey {
    pub fn rsa(bits: u32) -> Self {
        Self {
            algorithm: "RSA".to_string(),
            rsa_bits: bits,
        }
    }
}

impl Resource for PrivateKey {
    fn kind(&self) -> Kind {
        Kind::Resource
    }

    fn type_name(&self) -> &str {
        "tls_private_key"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("algorithm".to_string(), Expr::string(&self.algorithm)),
            ("rsa_bits".to_string(), Expr::from(self.rsa_bits)),
        ])
    }

    fn readable(&self) -> &'static [&'static str] {
        &[
            "id",
            "private_key_pem",
            "private_key_openssh",
            "public_key_pem",
            "public_key_openssh",
            "public_key_fingerprint_sha256",
        ]
    }
}

/// Remote key pair; the platform makes the name unique from the prefix
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub key_name_prefix: String,
    pub public_key: Expr,
    pub tags: Tags,
}

impl Resource for KeyPair {
    fn kind(&self) -> Kind {
        Kind::Resource
    }

    fn type_name(&self) -> &str {
        "aws_key_pair"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("key_name_prefix".to_string(), Expr::string(&self.key_name_prefix)),
            ("public_key".to_string(), self.public_key.clone()),
            ("tags".to_string(), tags_attr(&self.tags)),
        ])
    }

    fn readable(&self) -> &'static [&'static str] {
        &["id", "arn", "key_name", "key_pair_id", "fingerprint"]
    }

    fn taggable(&self) -> bool {
        true
    }
}
