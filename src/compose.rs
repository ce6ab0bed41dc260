//! Deployment descriptor builder
//!
//! Composes the Minecraft stack in a single linear pass. Each step adds
//! declarations that reference handles from earlier steps; ordering and
//! convergence are left to the provisioning engine.
//!
//! Values that only exist at apply time (zone list, usable zone count,
//! subnet slices, shuffle result, image id) stay deferred expressions.

use declarative::{Expr, Output, RemoteBackend, Stack, fns};
use thiserror::Error;

use crate::config::{SUBNET_NEWBITS, StackProps};
use crate::resource::{
    AmiLookup, AvailabilityZones, AwsProvider, Instance, KeyPair, PrivateKey, RandomProvider,
    SecurityGroup, SecurityRule, Shuffle, Tags, TlsProvider, VpcModule,
};
use crate::template::StartupTemplate;
use crate::versions::{self, UnknownVersion};

pub const SSH_PORT: u16 = 22;
pub const MINECRAFT_PORT: u16 = 25565;
pub const INSTANCE_TYPE: &str = "t2.small";
pub const KEY_BITS: u32 = 4096;

/// Errors that abort composition
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersion),

    #[error("invalid declaration graph: {0}")]
    Graph(#[from] declarative::Error),
}

/// Subnet category within the VPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubnetTier {
    Private,
    Database,
    Public,
}

impl SubnetTier {
    pub const ALL: [SubnetTier; 3] = [Self::Private, Self::Database, Self::Public];

    /// First subnet index of the tier; tiers stay disjoint while max_azs <= 10
    pub fn offset(self) -> u32 {
        match self {
            Self::Private => 0,
            Self::Database => 10,
            Self::Public => 20,
        }
    }
}

/// Sub-block expressions of a tier for every zone up to the ceiling
///
/// The engine cannot size a list from a count it only learns at apply
/// time, so blocks are generated for `max_azs` zones and sliced later.
pub fn tier_blocks(vpc_cidr: &str, max_azs: u32, tier: SubnetTier) -> Vec<Expr> {
    (0..max_azs)
        .map(|i| fns::cidrsubnet(vpc_cidr, u32::from(SUBNET_NEWBITS), tier.offset() + i))
        .collect()
}

/// Tag set carried by every taggable declaration
pub fn common_tags(props: &StackProps, stack_name: &str) -> Tags {
    Tags::from([
        ("app:namespace".to_string(), props.namespace.clone()),
        ("app:environment".to_string(), props.environment.clone()),
        ("cdktf:stack-name".to_string(), stack_name.to_string()),
    ])
}

/// Compose a complete stack, or nothing at all
pub fn build(
    name: &str,
    props: &StackProps,
    template: &StartupTemplate,
    backend: Option<RemoteBackend>,
) -> Result<Stack, ComposeError> {
    let mut stack = Stack::new(name);
    compose(&mut stack, props, template)?;
    if let Some(backend) = backend {
        log::debug!(
            "remote backend {}/{} on {}",
            backend.organization,
            backend.workspace,
            backend.hostname
        );
        stack.set_backend(backend);
    }
    Ok(stack)
}

/// Append the Minecraft server declarations to `stack`
///
/// The version lookup happens before anything is declared, so an unknown
/// version leaves the stack untouched.
pub fn compose(
    stack: &mut Stack,
    props: &StackProps,
    template: &StartupTemplate,
) -> Result<(), ComposeError> {
    let download_url = versions::download_url(&props.software_version)?;
    log::info!(
        "Composing stack '{}' for Minecraft {}",
        stack.name(),
        props.software_version
    );

    stack.add(
        "aws",
        AwsProvider {
            region: props.region.clone(),
        },
    )?;
    stack.add("tls", TlsProvider)?;
    stack.add("random", RandomProvider)?;

    let tags = common_tags(props, stack.name());

    // Zones: count and names only known at apply time
    let azs = stack.add("azs", AvailabilityZones::default())?;
    let num_azs = fns::min([fns::length(azs.attr("names")), Expr::from(props.max_azs)]);
    let use_azs = fns::slice(azs.attr("names"), 0u32, num_azs.clone());

    let subnets = |tier: SubnetTier| {
        fns::slice(
            Expr::List(tier_blocks(&props.vpc_cidr, props.max_azs, tier)),
            0u32,
            num_azs.clone(),
        )
    };

    let vpc = stack.add(
        "vpc",
        VpcModule {
            name: format!("{}-vpc", props.namespace),
            cidr: props.vpc_cidr.clone(),
            azs: use_azs,
            private_subnets: subnets(SubnetTier::Private),
            database_subnets: subnets(SubnetTier::Database),
            public_subnets: subnets(SubnetTier::Public),
            enable_nat_gateway: true,
            single_nat_gateway: true,
            tags: tags.clone(),
        },
    )?;

    let sg = stack.add(
        "minecraftSg",
        SecurityGroup {
            vpc_id: vpc.attr("vpc_id"),
            ingress: vec![
                SecurityRule::tcp("SSH ingress", SSH_PORT, &props.allow_ingress_from),
                SecurityRule::tcp(
                    "Minecraft server ingress",
                    MINECRAFT_PORT,
                    &props.allow_ingress_from,
                ),
            ],
            egress: vec![SecurityRule::all_traffic(
                "Internet egress",
                &["0.0.0.0/0".to_string()],
            )],
            tags: tags.clone(),
        },
    )?;

    let tls_key = stack.add("tlsKeyPair", PrivateKey::rsa(KEY_BITS))?;
    let key_pair = stack.add(
        "keypair",
        KeyPair {
            key_name_prefix: props.namespace.clone(),
            public_key: tls_key.attr("public_key_openssh"),
            tags,
        },
    )?;

    let ami = stack.add("ami", AmiLookup::amazon_linux_2())?;

    let shuffle = stack.add(
        "shuffle",
        Shuffle {
            input: vpc.attr("public_subnets"),
        },
    )?;

    let instance = stack.add(
        "minecraftServer",
        Instance {
            ami: ami.attr("id"),
            instance_type: INSTANCE_TYPE.to_string(),
            associate_public_ip_address: true,
            subnet_id: fns::element(shuffle.attr("result"), 0u32),
            vpc_security_group_ids: vec![sg.attr("id")],
            key_name: key_pair.attr("key_name"),
            user_data: template.render(download_url),
        },
    )?;

    stack.output(
        "publicIp",
        Output::new(instance.attr("public_ip")).with_description("Public IP of the server"),
    )?;
    stack.output(
        "privateIp",
        Output::new(instance.attr("private_ip")).with_description("Private IP of the server"),
    )?;
    stack.output(
        "instanceId",
        Output::new(instance.attr("id")).with_description("EC2 instance id"),
    )?;
    stack.output(
        "privateKey",
        Output::sensitive(tls_key.attr("private_key_pem"))
            .with_description("SSH private key (PEM)"),
    )?;

    log::info!(
        "Composed {} declarations and {} outputs",
        stack.len(),
        stack.outputs().count()
    );
    Ok(())
}
