//! Configuration for the Minecraft stack
//!
//! Loaded from `craftstack.toml`. Every section is optional; a missing
//! `[stack]` section composes the stack the project has always shipped.
//!
//! ```toml
//! [stack]
//! name = "minecraft-cdktf"
//! namespace = "mc"
//! environment = "sandbox"
//! region = "ap-southeast-1"
//! max_azs = 2
//! allow_ingress_from = ["203.0.113.0/24"]
//!
//! [backend]
//! organization = "joerx"
//! workspace = "minecraft-cdktf"
//!
//! [template]
//! path = "assets/init.sh"
//! ```

use anyhow::{Context, Result, bail};
use declarative::{Ipv4Cidr, RemoteBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::template::StartupTemplate;
use crate::versions;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "craftstack.toml";

/// Upper bound keeping the per-tier subnet offsets from colliding
pub const MAX_AZS_LIMIT: u32 = 10;

/// Prefix bits added to the VPC block for each subnet
pub const SUBNET_NEWBITS: u8 = 8;

// ============================================================================
// Stack Props
// ============================================================================

/// Input record of the deployment descriptor builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackProps {
    pub namespace: String,
    pub environment: String,
    pub region: String,
    #[serde(default = "default_max_azs")]
    pub max_azs: u32,
    #[serde(default = "default_vpc_cidr")]
    pub vpc_cidr: String,
    #[serde(default = "default_software_version", alias = "minecraft_version")]
    pub software_version: String,
    #[serde(default = "default_allow_ingress_from")]
    pub allow_ingress_from: Vec<String>,
}

fn default_max_azs() -> u32 {
    3
}

fn default_vpc_cidr() -> String {
    "10.0.0.0/16".to_string()
}

fn default_software_version() -> String {
    versions::DEFAULT_VERSION.to_string()
}

fn default_allow_ingress_from() -> Vec<String> {
    vec!["0.0.0.0/0".to_string()]
}

impl StackProps {
    /// Props with every optional field at its default
    pub fn new(
        namespace: impl Into<String>,
        environment: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            environment: environment.into(),
            region: region.into(),
            max_azs: default_max_azs(),
            vpc_cidr: default_vpc_cidr(),
            software_version: default_software_version(),
            allow_ingress_from: default_allow_ingress_from(),
        }
    }

    /// Validate everything that can be checked before composition
    ///
    /// Unknown software versions are reported by composition.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("namespace", &self.namespace),
            ("environment", &self.environment),
            ("region", &self.region),
        ] {
            if value.trim().is_empty() {
                bail!("'{field}' must not be empty");
            }
        }

        if !self
            .namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!(
                "namespace '{}' may only contain letters, digits, '-' and '_'",
                self.namespace
            );
        }

        if !(1..=MAX_AZS_LIMIT).contains(&self.max_azs) {
            bail!(
                "max_azs must be between 1 and {MAX_AZS_LIMIT}, got {}",
                self.max_azs
            );
        }

        let vpc: Ipv4Cidr = self
            .vpc_cidr
            .parse()
            .with_context(|| format!("Invalid vpc_cidr '{}'", self.vpc_cidr))?;
        if vpc.prefix_len() + SUBNET_NEWBITS > 32 {
            bail!(
                "vpc_cidr {vpc} is too small to carve /{} subnets",
                vpc.prefix_len() + SUBNET_NEWBITS
            );
        }

        if self.allow_ingress_from.is_empty() {
            bail!("allow_ingress_from must list at least one CIDR block");
        }
        for cidr in &self.allow_ingress_from {
            cidr.parse::<Ipv4Cidr>()
                .with_context(|| format!("Invalid allow_ingress_from entry '{cidr}'"))?;
        }

        Ok(())
    }
}

// ============================================================================
// Config File
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Stack name, also the `cdktf:stack-name` tag value
    #[serde(default = "default_stack_name")]
    pub name: String,
    #[serde(flatten)]
    pub props: StackProps,
}

fn default_stack_name() -> String {
    "minecraft-cdktf".to_string()
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: default_stack_name(),
            props: StackProps::new("minecraft-cdktf", "sandbox", "ap-southeast-1"),
        }
    }
}

/// Remote execution-state backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Set to false to keep state wherever the engine defaults to
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default = "default_stack_name")]
    pub workspace: String,
}

fn default_true() -> bool {
    true
}

fn default_hostname() -> String {
    "app.terraform.io".to_string()
}

fn default_organization() -> String {
    "joerx".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hostname: default_hostname(),
            organization: default_organization(),
            workspace: default_stack_name(),
        }
    }
}

impl BackendConfig {
    pub fn remote(&self) -> Option<RemoteBackend> {
        self.enabled.then(|| RemoteBackend {
            hostname: self.hostname.clone(),
            organization: self.organization.clone(),
            workspace: self.workspace.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Startup script template; the bundled one when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// The whole `craftstack.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub template: TemplateConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Command-line overrides applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub namespace: Option<String>,
    pub environment: Option<String>,
    pub region: Option<String>,
    pub software_version: Option<String>,
}

impl Config {
    /// Load config from an explicit path, or `craftstack.toml` if present
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// yields the built-in configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (expand(p), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                bail!("Config file not found: {}", path.display());
            }
            log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            return Ok(Self {
                base_dir: PathBuf::from("."),
                ..Self::default()
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML config text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format")
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, overrides: Overrides) {
        let props = &mut self.stack.props;
        if let Some(namespace) = overrides.namespace {
            props.namespace = namespace;
        }
        if let Some(environment) = overrides.environment {
            props.environment = environment;
        }
        if let Some(region) = overrides.region {
            props.region = region;
        }
        if let Some(version) = overrides.software_version {
            props.software_version = version;
        }
    }

    pub fn validate(&self) -> Result<()> {
        // The name becomes a directory under the output path
        if !declarative::is_valid_name(&self.stack.name) {
            bail!(
                "stack name '{}' must start with a letter or underscore and contain only letters, digits, '_' or '-'",
                self.stack.name
            );
        }
        self.stack
            .props
            .validate()
            .with_context(|| format!("Invalid stack '{}'", self.stack.name))
    }

    /// Load the configured startup template, or the bundled one
    pub fn startup_template(&self) -> Result<StartupTemplate> {
        match &self.template.path {
            Some(path) => {
                let path = self.base_dir.join(expand(Path::new(path)));
                StartupTemplate::load(&path).map_err(Into::into)
            }
            None => StartupTemplate::bundled().map_err(Into::into),
        }
    }
}

/// Expand `~` in a path
fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_builder_contract() {
        let props = StackProps::new("mc", "sandbox", "eu-west-1");
        assert_eq!(props.max_azs, 3);
        assert_eq!(props.vpc_cidr, "10.0.0.0/16");
        assert_eq!(props.software_version, "1.19.2");
        assert_eq!(props.allow_ingress_from, vec!["0.0.0.0/0".to_string()]);
        props.validate().unwrap();
    }

    #[test]
    fn test_parse_example_config() {
        let config = Config::parse(
            r#"
[stack]
name = "survival"
namespace = "mc"
environment = "prod"
region = "eu-central-1"
max_azs = 2
allow_ingress_from = ["203.0.113.0/24", "198.51.100.7/32"]

[backend]
organization = "acme"
workspace = "survival-prod"

[template]
path = "scripts/boot.sh"
"#,
        )
        .unwrap();

        assert_eq!(config.stack.name, "survival");
        assert_eq!(config.stack.props.max_azs, 2);
        assert_eq!(config.stack.props.vpc_cidr, "10.0.0.0/16");
        assert_eq!(config.stack.props.allow_ingress_from.len(), 2);
        assert_eq!(config.backend.hostname, "app.terraform.io");
        assert_eq!(config.backend.workspace, "survival-prod");
        assert_eq!(config.template.path.as_deref(), Some("scripts/boot.sh"));
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_config_is_the_shipped_stack() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.stack, StackConfig::default());
        assert_eq!(config.stack.props.namespace, "minecraft-cdktf");
        assert_eq!(config.stack.props.region, "ap-southeast-1");
        assert!(config.backend.remote().is_some());
    }

    #[test]
    fn test_stack_section_requires_identity_fields() {
        let err = Config::parse("[stack]\nnamespace = \"mc\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("environment"));
    }

    #[test]
    fn test_minecraft_version_alias() {
        let config = Config::parse(
            "[stack]\nnamespace = \"mc\"\nenvironment = \"dev\"\nregion = \"us-east-1\"\nminecraft_version = \"1.19.2\"\n",
        )
        .unwrap();
        assert_eq!(config.stack.props.software_version, "1.19.2");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = StackProps::new("mc", "sandbox", "eu-west-1");

        let cases: Vec<(StackProps, &str)> = vec![
            (StackProps { max_azs: 0, ..base.clone() }, "max_azs"),
            (StackProps { max_azs: 11, ..base.clone() }, "max_azs"),
            (StackProps { vpc_cidr: "10.0.0.0".into(), ..base.clone() }, "vpc_cidr"),
            (StackProps { vpc_cidr: "10.0.0.0/26".into(), ..base.clone() }, "too small"),
            (
                StackProps { allow_ingress_from: vec!["everyone".into()], ..base.clone() },
                "allow_ingress_from",
            ),
            (StackProps { allow_ingress_from: vec![], ..base.clone() }, "allow_ingress_from"),
            (StackProps { region: " ".into(), ..base.clone() }, "region"),
            (StackProps { namespace: "mc server".into(), ..base.clone() }, "namespace"),
        ];

        for (props, needle) in cases {
            let err = props.validate().unwrap_err();
            assert!(
                format!("{err:#}").contains(needle),
                "expected '{needle}' in: {err:#}"
            );
        }
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply(Overrides {
            namespace: Some("mc".into()),
            region: Some("us-west-2".into()),
            ..Overrides::default()
        });
        assert_eq!(config.stack.props.namespace, "mc");
        assert_eq!(config.stack.props.region, "us-west-2");
        assert_eq!(config.stack.props.environment, "sandbox");
    }

    #[test]
    fn test_load_resolves_template_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("boot.sh"), "echo ${downloadUrl}").unwrap();
        let path = dir.path().join("craftstack.toml");
        std::fs::write(&path, "[template]\npath = \"boot.sh\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.base_dir, dir.path());
        let template = config.startup_template().unwrap();
        assert_eq!(template.render("u"), "echo u");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_validate_rejects_unsafe_stack_names() {
        for name in ["", "../x", "a/b", "stacks/../../etc"] {
            let mut config = Config::default();
            config.stack.name = name.to_string();
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains("stack name"),
                "expected '{name}' to be rejected: {err:#}"
            );
        }

        let mut config = Config::default();
        config.stack.name = "survival_prod-2".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn test_disabled_backend() {
        let config = Config::parse("[backend]\nenabled = false\n").unwrap();
        assert_eq!(config.backend.remote(), None);
    }
}
