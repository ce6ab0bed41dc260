use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "craftstack")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Synthesize the deployment descriptor of a Minecraft server on AWS", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to ./craftstack.toml when present)
    #[arg(short, long, global = true, env = "CRAFTSTACK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags taking precedence over the config file
#[derive(Args, Default)]
pub struct OverrideArgs {
    /// Resource name prefix
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Environment tag value
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Cloud region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Minecraft server version
    #[arg(long = "mc-version", global = true, value_name = "VERSION")]
    pub software_version: Option<String>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            namespace: args.namespace,
            environment: args.environment,
            region: args.region,
            software_version: args.software_version,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Compose the stack and write the Terraform JSON document
    Synth(SynthArgs),

    /// List declarations, their references and the stack outputs
    Show(ShowArgs),

    /// Compare a fresh synthesis with the document on disk
    Diff(DiffArgs),

    /// List supported Minecraft versions
    Versions,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct SynthArgs {
    /// Output directory
    #[arg(short, long, default_value = "cdktf.out")]
    pub out: PathBuf,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Preview zone-dependent values for this many reported zones
    #[arg(long, value_name = "N")]
    pub assume_azs: Option<usize>,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Output directory holding the previous synthesis
    #[arg(short, long, default_value = "cdktf.out")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_synth_with_overrides() {
        let cli = Cli::try_parse_from([
            "craftstack",
            "synth",
            "--out",
            "build",
            "--namespace",
            "mc",
            "--mc-version",
            "1.19.2",
        ])
        .unwrap();
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        assert_eq!(args.out, PathBuf::from("build"));

        let overrides = Overrides::from(cli.overrides);
        assert_eq!(overrides.namespace.as_deref(), Some("mc"));
        assert_eq!(overrides.software_version.as_deref(), Some("1.19.2"));
        assert!(overrides.region.is_none());
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = Cli::try_parse_from(["craftstack", "-vv", "show"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Show(ShowArgs { assume_azs: None })));
    }

    #[test]
    fn test_parse_show_assume_azs() {
        let cli = Cli::try_parse_from(["craftstack", "show", "--assume-azs", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Show(ShowArgs {
                assume_azs: Some(2)
            })
        ));
    }
}
