//! `craftstack show` - inspect the composed declaration graph

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use declarative::{Expr, Reference, Stack, StaticResolver, evaluate};
use serde_json::Value;

use crate::Context;
use crate::ui;

/// VPC attributes whose values depend on the reported zone list
const ZONE_DEPENDENT: [&str; 4] = ["azs", "private_subnets", "database_subnets", "public_subnets"];

/// Zone names are suffixed with a single letter
const MAX_ASSUMED_AZS: usize = 26;

pub fn run(ctx: &Context, assume_azs: Option<usize>) -> Result<()> {
    let config = super::load_config(ctx)?;
    let stack = super::build_stack(&config)?;

    ui::header(&format!("Stack {}", stack.name()));
    ui::kv("region", &config.stack.props.region);
    ui::kv("version", &config.stack.props.software_version);
    if let Some(backend) = stack.backend() {
        ui::kv(
            "backend",
            &format!("{}/{} on {}", backend.organization, backend.workspace, backend.hostname),
        );
    }

    show_declarations(ctx, &stack);
    show_outputs(&stack);

    if let Some(count) = assume_azs {
        show_zone_preview(&stack, &config.stack.props.region, count)?;
    }

    Ok(())
}

fn show_declarations(ctx: &Context, stack: &Stack) {
    ui::section(&format!("Declarations ({})", stack.len()));

    for declaration in stack.declarations() {
        let tag = match declaration.tags() {
            Some(tags) => format!(" {} tags", tags.len()).dimmed().to_string(),
            None => String::new(),
        };
        println!("  {} {}{}", "•".cyan(), declaration.address(), tag);

        for dependency in stack.dependencies(&declaration.name) {
            println!("      {} {}", "←".dimmed(), dependency.to_string().dimmed());
        }

        if ctx.verbose > 0 {
            for (key, value) in &declaration.attributes {
                println!("      {} = {}", key.dimmed(), display_value(value));
            }
        }
    }
}

fn show_outputs(stack: &Stack) {
    ui::section("Outputs");

    for (name, output) in stack.outputs() {
        let value = if output.sensitive {
            ui::SENSITIVE.yellow().to_string()
        } else {
            output.value.to_hcl()
        };
        println!("  {} = {}", name.bold(), value);
        if let Some(description) = &output.description {
            ui::dim(description);
        }
    }
}

/// Attribute value for display; multi-line strings are summarized
fn display_value(value: &Expr) -> String {
    match value {
        Expr::String(s) if s.contains('\n') => format!("<{} lines>", s.lines().count()),
        other => other.to_hcl(),
    }
}

fn show_zone_preview(stack: &Stack, region: &str, count: usize) -> Result<()> {
    ui::section(&format!("Zone preview ({count} reported)"));
    for (attribute, value) in zone_preview(stack, region, count)? {
        ui::kv(attribute, &value.to_string());
    }
    Ok(())
}

/// Evaluate zone-dependent VPC attributes for a hypothetical zone list
pub fn zone_preview(
    stack: &Stack,
    region: &str,
    count: usize,
) -> Result<Vec<(&'static str, Value)>> {
    if count > MAX_ASSUMED_AZS {
        bail!("--assume-azs must be at most {MAX_ASSUMED_AZS}, got {count}");
    }

    let azs = stack
        .get("azs")
        .context("Stack declares no availability zone lookup")?;
    let vpc = stack.get("vpc").context("Stack declares no VPC")?;

    let names: Vec<Value> = (b'a'..)
        .take(count)
        .map(|suffix| Value::String(format!("{region}{}", char::from(suffix))))
        .collect();
    let resolver = StaticResolver::new().with(
        Reference {
            address: azs.address(),
            attribute: "names".to_string(),
        },
        Value::Array(names),
    );

    ZONE_DEPENDENT
        .iter()
        .map(|attribute| {
            let expr = vpc
                .attributes
                .get(*attribute)
                .with_context(|| format!("VPC has no '{attribute}' attribute"))?;
            let value = evaluate(expr, &resolver)
                .with_context(|| format!("Failed to evaluate '{attribute}'"))?;
            Ok::<_, anyhow::Error>((*attribute, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stack() -> Stack {
        super::super::build_stack(&Config::default()).unwrap()
    }

    #[test]
    fn test_preview_caps_at_max_azs() {
        let preview = zone_preview(&stack(), "ap-southeast-1", 5).unwrap();
        assert_eq!(
            preview,
            vec![
                (
                    "azs",
                    json!(["ap-southeast-1a", "ap-southeast-1b", "ap-southeast-1c"])
                ),
                (
                    "private_subnets",
                    json!(["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"])
                ),
                (
                    "database_subnets",
                    json!(["10.0.10.0/24", "10.0.11.0/24", "10.0.12.0/24"])
                ),
                (
                    "public_subnets",
                    json!(["10.0.20.0/24", "10.0.21.0/24", "10.0.22.0/24"])
                ),
            ]
        );
    }

    #[test]
    fn test_preview_with_fewer_zones() {
        let preview = zone_preview(&stack(), "eu-west-1", 2).unwrap();
        assert_eq!(preview[0].1, json!(["eu-west-1a", "eu-west-1b"]));
        assert_eq!(preview[3].1, json!(["10.0.20.0/24", "10.0.21.0/24"]));
    }

    #[test]
    fn test_preview_rejects_too_many_zones() {
        assert!(zone_preview(&stack(), "eu-west-1", 27).is_err());
    }

    #[test]
    fn test_display_value_summarizes_scripts() {
        assert_eq!(display_value(&Expr::string("a\nb\nc")), "<3 lines>");
        assert_eq!(display_value(&Expr::string("t2.small")), "\"t2.small\"");
    }
}
