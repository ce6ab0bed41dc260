// Stack commands
pub mod diff;
pub mod show;
pub mod synth;
pub mod versions;

use anyhow::{Context as AnyhowContext, Result};
use declarative::Stack;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::compose;
use crate::config::Config;
use crate::ui;

/// File name of the synthesized document inside a stack directory
pub const DOCUMENT_FILE: &str = "cdk.tf.json";

/// Load the configuration, apply CLI overrides and validate
pub fn load_config(ctx: &Context) -> Result<Config> {
    let mut config = Config::load(ctx.config_path.as_deref())?;
    config.apply(ctx.overrides.clone());
    config.validate()?;
    Ok(config)
}

/// Compose the configured stack
pub fn build_stack(config: &Config) -> Result<Stack> {
    let template = config
        .startup_template()
        .context("Failed to load startup template")?;
    log::debug!("startup template {}", template.source_name());
    if !config.backend.enabled {
        ui::warn("Remote backend disabled, execution state stays with the engine's default");
    }
    let stack = compose::build(
        &config.stack.name,
        &config.stack.props,
        &template,
        config.backend.remote(),
    )
    .with_context(|| format!("Failed to compose stack '{}'", config.stack.name))?;
    Ok(stack)
}

/// Path of the synthesized document for a stack under `out`
pub fn document_path(out: &Path, stack_name: &str) -> PathBuf {
    out.join("stacks").join(stack_name).join(DOCUMENT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_layout() {
        assert_eq!(
            document_path(Path::new("cdktf.out"), "minecraft-cdktf"),
            PathBuf::from("cdktf.out/stacks/minecraft-cdktf/cdk.tf.json")
        );
    }

    #[test]
    fn test_build_default_stack() {
        let stack = build_stack(&Config::default()).unwrap();
        assert_eq!(stack.name(), "minecraft-cdktf");
        assert!(stack.backend().is_some());
        assert!(stack.get("minecraftServer").is_some());
    }
}
