//! `craftstack synth` - write the Terraform JSON document

use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::ui;

/// Compose the stack and write `<out>/stacks/<name>/cdk.tf.json`
pub fn run(ctx: &Context, out: &Path) -> Result<()> {
    let config = super::load_config(ctx)?;
    let stack = super::build_stack(&config)?;

    let document = declarative::synth::to_string_pretty(&stack)
        .context("Failed to serialize synthesized document")?;
    let path = write_document(out, stack.name(), &document)?;
    let fingerprint = blake3::hash(document.as_bytes()).to_hex().to_string();

    if !ctx.quiet {
        ui::success(&format!(
            "Synthesized {} declarations and {} outputs",
            stack.len(),
            stack.outputs().count()
        ));
        ui::kv("stack", stack.name());
        ui::kv("document", &path.display().to_string());
        ui::kv("fingerprint", ui::short_hash(&fingerprint));
    }
    log::debug!("document fingerprint {fingerprint}");
    Ok(())
}

/// Write the document, creating the stack directory as needed
pub fn write_document(out: &Path, stack_name: &str, document: &str) -> Result<PathBuf> {
    let path = super::document_path(out, stack_name);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    fs::write(&path, format!("{document}\n"))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_write_document_creates_stack_dir() {
        let dir = tempfile::tempdir().unwrap();
        let stack = super::super::build_stack(&Config::default()).unwrap();
        let document = declarative::synth::to_string_pretty(&stack).unwrap();

        let path = write_document(dir.path(), stack.name(), &document).unwrap();
        assert_eq!(
            path,
            dir.path().join("stacks/minecraft-cdktf/cdk.tf.json")
        );

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["//"]["metadata"]["stackName"], "minecraft-cdktf");
        assert_eq!(
            written["terraform"]["backend"]["remote"]["organization"],
            "joerx"
        );
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let synth = || {
            let stack = super::super::build_stack(&Config::default()).unwrap();
            let document = declarative::synth::to_string_pretty(&stack).unwrap();
            let path = write_document(dir.path(), stack.name(), &document).unwrap();
            fs::read(path).unwrap()
        };
        assert_eq!(synth(), synth());
    }
}
