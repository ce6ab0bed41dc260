//! `craftstack diff` - preview what a fresh synthesis would change
//!
//! Compares against the document written by the last `synth`, not against
//! live infrastructure.

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::{Change, DiffSummary, DocumentDiff, diff_documents, group_by_block};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, out: &Path) -> Result<()> {
    let config = super::load_config(ctx)?;
    let stack = super::build_stack(&config)?;

    ui::header("Synthesis Diff");

    let path = super::document_path(out, stack.name());
    let new_text = declarative::synth::to_string_pretty(&stack)
        .context("Failed to serialize synthesized document")?;
    let new_doc = declarative::synth::synthesize(&stack);

    let (old_text, old_doc) = if path.exists() {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc: Value = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        (text, doc)
    } else {
        ui::info(&format!(
            "No previous synthesis at {}, everything is new",
            path.display()
        ));
        (String::new(), Value::Null)
    };

    let diffs = diff_documents(&old_doc, &new_doc);
    let summary = DiffSummary::from_diffs(&diffs);

    if !summary.has_changes() {
        println!();
        ui::success("No changes - synthesized document is up to date");
        return Ok(());
    }

    for (block, entries) in group_by_block(&diffs) {
        ui::section(&block);
        for diff in entries {
            print_diff(diff);
        }
    }

    if ctx.verbose > 0 {
        ui::section("Document");
        show_text_diff(&old_text, &format!("{new_text}\n"));
    }

    println!();
    println!(
        "  {} to add, {} to change, {} to remove",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
    Ok(())
}

fn print_diff(diff: &DocumentDiff) {
    match &diff.change {
        Change::Added => println!("  {} {}", "+".green(), diff.address),
        Change::Removed => println!("  {} {}", "-".red(), diff.address),
        Change::Modified { attributes } => {
            println!("  {} {}", "~".yellow(), diff.address);
            for attribute in attributes {
                ui::dim(&format!("  {attribute}"));
            }
        }
    }
}

/// Line diff of the two documents using the `similar` crate
fn show_text_diff(old: &str, new: &str) {
    let diff = similar::TextDiff::from_lines(old, new);

    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => print!("    {}", format!("- {change}").red()),
            similar::ChangeTag::Insert => print!("    {}", format!("+ {change}").green()),
            similar::ChangeTag::Equal => {}
        }
    }
}
