//! `craftstack versions` - list the download table

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;
use crate::versions;

pub fn run(ctx: &Context) -> Result<()> {
    if ctx.quiet {
        for version in versions::known() {
            println!("{version}");
        }
        return Ok(());
    }

    ui::header("Minecraft Versions");
    for (version, url) in versions::entries() {
        let marker = if *version == versions::DEFAULT_VERSION {
            " (default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", version.bold(), marker);
        ui::dim(url);
    }
    Ok(())
}
