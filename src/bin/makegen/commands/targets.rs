//! `makegen targets` command

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, TargetsArgs};
use crate::commands::load_workspace;
use makegen::ops::list_targets;

pub fn execute(global: &GlobalArgs, args: TargetsArgs) -> Result<()> {
    let ws = load_workspace(global)?;
    let targets = list_targets(&ws)?;

    if args.json {
        let json = serde_json::to_string_pretty(&targets).context("failed to serialize targets")?;
        println!("{}", json);
        return Ok(());
    }

    for target in targets {
        let mut line = format!("{} ({})", target.name, target.kind.as_str());
        if !target.artifacts.is_empty() {
            line.push_str(&format!(" [{}]", target.artifacts.join(", ")));
        }
        if !target.dependencies.is_empty() {
            line.push_str(&format!(" -> {}", target.dependencies.join(", ")));
        }
        println!("{}", line);
    }
    Ok(())
}
