//! `makegen generate` command

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::{GenerateArgs, GlobalArgs};
use crate::commands::{generate_options, load_user_config, load_workspace};
use makegen::ops::{generate, plan};

pub fn execute(global: &GlobalArgs, args: GenerateArgs) -> Result<()> {
    let ws = load_workspace(global)?;
    let config = load_user_config(&ws);
    let opts = generate_options(&args.flags, &config, false, None);

    if args.stdout || args.plan {
        let script = plan(&ws, &opts.config)?;
        let output = if args.plan {
            let mut json = serde_json::to_string_pretty(&script)
                .context("failed to serialize rule plan")?;
            json.push('\n');
            json
        } else {
            script.to_string()
        };
        io::stdout()
            .write_all(output.as_bytes())
            .context("failed to write to stdout")?;
        return Ok(());
    }

    let result = generate(&ws, &opts)?;
    eprintln!(
        "   Generated {} ({} target(s))",
        result.makefile.display(),
        result.script.blocks.len()
    );
    Ok(())
}
