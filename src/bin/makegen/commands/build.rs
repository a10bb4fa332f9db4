//! `makegen build` command

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalArgs};
use crate::commands::{generate_options, load_user_config, load_workspace};
use makegen::ops::{build, BuildOptions};

pub fn execute(global: &GlobalArgs, args: BuildArgs) -> Result<i32> {
    let ws = load_workspace(global)?;
    let config = load_user_config(&ws);

    let opts = BuildOptions {
        generate: generate_options(&args.flags, &config, args.force, args.jobs),
        goals: args.goals,
    };

    let code = build(&ws, &opts)?;
    if code != 0 {
        tracing::error!("make failed with exit status {}", code);
    }
    Ok(code)
}
