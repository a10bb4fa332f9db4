//! `makegen deps` command

use anyhow::Result;

use crate::cli::{DepsArgs, GlobalArgs};
use crate::commands::load_workspace;
use makegen::ops::transitive_deps;

pub fn execute(global: &GlobalArgs, args: DepsArgs) -> Result<()> {
    let ws = load_workspace(global)?;

    for name in transitive_deps(&ws, &args.target)? {
        println!("{}", name);
    }
    Ok(())
}
