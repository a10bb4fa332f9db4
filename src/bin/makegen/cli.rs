//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// makegen - generates a Makefile for a C project and runs make
#[derive(Parser)]
#[command(name = "makegen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Path to Makegen.toml (defaults to searching upward from the current directory)
    #[arg(long, global = true, env = "MAKEGEN_MANIFEST")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the Makefile and run make
    Build(BuildArgs),

    /// Generate the Makefile without running make
    Generate(GenerateArgs),

    /// Show the transitive dependencies of a target
    Deps(DepsArgs),

    /// List the targets declared in Makegen.toml
    Targets(TargetsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by `build` and `generate`.
#[derive(Args, Clone)]
pub struct FlagArgs {
    /// Build with the release flag set
    #[arg(long)]
    pub release: bool,

    /// Add the developer flag set
    #[arg(long)]
    pub dev: bool,

    /// Link executables dynamically
    #[arg(long)]
    pub dynamic: bool,

    /// Extra compiler flag (repeatable)
    #[arg(long = "cflag", value_name = "FLAG", allow_hyphen_values = true)]
    pub cflags: Vec<String>,

    /// Where to write the Makefile (relative to the project root)
    #[arg(long, value_name = "PATH")]
    pub makefile: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub flags: FlagArgs,

    /// Force rebuilding every target
    #[arg(short = 'B', long = "force")]
    pub force: bool,

    /// Number of parallel make jobs (0 = unbounded)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Make goals to build (defaults to the Makefile's default goal)
    pub goals: Vec<String>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub flags: FlagArgs,

    /// Print the Makefile instead of writing it
    #[arg(long, conflicts_with = "plan")]
    pub stdout: bool,

    /// Print the resolved rule plan as JSON instead of writing the Makefile
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Target name
    pub target: String,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
