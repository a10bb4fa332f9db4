//! Runs the generated Makefile with make.

use std::path::PathBuf;
use std::process::ExitStatus;

use anyhow::{Context, Result};

use crate::builder::context::BuildConfig;
use crate::util::fs::relative_path;
use crate::util::process::{find_make, ProcessBuilder};

/// Invokes make against a generated Makefile.
#[derive(Debug, Clone)]
pub struct MakeExecutor {
    program: PathBuf,
    cwd: PathBuf,
    makefile: PathBuf,
    jobs: Option<usize>,
    force_rebuild: bool,
    goals: Vec<String>,
}

impl MakeExecutor {
    /// Create an executor running `program` in `cwd`.
    pub fn new(
        program: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
        makefile: impl Into<PathBuf>,
    ) -> Self {
        MakeExecutor {
            program: program.into(),
            cwd: cwd.into(),
            makefile: makefile.into(),
            jobs: Some(1),
            force_rebuild: false,
            goals: Vec::new(),
        }
    }

    /// Create an executor using the make found on this system.
    pub fn locate(cwd: impl Into<PathBuf>, makefile: impl Into<PathBuf>) -> Result<Self> {
        let program = find_make().context(
            "could not find `make`; install GNU make or set the MAKE environment variable",
        )?;
        Ok(Self::new(program, cwd, makefile))
    }

    /// Apply the parallelism and force-rebuild settings of a build config.
    pub fn with_config(mut self, config: &BuildConfig) -> Self {
        self.jobs = config.jobs();
        self.force_rebuild = config.force_rebuild;
        self
    }

    /// Goals to build instead of the Makefile's default.
    pub fn goals(mut self, goals: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.goals = goals.into_iter().map(Into::into).collect();
        self
    }

    /// Command-line arguments passed to make.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.force_rebuild {
            args.push("-B".to_string());
        }
        match self.jobs {
            Some(n) => args.push(format!("-j{}", n)),
            None => args.push("-j".to_string()),
        }
        args.push("-f".to_string());
        args.push(
            relative_path(&self.cwd, &self.makefile)
                .to_string_lossy()
                .into_owned(),
        );
        args.push("--no-print-directory".to_string());
        args.extend(self.goals.iter().cloned());
        args
    }

    /// Run make with inherited stdio; returns its exit code.
    pub fn run(&self) -> Result<i32> {
        let process = ProcessBuilder::new(&self.program)
            .args(self.args())
            .cwd(&self.cwd);

        tracing::info!("running `{}`", process.display_command());
        let status = process.status()?;
        let code = exit_code(status);
        if code != 0 {
            tracing::debug!("make exited with status {}", code);
        }
        Ok(code)
    }
}

/// Exit code to mirror; a signal-terminated make maps to 128 + signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
