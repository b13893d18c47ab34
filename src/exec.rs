//! Shell-style command execution.
//!
//! Every external command (compile, archive, link, git, rm, mkdir) goes
//! through [`Shell`], which echoes the line before running it. With `-n`
//! nothing is executed, so the echoed lines form a runnable shell script.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Only errors are shown.
pub const VERBOSE_NONE: u8 = 0;
/// Normal progress output (default).
pub const VERBOSE_SOME: u8 = 1;
/// Extra detail, including housekeeping commands.
pub const VERBOSE_MORE: u8 = 2;

/// Verbosity and dry-run state, threaded through the call graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell {
    pub verbosity: u8,
    pub dry_run: bool,
}

impl Shell {
    pub fn new(verbosity: u8, dry_run: bool) -> Self {
        Self { verbosity, dry_run }
    }

    /// Print `line` when the verbosity level is at least `level`.
    pub fn echo(&self, level: u8, line: &str) {
        if self.verbosity >= level {
            println!("{line}");
        }
    }

    pub fn status(&self, line: &str) {
        self.echo(VERBOSE_SOME, line);
    }

    pub fn detail(&self, line: &str) {
        self.echo(VERBOSE_MORE, line);
    }

    /// Echo and run a command line via `sh -c`. The shell is required: build
    /// templates produce lines with globs such as `src/out/*.o`.
    pub fn run(&self, level: u8, cmdline: &str) -> Result<()> {
        self.run_in(level, None, cmdline)
    }

    pub fn run_in(&self, level: u8, dir: Option<&Path>, cmdline: &str) -> Result<()> {
        self.echo(level, cmdline);
        if self.dry_run {
            return Ok(());
        }
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(cmdline);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        let status = cmd.status()?;
        if status.success() {
            Ok(())
        } else {
            // the child already wrote its diagnostics to the terminal
            Err(Error::Silent)
        }
    }

    /// Echo and run a command, returning its stdout. `None` means the command
    /// was not executed (dry run) or exited non-zero.
    pub fn capture_in(
        &self,
        level: u8,
        dir: Option<&Path>,
        cmdline: &str,
    ) -> Result<Option<String>> {
        self.echo(level, cmdline);
        if self.dry_run {
            return Ok(None);
        }
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(cmdline);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        } else {
            Ok(None)
        }
    }

    /// Create a folder if it does not exist, echoing the equivalent script
    /// line. OK if the folder is already there.
    pub fn make_dir(&self, folder: &Path) -> Result<()> {
        let display = folder.display();
        if self.dry_run || self.verbosity >= VERBOSE_MORE {
            self.status(&format!("if test ! -d {display}; then mkdir {display}; fi"));
        }
        if !self.dry_run && !folder.is_dir() {
            std::fs::create_dir_all(folder).map_err(|_| Error::Write(display.to_string()))?;
        }
        Ok(())
    }

    /// Remove an entire folder tree. Missing folders are not an error.
    pub fn remove_dir(&self, level: u8, folder: &Path) -> Result<()> {
        self.echo(level, &format!("rm -rf {}", folder.display()));
        if !self.dry_run {
            match std::fs::remove_dir_all(folder) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(_) => return Err(Error::Write(folder.display().to_string())),
            }
        }
        Ok(())
    }

    /// Remove a single file. Missing files are not an error.
    pub fn remove_file(&self, level: u8, path: &Path) -> Result<()> {
        self.echo(level, &format!("rm -f {}", path.display()));
        if !self.dry_run {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(_) => return Err(Error::Write(path.display().to_string())),
            }
        }
        Ok(())
    }
}
