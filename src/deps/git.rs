//! Git dependency materialization.
//!
//! A git dependency is cloned into `<root>/deps/<name>/` and optionally
//! pinned by `branch`, `sha`, or a `version` range resolved by scanning the
//! commit log for semver tokens. An existing `deps/<name>/.git/` is reused
//! without touching the network.

use crate::config::{DepDecl, Manifest};
use crate::error::{Error, Result};
use crate::exec::{Shell, VERBOSE_MORE};
use crate::version;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Clone and pin one git dependency. Returns the version discovered in the
/// log when a `version` range drove the checkout.
pub fn materialize(
    shell: &Shell,
    man: &Manifest,
    decl: &DepDecl,
    url: &str,
    folder: &Path,
) -> Result<Option<String>> {
    if decl.version.is_some() && decl.sha.is_some() {
        let offset = decl
            .version
            .as_ref()
            .map_or(decl.span.start, |v| v.span().start);
        return Err(man.error(offset, "cannot specify both version and sha").into());
    }

    // stale partial checkouts are removed before cloning fresh
    shell.remove_dir(VERBOSE_MORE, folder)?;
    shell.status(&format!("# Cloning {url} into {}", folder.display()));

    let mut cmdline = format!("git clone -q {url}");
    if let Some(branch) = &decl.branch {
        cmdline.push_str(&format!(" -b {}", branch.get_ref()));
    }
    cmdline.push_str(&format!(" {}", folder.display()));
    clone(shell, &decl.name, url, &cmdline)?;

    if let Some(sha) = &decl.sha {
        checkout(shell, folder, sha.get_ref())
            .map_err(|_| Error::Manifest(man.error(sha.span().start, "SHA not found")))?;
        return Ok(None);
    }

    if let Some(range) = &decl.version {
        if shell.dry_run {
            shell.echo(VERBOSE_MORE, "git log --oneline");
            return Ok(None);
        }
        let log = shell
            .capture_in(VERBOSE_MORE, Some(folder), "git log --oneline")?
            .unwrap_or_default();
        let Some((sha, ver)) = version::find_sha_for_range(&log, range.get_ref()) else {
            return Err(man.error(range.span().start, "version not found").into());
        };
        checkout(shell, folder, &sha)
            .map_err(|_| Error::Manifest(man.error(range.span().start, "SHA not found")))?;
        return Ok(Some(ver));
    }

    Ok(None)
}

fn checkout(shell: &Shell, folder: &Path, sha: &str) -> Result<()> {
    shell.run_in(VERBOSE_MORE, Some(folder), &format!("git checkout -q {sha}"))
}

/// Run the clone command. At normal verbosity a spinner stands in for git's
/// silenced progress output; at `-v=2` or in a dry run the plain command
/// line is echoed instead.
fn clone(shell: &Shell, name: &str, url: &str, cmdline: &str) -> Result<()> {
    if shell.dry_run || shell.verbosity >= VERBOSE_MORE {
        return shell
            .run(VERBOSE_MORE, cmdline)
            .map_err(|_| Error::CloneFailed(url.to_string()));
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Cloning {name}..."));
    pb.enable_steady_tick(Duration::from_millis(100));

    let output = Command::new("sh").arg("-c").arg(cmdline).output();
    match output {
        Ok(out) if out.status.success() => {
            pb.finish_with_message(format!("{} Cloned {name}", "✓".green()));
            Ok(())
        }
        Ok(out) => {
            pb.finish_with_message(format!("{} Failed {name}", "x".red()));
            let stderr = String::from_utf8_lossy(&out.stderr);
            if !stderr.is_empty() {
                eprint!("{stderr}");
            }
            Err(Error::CloneFailed(url.to_string()))
        }
        Err(_) => {
            pb.finish_with_message(format!("{} Failed {name}", "x".red()));
            Err(Error::CloneFailed(url.to_string()))
        }
    }
}
