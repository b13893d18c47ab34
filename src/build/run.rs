//! The `run` and `test` commands: build everything, then execute targets.
//!
//! `run` defaults to the project's source-program folder (preferring one
//! literally named `src/` or `source/`); `test` defaults to the folder named
//! `test/`. Arguments after `--` pass through to the child programs.

use crate::build::core;
use crate::config::Rule;
use crate::deps;
use crate::error::{Error, Result};
use crate::exec::{Shell, VERBOSE_SOME};
use crate::project::Project;
use crate::sources;
use crate::target::{self, Target};
use std::path::Path;
use std::process::Command;

pub fn cmd_run(project: &mut Project, targets: &[String], args: &[String]) -> Result<()> {
    let default = default_run_target(project);
    if default.is_none() && targets.is_empty() {
        println!(
            "flymake error: project {} has no src/ folder or program to run",
            project.name
        );
        return Err(Error::Silent);
    }
    run_cli_targets(project, targets, args, default)
}

pub fn cmd_test(project: &mut Project, targets: &[String], args: &[String]) -> Result<()> {
    let default = default_test_target(project);
    if default.is_none() && targets.is_empty() {
        println!("flymake error: project {} has no test/ folder", project.name);
        return Err(Error::Silent);
    }
    run_cli_targets(project, targets, args, default)
}

/// The program folder `run` falls back to: the first source-rule folder,
/// with a folder literally named `src/` or `source/` taking priority.
fn default_run_target(project: &Project) -> Option<String> {
    let mut first = None;
    for folder in &project.folders {
        if folder.rule != Rule::Src {
            continue;
        }
        if let Some(base) = folder.folder.file_name().and_then(|n| n.to_str()) {
            if base == "src" || base == "source" {
                return Some(folder.folder.display().to_string());
            }
        }
        if first.is_none() {
            first = Some(folder.folder.display().to_string());
        }
    }
    first
}

/// The folder `test` falls back to: one literally named `test/`.
fn default_test_target(project: &Project) -> Option<String> {
    project
        .folders
        .iter()
        .find(|f| {
            f.folder
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|base| base == "test")
        })
        .map(|f| f.folder.display().to_string())
}

fn run_cli_targets(
    project: &mut Project,
    targets: &[String],
    args: &[String],
    default: Option<String>,
) -> Result<()> {
    // build everything first; running depends on fresh binaries
    deps::resolve_and_build(project)?;
    let root_raw = project.root.display().to_string();
    let root_target = target::resolve_target(project, &root_raw)?;
    core::build_target(project, &root_target)?;

    // all programs share the same passthrough arguments
    let argstr: String = args.iter().map(|a| format!(" {a}")).collect();

    if targets.is_empty() {
        if let Some(def) = default {
            let t = target::resolve_target(project, &def)?;
            run_target(project, &t, &argstr)?;
        }
    } else {
        for raw in targets {
            let t = target::resolve_target(project, raw)?;
            run_target(project, &t, &argstr)?;
        }
    }
    Ok(())
}

fn run_target(project: &Project, target: &Target, argstr: &str) -> Result<()> {
    let shell = project.shell();
    match target.rule {
        Rule::Src => {
            if target.file.is_some() {
                run_program(shell, &target.raw, argstr)
            } else {
                let prog = project.src_name(&target.folder);
                run_program(shell, &prog.display().to_string(), argstr)
            }
        }
        Rule::Tool => {
            if target.file.is_some() {
                run_program(shell, &target.raw, argstr)
            } else {
                run_tools(project, &target.folder, argstr)
            }
        }
        Rule::Lib | Rule::Project => {
            println!("flymake error: cannot run target {}", target.raw);
            Err(Error::Silent)
        }
    }
}

/// Run every tool executable of a tool folder, in grouping order.
fn run_tools(project: &Project, folder: &Path, argstr: &str) -> Result<()> {
    let exts = project.all_extensions();
    let Some(files) = sources::classify(folder, &exts, 1) else {
        return Err(Error::BadPath(folder.display().to_string()));
    };
    for tool in sources::group_into_tools(&files) {
        let prog = folder.join(&tool.name);
        run_program(project.shell(), &prog.display().to_string(), argstr)?;
    }
    Ok(())
}

/// Execute one program. A bare name is prefixed `./` so the shell finds it.
/// The child's exit status is its own business; only a failure to spawn is
/// an error here.
fn run_program(shell: Shell, prog: &str, argstr: &str) -> Result<()> {
    let prefixed = if prog.contains('/') {
        prog.to_string()
    } else {
        format!("./{prog}")
    };
    let cmdline = format!("{prefixed}{argstr}");
    if shell.verbosity >= VERBOSE_SOME {
        println!("\n{cmdline}\n");
    }
    if !shell.dry_run {
        Command::new("sh")
            .arg("-c")
            .arg(&cmdline)
            .status()
            .map_err(|_| Error::BadProg(prog.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::project::Options;
    use std::fs;

    fn load(base: &Path) -> Project {
        Project::load(
            base.to_path_buf(),
            Options {
                verbosity: 0,
                ..Options::default()
            },
            config::default_rules(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_default_run_target_prefers_src() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fs::create_dir_all(base.join("demo")).unwrap();
        fs::create_dir_all(base.join("src")).unwrap();
        fs::write(base.join("src/app.c"), "").unwrap();
        fs::write(base.join("demo/demo.c"), "").unwrap();
        fs::write(
            base.join("flymake.toml"),
            "[folders]\n\"demo/\" = \"--rs\"\n",
        )
        .unwrap();

        let project = load(&base);
        // demo/ is declared first, but the literal src/ wins
        let def = default_run_target(&project).unwrap();
        assert!(def.ends_with("src"));
    }

    #[test]
    fn test_default_run_target_first_src_rule() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fs::create_dir_all(base.join("demo")).unwrap();
        fs::create_dir_all(base.join("lib")).unwrap();
        fs::write(base.join("demo/demo.c"), "").unwrap();
        fs::write(base.join("lib/util.c"), "").unwrap();
        fs::write(
            base.join("flymake.toml"),
            "[folders]\n\"demo/\" = \"--rs\"\n",
        )
        .unwrap();

        let project = load(&base);
        let def = default_run_target(&project).unwrap();
        assert!(def.ends_with("demo"));
        // and no test/ folder means no test default
        assert!(default_test_target(&project).is_none());
    }

    #[test]
    fn test_default_test_target() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fs::create_dir_all(base.join("src")).unwrap();
        fs::create_dir_all(base.join("test")).unwrap();
        fs::write(base.join("src/app.c"), "").unwrap();
        fs::write(base.join("test/test_app.c"), "").unwrap();

        let project = load(&base);
        let def = default_test_target(&project).unwrap();
        assert!(def.ends_with("test"));
    }

    #[test]
    fn test_run_program_dry_run() {
        let shell = Shell::new(0, true);
        // nothing is spawned, so even a nonexistent program is fine
        run_program(shell, "no/such/prog", " --flag").unwrap();
    }
}
