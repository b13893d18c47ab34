//! The incremental compiler driver and the three folder builders.
//!
//! Library folders compile then archive, source folders compile then link a
//! single program, tool folders link one executable per basename-prefix
//! group. A whole-project build runs every library folder first so programs
//! can link against fresh archives.

use crate::config::{self, Rule};
use crate::error::{Error, Result};
use crate::exec::VERBOSE_SOME;
use crate::project::{nonempty, Project};
use crate::sources::{self, Tool};
use crate::target::Target;
use std::fs;
use std::path::{Path, PathBuf};

const OUT_FOLDER: &str = "out";

/// `folder` + `rest` as a command-line path; an empty folder is the current
/// one and contributes no prefix.
fn join_display(folder: &Path, rest: &str) -> String {
    if folder.as_os_str().is_empty() {
        rest.to_string()
    } else {
        format!("{}/{rest}", folder.display())
    }
}

/// Compile one source file into `out_dir` if its object is stale or missing.
/// Returns whether a compile was issued.
fn compile_file(project: &mut Project, out_dir: &Path, src: &Path) -> Result<bool> {
    project.src_files += 1;

    let ext = src
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Some(rule) = config::find_rule(&project.manifest.compilers, ext).cloned() else {
        return Err(Error::BadPath(src.display().to_string()));
    };

    let meta = fs::metadata(src).map_err(|_| Error::BadPath(src.display().to_string()))?;
    if !meta.is_file() {
        return Err(Error::BadPath(src.display().to_string()));
    }

    let out = out_dir.join(format!("{}.o", sources::stem_of(src)));

    // out/file.o newer than file.c means nothing to do, unless -B forces it
    if !project.opts.rebuild {
        if let (Ok(src_time), Ok(out_time)) = (
            meta.modified(),
            fs::metadata(&out).and_then(|m| m.modified()),
        ) {
            if out_time >= src_time {
                return Ok(false);
            }
        }
    }

    let cmdline = rule.compile_command(
        &src.display().to_string(),
        &project.incs,
        project.opts.warnings,
        project.opts.debug,
        &out.display().to_string(),
    );
    project.shell().run(VERBOSE_SOME, &cmdline)?;
    project.compiled += 1;
    Ok(true)
}

/// Compile every source file under `folder`. Returns the number of files
/// compiled and the first file's extension (which picks the linker).
fn compile_folder(project: &mut Project, folder: &Path) -> Result<(u32, Option<String>)> {
    let exts = project.all_extensions();
    let Some(files) = sources::classify(folder, &exts, project.depth()) else {
        return Err(Error::BadPath(nonempty(folder).display().to_string()));
    };
    if files.is_empty() {
        return Ok((0, None));
    }

    let out_dir = folder.join(OUT_FOLDER);
    project.shell().make_dir(&out_dir)?;

    let first_ext = files[0]
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string);

    let mut compiled = 0;
    for file in &files {
        if compile_file(project, &out_dir, file)? {
            compiled += 1;
        }
    }
    if compiled == 0 {
        project
            .shell()
            .detail(&format!("# {} folder up to date", nonempty(folder).display()));
    }
    Ok((compiled, first_ext))
}

/// Library rule: compile the folder, then archive `out/*.o` when anything
/// changed or the archive is missing.
pub fn build_lib(project: &mut Project, folder: &Path) -> Result<()> {
    let (mut stale, first_ext) = compile_folder(project, folder)?;

    // nothing to archive in a folder without sources
    if first_ext.is_none() {
        return Ok(());
    }

    let lib = project.lib_name(folder);
    if !lib.is_file() {
        stale += 1;
    }

    if stale > 0 || project.opts.rebuild {
        project.lib_compiled = true;
        let cmdline = format!(
            "ar -crs {} {}",
            lib.display(),
            join_display(folder, "out/*.o")
        );
        if let Err(e) = project.shell().run(VERBOSE_SOME, &cmdline) {
            project
                .shell()
                .status(&format!("# failed to create {}\n", lib.display()));
            return Err(e);
        }
        project
            .shell()
            .status(&format!("# created library {}\n", lib.display()));
    }
    Ok(())
}

/// Source rule: compile the folder, then link the program against the
/// accumulated library list. A recompiled library forces the relink.
pub fn build_src(project: &mut Project, folder: &Path) -> Result<()> {
    let (mut stale, first_ext) = compile_folder(project, folder)?;
    if project.lib_compiled {
        stale += 1;
    }

    // no sources means nothing to link
    let Some(ext) = first_ext else {
        return Ok(());
    };

    let prog = project.src_name(folder);
    if !prog.is_file() {
        stale += 1;
        project.compiled += 1;
    }

    if stale > 0 || project.opts.rebuild {
        let Some(rule) = config::find_rule(&project.manifest.compilers, &ext).cloned() else {
            return Err(Error::NoRule(ext));
        };
        let cmdline = rule.link_command(
            &join_display(folder, "out/*.o"),
            &project.libs,
            project.opts.debug,
            &prog.display().to_string(),
        );
        if let Err(e) = project.shell().run(VERBOSE_SOME, &cmdline) {
            project
                .shell()
                .status(&format!("# failed to create {}\n", prog.display()));
            return Err(e);
        }
        project
            .shell()
            .status(&format!("# created program {}\n", prog.display()));
    }
    Ok(())
}

/// Link one tool if any of its objects were rebuilt or its executable is
/// missing. Returns whether work was done.
fn build_tool(project: &mut Project, folder: &Path, out_dir: &Path, tool: &Tool) -> Result<bool> {
    let mut stale = 0;
    for src in &tool.sources {
        if compile_file(project, out_dir, src)? {
            stale += 1;
        }
    }

    let exe = folder.join(&tool.name);
    if !exe.is_file() {
        stale += 1;
        project.compiled += 1;
    }

    if stale == 0 && !project.opts.rebuild {
        return Ok(false);
    }

    let ext = tool.sources[0]
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Some(rule) = config::find_rule(&project.manifest.compilers, ext).cloned() else {
        return Err(Error::NoRule(ext.to_string()));
    };
    let objs: Vec<String> = tool
        .sources
        .iter()
        .map(|s| {
            out_dir
                .join(format!("{}.o", sources::stem_of(s)))
                .display()
                .to_string()
        })
        .collect();
    let cmdline = rule.link_command(
        &objs.join(" "),
        &project.libs,
        project.opts.debug,
        &exe.display().to_string(),
    );
    if let Err(e) = project.shell().run(VERBOSE_SOME, &cmdline) {
        project
            .shell()
            .status(&format!("# failed to create {}\n", tool.name));
        return Err(e);
    }
    project
        .shell()
        .status(&format!("# created program {}\n", tool.name));
    Ok(true)
}

/// Tool rule: group the folder's sources at depth 1 and build each tool, or
/// only the one named by `only`.
pub fn build_tools(project: &mut Project, folder: &Path, only: Option<&str>) -> Result<()> {
    let exts = project.all_extensions();
    let Some(files) = sources::classify(folder, &exts, 1) else {
        return Err(Error::BadPath(nonempty(folder).display().to_string()));
    };
    let tools = sources::group_into_tools(&files);

    if tools.is_empty() {
        project.shell().status(&format!(
            "# folder '{}' contains no source files",
            nonempty(folder).display()
        ));
        return Ok(());
    }

    if let Some(name) = only {
        if !tools.iter().any(|t| t.name == name) {
            return Err(Error::BadProg(join_display(folder, name)));
        }
    }

    let out_dir = folder.join(OUT_FOLDER);
    project.shell().make_dir(&out_dir)?;

    let mut built = 0;
    for tool in &tools {
        if only.is_some_and(|name| name != tool.name) {
            continue;
        }
        if build_tool(project, folder, &out_dir, tool)? {
            built += 1;
        }
    }
    if built == 0 {
        project
            .shell()
            .detail(&format!("# {} folder up to date", nonempty(folder).display()));
    }
    Ok(())
}

/// Build every library-rule folder of the project, in declared order.
pub fn build_libs(project: &mut Project) -> Result<()> {
    let folders: Vec<PathBuf> = project
        .folders
        .iter()
        .filter(|f| f.rule == Rule::Lib)
        .map(|f| f.folder.clone())
        .collect();
    for folder in &folders {
        build_lib(project, folder)?;
    }
    Ok(())
}

/// Whole-project build: libraries first, then programs and tools in order.
pub fn build_project(project: &mut Project) -> Result<()> {
    build_libs(project)?;
    let folders = project.folders.clone();
    for f in &folders {
        match f.rule {
            Rule::Src => build_src(project, &f.folder)?,
            Rule::Tool => build_tools(project, &f.folder, None)?,
            Rule::Lib | Rule::Project => {}
        }
    }
    Ok(())
}

/// Build one resolved target.
pub fn build_target(project: &mut Project, target: &Target) -> Result<()> {
    match target.rule {
        Rule::Project => build_project(project),
        Rule::Lib => build_lib(project, &target.folder),
        Rule::Src => build_src(project, &target.folder),
        Rule::Tool => build_tools(project, &target.folder, target.file.as_deref()),
    }
}
