//! The `clean` command: remove object folders and, with `-B`, the archives,
//! programs and tool executables as well. `--all` also removes `deps/`.
//!
//! Artifact names mirror the build side exactly, including the project-name
//! substitution for `lib//library/` and `src//source/` folders, so a clean
//! always removes what a build created.

use crate::config::Rule;
use crate::error::Result;
use crate::exec::VERBOSE_SOME;
use crate::project::Project;
use crate::sources;

pub fn clean(project: &Project) -> Result<()> {
    let shell = project.shell();

    for folder in &project.folders {
        shell.remove_dir(VERBOSE_SOME, &folder.folder.join("out"))?;

        if project.opts.rebuild {
            match folder.rule {
                Rule::Lib => {
                    shell.remove_file(VERBOSE_SOME, &project.lib_name(&folder.folder))?;
                }
                Rule::Src => {
                    shell.remove_file(VERBOSE_SOME, &project.src_name(&folder.folder))?;
                }
                Rule::Tool => {
                    let exts = project.all_extensions();
                    if let Some(files) = sources::classify(&folder.folder, &exts, 1) {
                        for tool in sources::group_into_tools(&files) {
                            shell.remove_file(VERBOSE_SOME, &folder.folder.join(&tool.name))?;
                        }
                    }
                }
                Rule::Project => {}
            }
        }
    }

    if project.opts.all {
        shell.remove_dir(VERBOSE_SOME, &project.deps_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::project::Options;
    use std::fs;
    use std::path::Path;

    fn fixture(base: &Path) {
        fs::create_dir_all(base.join("lib/out")).unwrap();
        fs::create_dir_all(base.join("src/out")).unwrap();
        fs::create_dir_all(base.join("test")).unwrap();
        fs::create_dir_all(base.join("deps/foo")).unwrap();
        fs::write(base.join("lib/util.c"), "").unwrap();
        fs::write(base.join("lib/out/util.o"), "").unwrap();
        fs::write(base.join("lib/proj.a"), "").unwrap();
        fs::write(base.join("src/app.c"), "").unwrap();
        fs::write(base.join("src/out/app.o"), "").unwrap();
        fs::write(base.join("src/proj"), "").unwrap();
        fs::write(base.join("test/test_app.c"), "").unwrap();
        fs::write(base.join("test/test_app"), "").unwrap();
    }

    fn load(base: &Path, opts: Options) -> Project {
        Project::load(base.to_path_buf(), opts, config::default_rules(), None).unwrap()
    }

    #[test]
    fn test_clean_removes_only_objects() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fixture(&base);

        let opts = Options {
            verbosity: 0,
            ..Options::default()
        };
        clean(&load(&base, opts)).unwrap();

        assert!(!base.join("lib/out").exists());
        assert!(!base.join("src/out").exists());
        // artifacts and dependencies survive a plain clean
        assert!(base.join("lib/proj.a").is_file());
        assert!(base.join("src/proj").is_file());
        assert!(base.join("test/test_app").is_file());
        assert!(base.join("deps/foo").is_dir());
    }

    #[test]
    fn test_clean_rebuild_removes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fixture(&base);

        let opts = Options {
            rebuild: true,
            verbosity: 0,
            ..Options::default()
        };
        clean(&load(&base, opts)).unwrap();

        // build-side naming: lib/ carries the project name
        assert!(!base.join("lib/proj.a").exists());
        assert!(!base.join("src/proj").exists());
        assert!(!base.join("test/test_app").exists());
        // sources stay, deps stay
        assert!(base.join("lib/util.c").is_file());
        assert!(base.join("deps/foo").is_dir());
    }

    #[test]
    fn test_clean_all_removes_deps() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fixture(&base);

        let opts = Options {
            rebuild: true,
            all: true,
            verbosity: 0,
            ..Options::default()
        };
        clean(&load(&base, opts)).unwrap();
        assert!(!base.join("deps").exists());
    }

    #[test]
    fn test_clean_dry_run_removes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fixture(&base);

        let opts = Options {
            rebuild: true,
            all: true,
            dry_run: true,
            verbosity: 0,
            ..Options::default()
        };
        clean(&load(&base, opts)).unwrap();
        assert!(base.join("lib/out").is_dir());
        assert!(base.join("lib/proj.a").is_file());
        assert!(base.join("deps/foo").is_dir());
    }
}
