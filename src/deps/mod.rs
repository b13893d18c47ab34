//! Dependency resolution and building.
//!
//! Declarations come in three shapes:
//!
//! | shape    | trigger                 | meaning                                  |
//! |----------|-------------------------|------------------------------------------|
//! | prebuilt | both `path` and `inc`   | a static library plus an include folder  |
//! | package  | `path` only             | a sibling project built from source      |
//! | git      | `git`                   | cloned into `deps/`, then built          |
//!
//! Resolution goes broad first, then deep: every declaration of a manifest
//! is processed before recursing into the dependencies that carry manifests
//! of their own. The root project owns the one canonical dependency list;
//! a name may only be declared twice when the versions are compatible.
//! Library artifacts accumulate on the root (link order), include folders on
//! whichever project declared the dependency (compile flags).

mod git;

use crate::build::core;
use crate::config::{CompilerRule, DepDecl, Manifest};
use crate::error::{Error, Result};
use crate::exec::Shell;
use crate::project::{self, Dependency, Options, Project};
use crate::version;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the root project's dependency graph, filling its dependency list,
/// library accumulator and include lists.
pub fn resolve(root: &mut Project) -> Result<()> {
    if root.manifest.deps.is_empty() {
        return Ok(());
    }
    let shell = root.shell();
    shell.status("\n# ---- Discovering dependencies... ----");
    shell.make_dir(&root.deps_dir)?;

    let mut resolver = Resolver {
        opts: root.opts,
        shell,
        compilers: root.manifest.compilers.clone(),
        deps_dir: root.deps_dir.clone(),
        libs: std::mem::take(&mut root.libs),
        deps: std::mem::take(&mut root.deps),
        visited: HashSet::new(),
    };
    if let Ok(canon) = fs::canonicalize(project::nonempty(&root.root)) {
        resolver.visited.insert(canon);
    }

    let manifest = root.manifest.clone();
    let state_root = root.root.clone();
    let result = resolver.process(&manifest, &state_root, &mut root.incs);

    root.libs = resolver.libs;
    root.deps = resolver.deps;
    result
}

/// Resolve, then build every dependency's libraries (once per run) before
/// anything in the root project. A recompiled dependency library forces the
/// root's programs to relink.
pub fn resolve_and_build(root: &mut Project) -> Result<()> {
    if root.manifest.deps.is_empty() {
        return Ok(());
    }
    resolve(root)?;
    if root.deps.is_empty() {
        return Ok(());
    }

    root.shell().status("\n# ---- Building dependencies... ----");
    let mut deps = std::mem::take(&mut root.deps);
    let mut outcome = Ok(());
    for dep in &mut deps {
        if dep.built {
            continue;
        }
        let Some(sub) = dep.sub.as_deref_mut() else {
            dep.built = true;
            continue;
        };
        if let Err(e) = core::build_libs(sub) {
            outcome = Err(e);
            break;
        }
        dep.built = true;
        if sub.lib_compiled {
            root.lib_compiled = true;
            root.compiled += 1;
        }
    }
    root.deps = deps;
    outcome?;

    root.shell().status("\n# ---- Building project... ----");
    Ok(())
}

struct Resolver {
    opts: Options,
    shell: Shell,
    compilers: Vec<CompilerRule>,
    deps_dir: PathBuf,
    /// the root project's library accumulator
    libs: Vec<String>,
    /// the root project's canonical dependency list
    deps: Vec<Dependency>,
    /// roots already traversed, guards against manifest cycles
    visited: HashSet<PathBuf>,
}

impl Resolver {
    /// Process one manifest's declarations, then recurse into dependencies
    /// whose own manifests declare more.
    fn process(&mut self, man: &Manifest, state_root: &Path, incs: &mut Vec<String>) -> Result<()> {
        for decl in &man.deps {
            self.process_decl(man, state_root, incs, decl)?;
        }

        for decl in &man.deps {
            let Some(i) = self.deps.iter().position(|d| d.name == decl.name) else {
                continue;
            };
            let Some(mut sub) = self.deps[i].sub.take() else {
                continue;
            };
            if sub.manifest.deps.is_empty() {
                self.deps[i].sub = Some(sub);
                continue;
            }
            let canon = fs::canonicalize(project::nonempty(&sub.root))
                .unwrap_or_else(|_| sub.root.clone());
            if !self.visited.insert(canon) {
                self.deps[i].sub = Some(sub);
                continue;
            }

            let sub_man = sub.manifest.clone();
            let sub_root = sub.root.clone();
            let mut sub_incs = std::mem::take(&mut sub.incs);
            let result = self.process(&sub_man, &sub_root, &mut sub_incs);
            sub.incs = sub_incs;
            self.deps[i].sub = Some(sub);
            result?;
        }
        Ok(())
    }

    fn process_decl(
        &mut self,
        man: &Manifest,
        state_root: &Path,
        incs: &mut Vec<String>,
        decl: &DepDecl,
    ) -> Result<()> {
        if self.deps.iter().any(|d| d.name == decl.name) {
            return self.revisit(man, state_root, incs, decl);
        }
        if decl.git.is_some() {
            self.add_git(man, incs, decl)
        } else if decl.path.is_some() && decl.inc.is_some() {
            self.add_prebuilt(man, state_root, incs, decl)
        } else if decl.path.is_some() {
            self.add_package(man, state_root, incs, decl)
        } else {
            Err(man
                .error(
                    decl.span.start,
                    "expected \"path=\" or \"git=\" key in inline table",
                )
                .into())
        }
    }

    /// A dependency declared again. The declaration must be compatible with
    /// what is already resolved; its include folder then flows into the
    /// project making this (re-)declaration.
    fn revisit(
        &mut self,
        man: &Manifest,
        state_root: &Path,
        incs: &mut Vec<String>,
        decl: &DepDecl,
    ) -> Result<()> {
        let Some(i) = self.deps.iter().position(|d| d.name == decl.name) else {
            return Ok(());
        };

        let range = decl
            .version
            .as_ref()
            .map_or("*", |v| v.get_ref().as_str());
        let resolved = self.deps[i].version.clone();
        if !version::semver_match(range, &resolved) {
            let offset = decl
                .version
                .as_ref()
                .map_or(decl.span.start, |v| v.span().start);
            return Err(man
                .error(offset, &format!("version conflict (previous version {resolved})"))
                .into());
        }

        if let (Some(inc), Some(_)) = (&decl.inc, &decl.path) {
            let declared = join_path(state_root, inc.get_ref());
            if let Some(previous) = self.deps[i].inc_dir.clone() {
                if !project::same_folder(Path::new(&declared), Path::new(&previous)) {
                    return Err(man
                        .error(
                            inc.span().start,
                            &format!(
                                "duplicate dependency, different include folder (previous: {previous})"
                            ),
                        )
                        .into());
                }
            }
        }

        if let Some(inc) = self.deps[i].inc_dir.clone() {
            push_unique(incs, inc);
        }
        Ok(())
    }

    /// Prebuilt shape: nothing is compiled, the named artifacts must exist.
    fn add_prebuilt(
        &mut self,
        man: &Manifest,
        state_root: &Path,
        incs: &mut Vec<String>,
        decl: &DepDecl,
    ) -> Result<()> {
        let (Some(path_key), Some(inc_key)) = (&decl.path, &decl.inc) else {
            return Err(man
                .error(
                    decl.span.start,
                    "expected \"path=\" or \"git=\" key in inline table",
                )
                .into());
        };
        let lib_file = join_path(state_root, path_key.get_ref());
        let inc_folder = join_path(state_root, inc_key.get_ref());
        self.shell.status(&format!(
            "# Dependency prebuilt: {}: {lib_file}",
            decl.name
        ));

        if !Path::new(&inc_folder).is_dir() {
            return Err(man
                .error(inc_key.span().start, "include folder not found")
                .into());
        }
        if !Path::new(&lib_file).is_file() {
            return Err(man.error(path_key.span().start, "library not found").into());
        }

        self.libs.push(lib_file.clone());
        push_unique(incs, inc_folder.clone());
        self.deps.push(Dependency {
            name: decl.name.clone(),
            range: "*".to_string(),
            version: "*".to_string(),
            libs: vec![lib_file],
            inc_dir: Some(inc_folder),
            built: true,
            sub: None,
        });
        Ok(())
    }

    /// Package shape: a sibling project folder built from source.
    fn add_package(
        &mut self,
        man: &Manifest,
        state_root: &Path,
        incs: &mut Vec<String>,
        decl: &DepDecl,
    ) -> Result<()> {
        let Some(path_key) = &decl.path else {
            return Err(man
                .error(
                    decl.span.start,
                    "expected \"path=\" or \"git=\" key in inline table",
                )
                .into());
        };
        let range = decl
            .version
            .as_ref()
            .map_or_else(|| "*".to_string(), |v| v.get_ref().clone());
        let folder = PathBuf::from(join_path(state_root, path_key.get_ref()));
        self.shell.status(&format!(
            "# Dependency project : {} {range}: {}",
            decl.name,
            folder.display()
        ));
        self.register_package(man, incs, decl, folder, &range, None, path_key.span().start)
    }

    /// Git shape: clone (or reuse) into `deps/<name>/`, then treat the
    /// checkout as a package.
    fn add_git(&mut self, man: &Manifest, incs: &mut Vec<String>, decl: &DepDecl) -> Result<()> {
        let Some(git_key) = &decl.git else {
            return Err(man
                .error(
                    decl.span.start,
                    "expected \"path=\" or \"git=\" key in inline table",
                )
                .into());
        };
        let url = git_key.get_ref().clone();
        let range = decl
            .version
            .as_ref()
            .map_or_else(|| "*".to_string(), |v| v.get_ref().clone());
        self.shell.status(&format!(
            "# Dependency git     : {} {range}: {url}",
            decl.name
        ));

        let folder = self.deps_dir.join(&decl.name);
        let mut found = None;
        if !folder.join(".git").is_dir() {
            found = git::materialize(&self.shell, man, decl, &url, &folder)?;
        }
        self.register_package(
            man,
            incs,
            decl,
            folder,
            &range,
            found.as_deref(),
            git_key.span().start,
        )
    }

    /// Validate a package folder, load it as a buildable sub-project and
    /// register the new dependency.
    fn register_package(
        &mut self,
        man: &Manifest,
        incs: &mut Vec<String>,
        decl: &DepDecl,
        folder: PathBuf,
        range: &str,
        found_ver: Option<&str>,
        origin: usize,
    ) -> Result<()> {
        if !folder.is_dir() {
            if self.opts.dry_run {
                // the clone was only printed, there is nothing to inspect
                return Ok(());
            }
            return Err(man.error(origin, "folder not a project").into());
        }

        // dependencies build under library rules only; -B does not reach
        // them, --all does
        let sub_opts = Options {
            forced_rule: None,
            rebuild: self.opts.all,
            ..self.opts
        };
        let mut sub = match Project::load(folder, sub_opts, self.compilers.clone(), Some(&decl.name))
        {
            Ok(sub) => sub,
            Err(Error::Manifest(e)) => return Err(Error::Manifest(e)),
            Err(_) => return Err(man.error(origin, "folder not a project").into()),
        };
        if !sub.has_lib_rule() {
            return Err(man
                .error(origin, "project cannot be built as library")
                .into());
        }

        // the dependency's own manifest wins, then the git-log discovery
        let resolved = if sub.version != "*" {
            sub.version.clone()
        } else if let Some(found) = found_ver {
            found.to_string()
        } else {
            "*".to_string()
        };
        sub.version = resolved.clone();
        if !version::semver_match(range, &resolved) {
            let offset = decl
                .version
                .as_ref()
                .map_or(decl.span.start, |v| v.span().start);
            return Err(man
                .error(offset, &format!("version conflict (found version {resolved})"))
                .into());
        }

        let inc_dir = sub.inc_dir.display().to_string();
        let dep = Dependency {
            name: decl.name.clone(),
            range: range.to_string(),
            version: resolved.clone(),
            libs: sub.libs.clone(),
            inc_dir: Some(inc_dir.clone()),
            built: false,
            sub: Some(Box::new(sub)),
        };
        self.libs.extend(dep.libs.iter().cloned());
        push_unique(incs, inc_dir);
        self.deps.push(dep);
        self.shell
            .status(&format!("#     found version => {resolved}"));
        Ok(())
    }
}

/// Manifest paths resolve relative to the declaring project's root; absolute
/// and home paths pass through.
fn join_path(state_root: &Path, value: &str) -> String {
    let trimmed = value.trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.starts_with('~') {
        trimmed.to_string()
    } else {
        state_root.join(trimmed).display().to_string()
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
