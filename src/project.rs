//! Project state, root discovery and manifest loading.
//!
//! A project root is the innermost folder containing a `flymake.toml` or one
//! of the well-known `src//source//lib//library/` folders; a folder with bare
//! sources and no such markers is a "simple" project built as one library at
//! depth 1. All state for a build lives in [`Project`]; dependencies own
//! their sub-projects as values inside the root's dependency list.

use crate::config::{self, CompilerRule, Manifest, Rule};
use crate::error::{Error, Result};
use crate::exec::Shell;
use crate::sources;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Folders scanned up to this many levels for source files.
const SRC_DEPTH: usize = 3;

const INC_FOLDERS: [&str; 2] = ["inc", "include"];
const LIB_FOLDERS: [&str; 2] = ["lib", "library"];
const SRC_FOLDERS: [&str; 2] = ["src", "source"];
const ROOT_FOLDERS: [&str; 4] = ["src", "source", "lib", "library"];
const DEFAULT_FOLDER_RULES: [(&str, Rule); 5] = [
    ("src", Rule::Src),
    ("source", Rule::Src),
    ("lib", Rule::Lib),
    ("library", Rule::Lib),
    ("test", Rule::Tool),
];

/// Command-line options, set once at startup and inherited by dependency
/// states (with the rebuild and rule-forcing flags adjusted).
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub rebuild: bool,
    pub all: bool,
    pub debug: u32,
    pub dry_run: bool,
    pub verbosity: u8,
    pub warnings: bool,
    pub forced_rule: Option<Rule>,
    pub cpp: bool,
    pub lib: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            rebuild: false,
            all: false,
            debug: 0,
            dry_run: false,
            verbosity: 1,
            warnings: true,
            forced_rule: None,
            cpp: false,
            lib: false,
        }
    }
}

/// One build-contributing folder and how to build it.
#[derive(Debug, Clone)]
pub struct FolderRule {
    pub folder: PathBuf,
    pub rule: Rule,
}

/// A resolved dependency on the root project's canonical list.
#[derive(Debug)]
pub struct Dependency {
    pub name: String,
    /// requested version range, `*` when unconstrained
    pub range: String,
    /// resolved concrete version, `*` when unknown
    pub version: String,
    /// library artifacts to link against
    pub libs: Vec<String>,
    /// include folder contributed to referencing projects
    pub inc_dir: Option<String>,
    /// built once per run
    pub built: bool,
    /// present for package and git dependencies that are built from source
    pub sub: Option<Box<Project>>,
}

/// All state for one project (the root, or a dependency being built).
#[derive(Debug)]
pub struct Project {
    /// root folder as the user referenced it; empty means the current folder
    pub root: PathBuf,
    pub full_path: PathBuf,
    pub inc_dir: PathBuf,
    pub deps_dir: PathBuf,
    pub name: String,
    pub version: String,
    pub simple: bool,
    pub manifest: Manifest,
    pub folders: Vec<FolderRule>,
    pub deps: Vec<Dependency>,
    /// include search folders, in flag order (`.` first)
    pub incs: Vec<String>,
    /// libraries to link, in accumulation order
    pub libs: Vec<String>,
    /// a library was recompiled this run, programs must relink
    pub lib_compiled: bool,
    pub compiled: u32,
    pub src_files: u32,
    pub opts: Options,
}

impl Project {
    /// Load the project at `root`. `base` supplies the compiler rules the
    /// manifest may extend (built-in defaults, or the root project's rules
    /// when loading a dependency).
    pub fn load(
        root: PathBuf,
        opts: Options,
        base: Vec<CompilerRule>,
        name_override: Option<&str>,
    ) -> Result<Project> {
        let root = normalize_root(root);
        let full_path = fs::canonicalize(nonempty(&root))
            .map_err(|_| Error::BadPath(display_root(&root)))?;

        let manifest_path = root.join(config::MANIFEST_NAME);
        let display = manifest_path.display().to_string();
        let manifest = if manifest_path.is_file() {
            let src = fs::read_to_string(&manifest_path)?;
            Manifest::parse(&src, &display, base)?
        } else {
            Manifest::empty(base, &display)
        };

        let name = name_override
            .map(str::to_string)
            .or_else(|| manifest.name.clone())
            .unwrap_or_else(|| {
                full_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "project".to_string())
            });
        let version = manifest.version.clone().unwrap_or_else(|| "*".to_string());

        let inc_dir = INC_FOLDERS
            .iter()
            .map(|d| root.join(d))
            .find(|p| p.is_dir())
            .unwrap_or_else(|| root.clone());
        let deps_dir = root.join("deps");

        // declared folder rules first; folders that do not exist are dropped
        let mut folders: Vec<FolderRule> = Vec::new();
        for decl in &manifest.folders {
            let key = decl.key.trim_end_matches('/');
            let path = if Path::new(key).is_absolute() {
                PathBuf::from(key)
            } else {
                root.join(key)
            };
            if path.is_dir() && !folders.iter().any(|f| same_folder(&f.folder, &path)) {
                folders.push(FolderRule {
                    folder: path,
                    rule: decl.rule,
                });
            }
        }

        // then the well-known folders, skipping any that already have a rule
        for (sub, rule) in DEFAULT_FOLDER_RULES {
            let path = root.join(sub);
            if path.is_dir() && !folders.iter().any(|f| same_folder(&f.folder, &path)) {
                folders.push(FolderRule { folder: path, rule });
            }
        }

        // no folder rules but sources in the root: a simple project, built
        // as one library with a shallow scan
        let mut simple = false;
        if folders.is_empty() {
            let exts = config::all_extensions(&manifest.compilers);
            if let Some(files) = sources::classify(&root, &exts, 1) {
                if !files.is_empty() {
                    simple = true;
                    folders.push(FolderRule {
                        folder: root.clone(),
                        rule: Rule::Lib,
                    });
                }
            }
        }

        let mut project = Project {
            root,
            full_path,
            inc_dir,
            deps_dir,
            name,
            version,
            simple,
            manifest,
            folders,
            deps: Vec::new(),
            incs: Vec::new(),
            libs: Vec::new(),
            lib_compiled: false,
            compiled: 0,
            src_files: 0,
            opts,
        };

        // the project's own libraries, in folder order
        let libs: Vec<String> = project
            .folders
            .iter()
            .filter(|f| f.rule == Rule::Lib)
            .map(|f| project.lib_name(&f.folder).display().to_string())
            .collect();
        project.libs = libs;

        // include search list: current folder, then the include folder
        project.incs.push(".".to_string());
        if !same_folder(&project.inc_dir, &project.root) {
            project.incs.push(project.inc_dir.display().to_string());
        }

        Ok(project)
    }

    pub fn shell(&self) -> Shell {
        Shell::new(self.opts.verbosity, self.opts.dry_run)
    }

    /// How deep folder scans go: simple projects stay in the root.
    pub fn depth(&self) -> usize {
        if self.simple { 1 } else { SRC_DEPTH }
    }

    pub fn all_extensions(&self) -> Vec<String> {
        config::all_extensions(&self.manifest.compilers)
    }

    pub fn has_lib_rule(&self) -> bool {
        self.folders.iter().any(|f| f.rule == Rule::Lib)
    }

    /// Archive path for a library folder, e.g. `lib/` -> `lib/<project>.a`
    /// but `mylib/` -> `mylib/mylib.a`.
    pub fn lib_name(&self, folder: &Path) -> PathBuf {
        let base = folder_base(folder);
        let stem = match base.as_deref() {
            None => self.name.clone(),
            Some(b) if LIB_FOLDERS.contains(&b) => self.name.clone(),
            Some(b) => b.to_string(),
        };
        folder.join(format!("{stem}.a"))
    }

    /// Program path for a source folder, e.g. `src/` -> `src/<project>` but
    /// `myprog/` -> `myprog/myprog`.
    pub fn src_name(&self, folder: &Path) -> PathBuf {
        let base = folder_base(folder);
        let stem = match base.as_deref() {
            None => self.name.clone(),
            Some(b) if SRC_FOLDERS.contains(&b) => self.name.clone(),
            Some(b) => b.to_string(),
        };
        folder.join(stem)
    }
}

fn folder_base(folder: &Path) -> Option<String> {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// `""` stands for the current folder in stored paths; file APIs need `.`.
pub fn nonempty(path: &Path) -> &Path {
    if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    }
}

fn display_root(root: &Path) -> String {
    nonempty(root).display().to_string()
}

fn normalize_root(root: PathBuf) -> PathBuf {
    if root.as_os_str() == "." || root.as_os_str() == "./" {
        PathBuf::new()
    } else {
        root
    }
}

/// Are these the same folder on disk?
pub fn same_folder(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(nonempty(a)), fs::canonicalize(nonempty(b))) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => nonempty(a) == nonempty(b),
    }
}

/// Normalize a user argument into `(folder, optional file)`. A trailing
/// separator or an existing directory is folder-only; an existing file or a
/// nonexistent leaf name belongs to its parent folder, which must exist.
pub fn split_target(target: &str) -> Result<(PathBuf, Option<String>)> {
    if target.is_empty() || target == "." || target == "./" {
        return Ok((PathBuf::new(), None));
    }
    let path = Path::new(target);
    if target.ends_with('/') || path.is_dir() {
        return Ok((normalize_root(path.to_path_buf()), None));
    }
    if target.contains('/') {
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if !nonempty(&parent).is_dir() {
            return Err(Error::BadPath(target.to_string()));
        }
        let file = path.file_name().map(|n| n.to_string_lossy().into_owned());
        return Ok((normalize_root(parent), file));
    }
    // bare name (existing folders were handled above): a file or a program
    // that is not built yet, in the current folder
    Ok((PathBuf::new(), Some(target.to_string())))
}

fn parent_of(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::from("..");
    }
    if path.components().all(|c| matches!(c, Component::ParentDir)) {
        return path.join("..");
    }
    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}

fn is_root_folder(folder: &Path) -> bool {
    let dir = nonempty(folder);
    dir.join(config::MANIFEST_NAME).is_file()
        || ROOT_FOLDERS.iter().any(|d| dir.join(d).is_dir())
}

/// Locate the project root enclosing `target`: the target's folder, its
/// parent or grandparent qualify via a manifest or a well-known folder;
/// failing that, a folder with bare sources is its own simple root.
pub fn find_root(target: &str, rules: &[CompilerRule]) -> Result<PathBuf> {
    let (folder, _) = split_target(target)?;

    let mut cur = folder.clone();
    for level in 0..3 {
        if level > 0 {
            cur = parent_of(&cur);
        }
        if is_root_folder(&cur) {
            return Ok(normalize_root(cur));
        }
    }

    let exts = config::all_extensions(rules);
    if let Some(files) = sources::classify(&folder, &exts, 1) {
        if !files.is_empty() {
            return Ok(normalize_root(folder));
        }
    }

    Err(Error::NotProject(target.to_string()))
}
