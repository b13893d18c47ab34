//! Target resolution: user arguments to `(folder, optional file, rule)`.

use crate::config::Rule;
use crate::error::{Error, Result};
use crate::project::{self, Project};
use std::path::PathBuf;

/// A resolved build or run target.
#[derive(Debug, Clone)]
pub struct Target {
    /// the argument as the user typed it
    pub raw: String,
    pub folder: PathBuf,
    /// `None` means the whole folder
    pub file: Option<String>,
    pub rule: Rule,
}

/// Resolve one user argument against the active project. Fails with
/// `not-same-root` when the argument's enclosing project is a different one,
/// and `no-rule` when neither the command line nor the manifest assigns the
/// folder a rule.
pub fn resolve_target(project: &Project, raw: &str) -> Result<Target> {
    let (folder, file) = project::split_target(raw)?;

    let target_root = project::find_root(raw, &project.manifest.compilers)?;
    if !project::same_folder(&target_root, &project.root) {
        return Err(Error::NotSameRoot(raw.to_string()));
    }

    let rule = if project::same_folder(&folder, &project.root) {
        Rule::Project
    } else if let Some(forced) = project.opts.forced_rule {
        forced
    } else {
        match project
            .folders
            .iter()
            .find(|f| project::same_folder(&f.folder, &folder))
        {
            Some(rule) => rule.rule,
            None => return Err(Error::NoRule(raw.to_string())),
        }
    };

    Ok(Target {
        raw: raw.to_string(),
        folder,
        file,
        rule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::project::Options;
    use std::fs;
    use std::path::Path;

    fn project_at(base: &Path) -> Project {
        Project::load(
            base.to_path_buf(),
            Options::default(),
            config::default_rules(),
            None,
        )
        .unwrap()
    }

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("proj");
        fs::create_dir_all(base.join("src")).unwrap();
        fs::create_dir_all(base.join("lib")).unwrap();
        fs::create_dir_all(base.join("tools")).unwrap();
        fs::write(base.join("src/app.c"), "").unwrap();
        fs::write(base.join("lib/util.c"), "").unwrap();
        fs::write(base.join("tools/probe.c"), "").unwrap();
        (dir, base)
    }

    #[test]
    fn test_root_target_is_whole_project() {
        let (_dir, base) = fixture();
        let project = project_at(&base);
        let t = resolve_target(&project, &base.display().to_string()).unwrap();
        assert_eq!(t.rule, Rule::Project);
        assert!(t.file.is_none());
    }

    #[test]
    fn test_folder_rule_from_manifest_list() {
        let (_dir, base) = fixture();
        let project = project_at(&base);
        let t = resolve_target(&project, &base.join("src").display().to_string()).unwrap();
        assert_eq!(t.rule, Rule::Src);
        let t = resolve_target(&project, &base.join("lib").display().to_string()).unwrap();
        assert_eq!(t.rule, Rule::Lib);
    }

    #[test]
    fn test_file_target_keeps_file_part() {
        let (_dir, base) = fixture();
        let project = project_at(&base);
        let t =
            resolve_target(&project, &base.join("src/app.c").display().to_string()).unwrap();
        assert_eq!(t.rule, Rule::Src);
        assert_eq!(t.file.as_deref(), Some("app.c"));
    }

    #[test]
    fn test_forced_rule_overrides_lookup() {
        let (_dir, base) = fixture();
        let mut project = project_at(&base);
        project.opts.forced_rule = Some(Rule::Src);
        // tools/ has no rule in the folder list, but the forced rule applies
        let t = resolve_target(&project, &base.join("tools").display().to_string()).unwrap();
        assert_eq!(t.rule, Rule::Src);
    }

    #[test]
    fn test_no_rule_without_declaration() {
        let (_dir, base) = fixture();
        let project = project_at(&base);
        let result = resolve_target(&project, &base.join("tools").display().to_string());
        assert!(matches!(result, Err(Error::NoRule(_))));
    }

    #[test]
    fn test_target_outside_root_rejected() {
        let (dir, base) = fixture();
        // a sibling project
        let other = dir.path().join("other");
        fs::create_dir_all(other.join("src")).unwrap();
        fs::write(other.join("src/main.c"), "").unwrap();

        let project = project_at(&base);
        let result = resolve_target(&project, &other.join("src").display().to_string());
        assert!(matches!(result, Err(Error::NotSameRoot(_))));
    }
}
