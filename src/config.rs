//! Manifest (`flymake.toml`) parsing and validation.
//!
//! The manifest is optional. Four tables are recognized:
//!
//! - `[package]` - `name` and `version`, both optional
//! - `[compiler]` - one entry per dot-separated extension group, e.g.
//!   `".c" = { cc = "cc {in} -c {incs}{warn}{debug}-o {out}", ll = "..." }`
//! - `[folders]` - folder path keys mapped to `"--rl"`, `"--rs"` or `"--rt"`
//! - `[dependencies]` - inline tables, see the `deps` module
//!
//! Unknown tables and unknown keys are tolerated for forward compatibility.
//! Compile and link templates are checked at load time: each placeholder must
//! appear exactly once, and violations are reported with file, line, column
//! and a caret under the offending spot.

use serde::Deserialize;
use std::fmt;
use std::ops::Range;
use toml::Spanned;

pub const MANIFEST_NAME: &str = "flymake.toml";

const COMPILE_MARKERS: [&str; 5] = ["{in}", "{incs}", "{warn}", "{debug}", "{out}"];
const LINK_MARKERS: [&str; 4] = ["{in}", "{libs}", "{debug}", "{out}"];

const COMPILE_MARKER_ERR: &str = "cc= must contain: {in} {incs} {warn} {debug} {out}";
const LINK_MARKER_ERR: &str = "ll= must contain: {in} {libs} {debug} {out}";
const RULE_ERR: &str = "build rule must be one of \"--rl\", \"--rs\" or \"--rt\"";

// built-in C/C++ defaults; manifest entries may override individual keys
const DEF_C_EXTS: &str = ".c";
const DEF_C_CC: &str = "cc {in} -c {incs}{warn}{debug}-o {out}";
const DEF_C_LL: &str = "cc {in} {libs}{debug}-o {out}";
const DEF_CPP_EXTS: &str = ".c++.cpp.cxx.cc.C";
const DEF_CPP_CC: &str = "c++ {in} -c {incs}{warn}{debug}-o {out}";
const DEF_CPP_LL: &str = "c++ {in} {libs}{debug}-o {out}";
const DEF_CC_DBG: &str = "-g -DDEBUG=1 ";
const DEF_LL_DBG: &str = "-g ";
const DEF_INC: &str = "-I";
const DEF_WARN: &str = "-Wall -Werror ";

/// How a folder is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `--rl`: compile and archive into a static library
    Lib,
    /// `--rs`: compile and link a single program
    Src,
    /// `--rt`: group sources by basename prefix into tool executables
    Tool,
    /// the whole project: libraries first, then programs and tools
    Project,
}

impl Rule {
    fn from_flag(flag: &str) -> Option<Rule> {
        match flag {
            "--rl" => Some(Rule::Lib),
            "--rs" => Some(Rule::Src),
            "--rt" => Some(Rule::Tool),
            _ => None,
        }
    }
}

/// A manifest load or validation failure with a precise location.
#[derive(Debug)]
pub struct ManifestError {
    pub path: String,
    pub line: usize,
    pub col: usize,
    pub snippet: String,
    pub reason: String,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}:{}:{}: error: {}",
            self.path, self.line, self.col, self.reason
        )?;
        writeln!(f, "  {}", self.snippet)?;
        write!(f, "  {}^", " ".repeat(self.col.saturating_sub(1)))
    }
}

impl std::error::Error for ManifestError {}

impl ManifestError {
    /// Build an error pointing at byte `offset` of `src`.
    pub fn at(path: &str, src: &str, offset: usize, reason: &str) -> ManifestError {
        let offset = offset.min(src.len());
        let line_start = src[..offset].rfind('\n').map_or(0, |p| p + 1);
        let line_end = src[offset..].find('\n').map_or(src.len(), |p| offset + p);
        ManifestError {
            path: path.to_string(),
            line: src[..offset].matches('\n').count() + 1,
            col: offset - line_start + 1,
            snippet: src[line_start..line_end].to_string(),
            reason: reason.to_string(),
        }
    }

    fn from_toml(path: &str, src: &str, err: &toml::de::Error) -> ManifestError {
        let offset = err.span().map_or(0, |s| s.start);
        // first line of the toml message carries the reason
        let reason = err
            .message()
            .lines()
            .next()
            .unwrap_or("parse error")
            .to_string();
        ManifestError::at(path, src, offset, &reason)
    }
}

/// One compile/link rule per file-extension group.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerRule {
    /// dot-separated extension group, e.g. `.c` or `.c++.cpp.cxx.cc.C`
    pub exts: String,
    pub cc: String,
    pub ll: String,
    pub cc_dbg: String,
    pub ll_dbg: String,
    pub inc: String,
    pub warn: String,
}

impl CompilerRule {
    fn empty(exts: &str) -> CompilerRule {
        CompilerRule {
            exts: exts.to_string(),
            cc: String::new(),
            ll: String::new(),
            cc_dbg: String::new(),
            ll_dbg: String::new(),
            inc: String::new(),
            warn: String::new(),
        }
    }

    /// Does this rule handle a file extension (no leading dot)?
    pub fn matches_ext(&self, ext: &str) -> bool {
        self.extensions().any(|e| e == ext)
    }

    /// Extensions of this group, without dots.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.exts.split('.').filter(|e| !e.is_empty())
    }

    /// Turn the include search list into flags, e.g. `-I. -Iinc `.
    pub fn inc_flags(&self, incs: &[String]) -> String {
        let mut out = String::new();
        for inc in incs {
            if inc.is_empty() {
                continue;
            }
            out.push_str(&self.inc);
            out.push_str(inc);
            out.push(' ');
        }
        out
    }

    /// Format the compile command for one source file.
    pub fn compile_command(
        &self,
        input: &str,
        incs: &[String],
        warnings: bool,
        debug: u32,
        output: &str,
    ) -> String {
        let incs = self.inc_flags(incs);
        let warn = if warnings { self.warn.as_str() } else { "" };
        let debug = debug_flags(&self.cc_dbg, debug);
        substitute(
            &self.cc,
            &[
                ("{in}", input),
                ("{incs}", &incs),
                ("{warn}", warn),
                ("{debug}", &debug),
                ("{out}", output),
            ],
        )
    }

    /// Format the link command for a program.
    pub fn link_command(&self, input: &str, libs: &[String], debug: u32, output: &str) -> String {
        let mut lib_list = libs.join(" ");
        if !lib_list.is_empty() {
            lib_list.push(' ');
        }
        let debug = debug_flags(&self.ll_dbg, debug);
        substitute(
            &self.ll,
            &[
                ("{in}", input),
                ("{libs}", &lib_list),
                ("{debug}", &debug),
                ("{out}", output),
            ],
        )
    }
}

/// Debug flag string for the given level; level 0 disables, levels above 1
/// rewrite the default `DEBUG=1` define.
fn debug_flags(flags: &str, level: u32) -> String {
    match level {
        0 => String::new(),
        1 => flags.to_string(),
        n => flags.replace("DEBUG=1", &format!("DEBUG={n}")),
    }
}

/// Single left-to-right pass over `template`, emitting each `{marker}`'s
/// replacement exactly once. Replacement text is never rescanned, so a value
/// containing `{out}` cannot trigger a second substitution.
pub(crate) fn substitute(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match pairs.iter().find(|(marker, _)| rest.starts_with(marker)) {
            Some((marker, value)) => {
                out.push_str(value);
                rest = &rest[marker.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Built-in rules for the local C and C++ compilers.
pub fn default_rules() -> Vec<CompilerRule> {
    vec![
        CompilerRule {
            exts: DEF_C_EXTS.to_string(),
            cc: DEF_C_CC.to_string(),
            ll: DEF_C_LL.to_string(),
            cc_dbg: DEF_CC_DBG.to_string(),
            ll_dbg: DEF_LL_DBG.to_string(),
            inc: DEF_INC.to_string(),
            warn: DEF_WARN.to_string(),
        },
        CompilerRule {
            exts: DEF_CPP_EXTS.to_string(),
            cc: DEF_CPP_CC.to_string(),
            ll: DEF_CPP_LL.to_string(),
            cc_dbg: DEF_CC_DBG.to_string(),
            ll_dbg: DEF_LL_DBG.to_string(),
            inc: DEF_INC.to_string(),
            warn: DEF_WARN.to_string(),
        },
    ]
}

/// Find the rule handling a file extension.
pub fn find_rule<'a>(rules: &'a [CompilerRule], ext: &str) -> Option<&'a CompilerRule> {
    rules.iter().find(|r| r.matches_ext(ext))
}

/// Union of every rule's extensions.
pub fn all_extensions(rules: &[CompilerRule]) -> Vec<String> {
    let mut exts: Vec<String> = Vec::new();
    for rule in rules {
        for ext in rule.extensions() {
            if !exts.iter().any(|e| e == ext) {
                exts.push(ext.to_string());
            }
        }
    }
    exts
}

/// A `[folders]` entry as declared; existence is checked by the project
/// loader, which silently drops missing folders.
#[derive(Debug, Clone)]
pub struct FolderDecl {
    pub key: String,
    pub rule: Rule,
}

/// A `[dependencies]` entry with the spans needed for precise errors.
#[derive(Debug, Clone)]
pub struct DepDecl {
    pub name: String,
    pub span: Range<usize>,
    pub git: Option<Spanned<String>>,
    pub path: Option<Spanned<String>>,
    pub inc: Option<Spanned<String>>,
    pub version: Option<Spanned<String>>,
    pub sha: Option<Spanned<String>>,
    pub branch: Option<Spanned<String>>,
}

/// Parsed and validated manifest, with the raw text kept for error reporting
/// during dependency resolution.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub compilers: Vec<CompilerRule>,
    pub folders: Vec<FolderDecl>,
    pub deps: Vec<DepDecl>,
    pub source: String,
    pub path: String,
}

impl Manifest {
    /// Manifest for a project without a `flymake.toml` file.
    pub fn empty(base: Vec<CompilerRule>, path: &str) -> Manifest {
        Manifest {
            compilers: base,
            path: path.to_string(),
            ..Manifest::default()
        }
    }

    /// Build a [`ManifestError`] pointing into this manifest's text.
    pub fn error(&self, offset: usize, reason: &str) -> ManifestError {
        ManifestError::at(&self.path, &self.source, offset, reason)
    }

    /// Parse and validate manifest text. `base` supplies the built-in
    /// compiler rules which entries may extend or override.
    pub fn parse(
        src: &str,
        path: &str,
        base: Vec<CompilerRule>,
    ) -> Result<Manifest, ManifestError> {
        let raw: RawManifest =
            toml::from_str(src).map_err(|e| ManifestError::from_toml(path, src, &e))?;

        let mut manifest = Manifest {
            compilers: base,
            source: src.to_string(),
            path: path.to_string(),
            ..Manifest::default()
        };

        if let Some(package) = raw.package {
            manifest.name = package.name;
            manifest.version = package.version;
        }

        if let Some(compiler) = raw.compiler {
            for (key, entry) in compiler.0 {
                apply_compiler_entry(&mut manifest, &key, &entry)?;
            }
        }

        if let Some(folders) = raw.folders {
            for (key, value) in folders.0 {
                let Some(rule) = Rule::from_flag(value.get_ref()) else {
                    return Err(manifest.error(value.span().start, RULE_ERR));
                };
                manifest.folders.push(FolderDecl { key, rule });
            }
        }

        if let Some(deps) = raw.dependencies {
            for (name, entry) in deps.0 {
                let span = entry.span();
                let dep = entry.into_inner();
                manifest.deps.push(DepDecl {
                    name,
                    span,
                    git: dep.git,
                    path: dep.path,
                    inc: dep.inc,
                    version: dep.version,
                    sha: dep.sha,
                    branch: dep.branch,
                });
            }
        }

        Ok(manifest)
    }
}

/// Merge one `[compiler]` entry into the rule list: amend an existing
/// extension group or append a new one.
fn apply_compiler_entry(
    manifest: &mut Manifest,
    key: &str,
    entry: &Spanned<RawCompiler>,
) -> Result<(), ManifestError> {
    let raw = entry.get_ref();

    if let Some(cc) = &raw.cc {
        if !markers_exactly_once(cc.get_ref(), &COMPILE_MARKERS) {
            return Err(manifest.error(cc.span().start, COMPILE_MARKER_ERR));
        }
    }
    if let Some(ll) = &raw.ll {
        if !markers_exactly_once(ll.get_ref(), &LINK_MARKERS) {
            return Err(manifest.error(ll.span().start, LINK_MARKER_ERR));
        }
    }

    let missing_required = {
        let idx = match manifest.compilers.iter().position(|r| r.exts == key) {
            Some(i) => i,
            None => {
                manifest.compilers.push(CompilerRule::empty(key));
                manifest.compilers.len() - 1
            }
        };
        let rule = &mut manifest.compilers[idx];

        if let Some(cc) = &raw.cc {
            rule.cc = cc.get_ref().clone();
        }
        if let Some(ll) = &raw.ll {
            rule.ll = ll.get_ref().clone();
        }
        if let Some(cc_dbg) = &raw.cc_dbg {
            rule.cc_dbg = with_trailing_space(cc_dbg.get_ref());
        }
        if let Some(ll_dbg) = &raw.ll_dbg {
            rule.ll_dbg = with_trailing_space(ll_dbg.get_ref());
        }
        if let Some(inc) = &raw.inc {
            rule.inc = inc.get_ref().clone();
        }
        if let Some(warn) = &raw.warn {
            rule.warn = with_trailing_space(warn.get_ref());
        }

        // unset optional fields fall back to the C defaults
        if rule.inc.is_empty() {
            rule.inc = DEF_INC.to_string();
        }
        if rule.cc_dbg.is_empty() {
            rule.cc_dbg = DEF_CC_DBG.to_string();
        }
        if rule.ll_dbg.is_empty() {
            rule.ll_dbg = DEF_LL_DBG.to_string();
        }
        if rule.warn.is_empty() {
            rule.warn = DEF_WARN.to_string();
        }

        rule.cc.is_empty() || rule.ll.is_empty()
    };

    if missing_required {
        return Err(manifest.error(entry.span().start, "keys cc=, ll= are required"));
    }

    Ok(())
}

fn markers_exactly_once(template: &str, markers: &[&str]) -> bool {
    markers.iter().all(|m| template.matches(m).count() == 1)
}

/// Template substitutions splice fragments together, so flag strings carry a
/// trailing space.
fn with_trailing_space(s: &str) -> String {
    if s.is_empty() || s.ends_with(' ') {
        s.to_string()
    } else {
        format!("{s} ")
    }
}

// ---- raw serde layer ----

#[derive(Deserialize, Default)]
struct RawManifest {
    package: Option<RawPackage>,
    compiler: Option<OrderedTable<Spanned<RawCompiler>>>,
    folders: Option<OrderedTable<Spanned<String>>>,
    dependencies: Option<OrderedTable<Spanned<RawDependency>>>,
}

#[derive(Deserialize, Default)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
struct RawCompiler {
    cc: Option<Spanned<String>>,
    ll: Option<Spanned<String>>,
    cc_dbg: Option<Spanned<String>>,
    ll_dbg: Option<Spanned<String>>,
    inc: Option<Spanned<String>>,
    warn: Option<Spanned<String>>,
}

#[derive(Deserialize, Debug, Clone)]
struct RawDependency {
    git: Option<Spanned<String>>,
    path: Option<Spanned<String>>,
    inc: Option<Spanned<String>>,
    version: Option<Spanned<String>>,
    sha: Option<Spanned<String>>,
    branch: Option<Spanned<String>>,
}

/// A TOML table kept in declared order. Folder rules and dependencies are
/// order-significant (build order, library link order), which a HashMap
/// would silently destroy.
struct OrderedTable<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedTable<V> {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct TableVisitor<V>(std::marker::PhantomData<V>);

        impl<'de, V: Deserialize<'de>> serde::de::Visitor<'de> for TableVisitor<V> {
            type Value = OrderedTable<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<M: serde::de::MapAccess<'de>>(
                self,
                mut map: M,
            ) -> Result<Self::Value, M::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedTable(entries))
            }
        }

        de.deserialize_map(TableVisitor(std::marker::PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        for rule in default_rules() {
            assert!(markers_exactly_once(&rule.cc, &COMPILE_MARKERS), "{}", rule.cc);
            assert!(markers_exactly_once(&rule.ll, &LINK_MARKERS), "{}", rule.ll);
        }
    }

    #[test]
    fn test_find_rule_by_extension() {
        let rules = default_rules();
        assert_eq!(find_rule(&rules, "c").unwrap().exts, ".c");
        assert_eq!(find_rule(&rules, "cpp").unwrap().exts, ".c++.cpp.cxx.cc.C");
        assert_eq!(find_rule(&rules, "c++").unwrap().exts, ".c++.cpp.cxx.cc.C");
        assert_eq!(find_rule(&rules, "C").unwrap().exts, ".c++.cpp.cxx.cc.C");
        assert!(find_rule(&rules, "rs").is_none());
    }

    #[test]
    fn test_all_extensions() {
        let exts = all_extensions(&default_rules());
        assert_eq!(exts, vec!["c", "c++", "cpp", "cxx", "cc", "C"]);
    }

    #[test]
    fn test_compile_command_formatting() {
        let rules = default_rules();
        let rule = find_rule(&rules, "c").unwrap();
        let cmd = rule.compile_command(
            "src/foo.c",
            &[".".to_string(), "inc".to_string()],
            true,
            0,
            "src/out/foo.o",
        );
        assert_eq!(cmd, "cc src/foo.c -c -I. -Iinc -Wall -Werror -o src/out/foo.o");
    }

    #[test]
    fn test_compile_command_debug_and_no_warn() {
        let rules = default_rules();
        let rule = find_rule(&rules, "c").unwrap();
        let cmd = rule.compile_command("a.c", &[".".to_string()], false, 2, "out/a.o");
        assert_eq!(cmd, "cc a.c -c -I. -g -DDEBUG=2 -o out/a.o");
    }

    #[test]
    fn test_link_command_formatting() {
        let rules = default_rules();
        let rule = find_rule(&rules, "c").unwrap();
        let cmd = rule.link_command(
            "src/out/*.o",
            &["lib/proj.a".to_string(), "deps/foo/lib/foo.a".to_string()],
            1,
            "src/proj",
        );
        assert_eq!(cmd, "cc src/out/*.o lib/proj.a deps/foo/lib/foo.a -g -o src/proj");
    }

    #[test]
    fn test_substitute_does_not_rescan_replacements() {
        let out = substitute(
            "cc {in} -o {out}",
            &[("{in}", "weird_{out}_name.c"), ("{out}", "a.o")],
        );
        assert_eq!(out, "cc weird_{out}_name.c -o a.o");
    }

    #[test]
    fn test_substitute_leaves_unknown_braces() {
        let out = substitute("echo {nope} {in}", &[("{in}", "x")]);
        assert_eq!(out, "echo {nope} x");
    }

    #[test]
    fn test_parse_package_and_folders_in_order() {
        let src = r#"
[package]
name = "proj"
version = "1.2.3"

[folders]
"zeta/" = "--rl"
"alpha/" = "--rs"
"tools/" = "--rt"
"#;
        let m = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        assert_eq!(m.name.as_deref(), Some("proj"));
        assert_eq!(m.version.as_deref(), Some("1.2.3"));
        let keys: Vec<&str> = m.folders.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta/", "alpha/", "tools/"]);
        assert_eq!(m.folders[0].rule, Rule::Lib);
        assert_eq!(m.folders[1].rule, Rule::Src);
        assert_eq!(m.folders[2].rule, Rule::Tool);
    }

    #[test]
    fn test_parse_bad_rule_literal() {
        let src = "[folders]\n\"src/\" = \"--rx\"\n";
        let err = Manifest::parse(src, "flymake.toml", default_rules()).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.reason.contains("--rl"));
        let text = err.to_string();
        assert!(text.starts_with("flymake.toml:2:"));
        assert!(text.contains('^'));
    }

    #[test]
    fn test_parse_compiler_override() {
        let src = r#"
[compiler]
".c" = { warn = "-Wextra" }
"#;
        let m = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        let rule = find_rule(&m.compilers, "c").unwrap();
        assert_eq!(rule.warn, "-Wextra ");
        // other fields keep their defaults
        assert_eq!(rule.cc, DEF_C_CC);
        assert_eq!(rule.ll, DEF_C_LL);
    }

    #[test]
    fn test_parse_new_compiler_group() {
        let src = r#"
[compiler]
".m" = { cc = "clang {in} -c {incs}{warn}{debug}-o {out}", ll = "clang {in} {libs}{debug}-o {out}" }
"#;
        let m = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        assert_eq!(m.compilers.len(), 3);
        let rule = find_rule(&m.compilers, "m").unwrap();
        assert_eq!(rule.inc, DEF_INC);
        assert_eq!(rule.warn, DEF_WARN);
    }

    #[test]
    fn test_parse_new_group_requires_cc_and_ll() {
        let src = "[compiler]\n\".m\" = { cc = \"clang {in} -c {incs}{warn}{debug}-o {out}\" }\n";
        let err = Manifest::parse(src, "flymake.toml", default_rules()).unwrap_err();
        assert!(err.reason.contains("cc=, ll="));
    }

    #[test]
    fn test_parse_rejects_missing_marker() {
        let src = "[compiler]\n\".c\" = { cc = \"cc {in} -c {incs}{warn}-o {out}\" }\n";
        let err = Manifest::parse(src, "flymake.toml", default_rules()).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.reason.contains("{debug}"));
    }

    #[test]
    fn test_parse_rejects_duplicate_marker() {
        let src = "[compiler]\n\".c\" = { ll = \"cc {in} {in} {libs}{debug}-o {out}\" }\n";
        let err = Manifest::parse(src, "flymake.toml", default_rules()).unwrap_err();
        assert!(err.reason.contains("{libs}"));
    }

    #[test]
    fn test_parse_dependency_shapes() {
        let src = r#"
[dependencies]
pre = { path = "../pre/lib/pre.a", inc = "../pre/inc/" }
pkg = { path = "../pkg/", version = "1.2" }
remote = { git = "https://example.com/foo.git", branch = "main" }
"#;
        let m = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        assert_eq!(m.deps.len(), 3);
        assert_eq!(m.deps[0].name, "pre");
        assert!(m.deps[0].path.is_some() && m.deps[0].inc.is_some());
        assert_eq!(m.deps[1].version.as_ref().unwrap().get_ref(), "1.2");
        assert_eq!(
            m.deps[2].git.as_ref().unwrap().get_ref(),
            "https://example.com/foo.git"
        );
    }

    #[test]
    fn test_parse_unknown_tables_tolerated() {
        let src = "[future]\nkey = 1\n\n[package]\nname = \"x\"\n";
        let m = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        assert_eq!(m.name.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_error_location() {
        let src = "[package]\nname = 12\n";
        let err = Manifest::parse(src, "flymake.toml", default_rules()).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_reparse_is_equivalent() {
        let src = r#"
[package]
name = "p"

[folders]
"lib/" = "--rl"

[dependencies]
a = { path = "../a/" }
"#;
        let m1 = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        let m2 = Manifest::parse(src, "flymake.toml", default_rules()).unwrap();
        assert_eq!(m1.name, m2.name);
        assert_eq!(m1.compilers, m2.compilers);
        assert_eq!(m1.folders.len(), m2.folders.len());
        assert_eq!(m1.deps.len(), m2.deps.len());
    }
}
