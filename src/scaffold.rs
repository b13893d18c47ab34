//! The `new` command: project skeletons.
//!
//! Creates the standard folder set, a starter manifest, a hello-world
//! library/program pair and (for library projects) a test skeleton, so that
//! `flymake run` or `flymake test` works immediately after `flymake new`.

use crate::config;
use crate::error::{Error, Result};
use crate::exec::Shell;
use crate::project::{self, Options};
use colored::*;
use std::fs;
use std::path::Path;

struct FileSet {
    docs: bool,
    lib: bool,
    src: bool,
    test: bool,
}

impl FileSet {
    fn from_opts(opts: &Options) -> FileSet {
        if opts.all {
            FileSet { docs: true, lib: true, src: true, test: true }
        } else if opts.lib {
            FileSet { docs: false, lib: true, src: false, test: true }
        } else {
            FileSet { docs: false, lib: false, src: true, test: false }
        }
    }
}

pub fn cmd_new(opts: &Options, folder: &str) -> Result<()> {
    let shell = Shell::new(opts.verbosity, opts.dry_run);
    let path = Path::new(folder);

    if path.exists() {
        let kind = if path.is_dir() { "folder" } else { "file" };
        println!("error: {kind} {folder} already exists");
        return Err(Error::Silent);
    }
    let Some(name) = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
    else {
        println!("error: invalid project name {folder}");
        return Err(Error::Silent);
    };

    // creating a project inside another project needs a deliberate yes
    let rules = config::default_rules();
    if project::find_root(folder, &rules).is_ok() {
        println!("warning: folder {folder} appears to be in a project.");
        let confirmed =
            inquire::Confirm::new("Are you sure you want to create a project within a project?")
                .with_default(false)
                .prompt()
                .unwrap_or(false);
        if !confirmed {
            println!("Aborting...");
            return Err(Error::Silent);
        }
    }

    let set = FileSet::from_opts(opts);

    shell.status("# Creating folders...");
    shell.make_dir(path)?;
    shell.make_dir(&path.join("inc"))?;
    if set.docs {
        shell.make_dir(&path.join("docs"))?;
    }
    if set.lib {
        shell.make_dir(&path.join("lib"))?;
    }
    if set.src {
        shell.make_dir(&path.join("src"))?;
    }
    if set.test {
        shell.make_dir(&path.join("test"))?;
    }

    shell.status("\n# Creating files...");
    write_file(&shell, &path.join("LICENSE.txt"), LICENSE)?;
    write_file(&shell, &path.join("README.md"), &readme(&name, &set))?;
    write_file(
        &shell,
        &path.join(config::MANIFEST_NAME),
        &manifest(&name),
    )?;

    let (hdr_ext, src_ext) = if opts.cpp { ("hpp", "cpp") } else { ("h", "c") };
    let caps = name.to_uppercase().replace(['-', '.'], "_");

    write_file(
        &shell,
        &path.join("inc").join(format!("{name}.{hdr_ext}")),
        &if opts.cpp { header_cpp(&name, &caps) } else { header_c(&name, &caps) },
    )?;

    if set.src {
        write_file(
            &shell,
            &path.join("src").join(format!("{name}.{src_ext}")),
            &if opts.cpp { main_cpp(&name) } else { main_c(&name) },
        )?;
    }

    // the hello-printing translation unit lands in lib/ when there is one
    let print_folder = if set.lib { "lib" } else { "src" };
    write_file(
        &shell,
        &path
            .join(print_folder)
            .join(format!("{name}_print.{src_ext}")),
        &if opts.cpp { print_cpp(&name) } else { print_c(&name) },
    )?;

    if set.test {
        write_file(
            &shell,
            &path.join("test").join(format!("test_{name}.{src_ext}")),
            &if opts.cpp { test_cpp(&name) } else { test_c(&name) },
        )?;
    }

    if set.docs {
        write_file(
            &shell,
            &path.join("docs/api_guide.md"),
            &api_guide(&name),
        )?;
    }

    println!("{} created project {}", "✓".green(), name.bold());
    Ok(())
}

fn write_file(shell: &Shell, path: &Path, contents: &str) -> Result<()> {
    shell.status(&path.display().to_string());
    if !shell.dry_run {
        fs::write(path, contents).map_err(|_| Error::Write(path.display().to_string()))?;
    }
    Ok(())
}

fn manifest(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"

[dependencies]
# foo = {{ path="../foo/lib/foo.a", inc="../foo/inc" }}
# bar = {{ path="../bar" }}
# baz = {{ git="https://github.com/example/baz.git", version="*" }}

[compiler]
# ".c" = {{ cc="cc {{in}} -c {{incs}}{{warn}}{{debug}}-o {{out}}", ll="cc {{in}} {{libs}}{{debug}}-o {{out}}" }}

[folders]
# "lib/" = "--rl"
# "src/" = "--rs"
# "test/" = "--rt"
"#
    )
}

fn readme(name: &str, set: &FileSet) -> String {
    let mut tree = String::new();
    if set.docs {
        tree.push_str("docs    Documents such as the user manual\n");
    }
    tree.push_str("inc     Public API include files\n");
    if set.lib {
        tree.push_str("lib     Package (library) source code\n");
    }
    if set.src {
        tree.push_str("src     Project source code\n");
    }
    if set.test {
        tree.push_str("test    Test suite source code\n");
    }
    format!(
        "# README for project {name}\n\n## Project Folder Tree\n\n```\n{tree}```\n"
    )
}

fn api_guide(name: &str) -> String {
    format!(
        r#"# API Guide for {name}

## print_hello

Prints "hello foo!", where foo is the given string. Also allocates and
returns the string.

```
char * print_hello(const char *sz);
```
"#
    )
}

fn header_c(name: &str, caps: &str) -> String {
    format!(
        r#"/*
  Project wide types and defines go here.
*/
#include <stdio.h>
#include <stdlib.h>
#include <string.h>

#ifndef {caps}_H
#define {caps}_H

#define SZ_PROJ_NAME "{name}"

#ifndef DEBUG
  #define DEBUG 0
#endif

#if DEBUG
  #define SZ_DEBUG "(debug) "
#else
  #define SZ_DEBUG ""
#endif

char * print_hello(const char *sz);

#endif // {caps}_H
"#
    )
}

fn print_c(name: &str) -> String {
    format!(
        r#"/*
  hello world example
*/
#include "{name}.h"

char * print_hello(const char *sz)
{{
  const char szDebug[] = SZ_DEBUG;
  char *psz = malloc(sizeof(szDebug) + strlen(sz));

  if(psz)
  {{
    strcpy(psz, szDebug);
    strcat(psz, sz);
    printf("hello %s!\n", psz);
  }}

  return psz;
}}
"#
    )
}

fn main_c(name: &str) -> String {
    format!(
        r#"/*
  main program
*/
#include "{name}.h"

int main(int argc, const char *argv[])
{{
  (void)argc;
  (void)argv;
  print_hello(SZ_PROJ_NAME);
  return 0;
}}
"#
    )
}

fn test_c(name: &str) -> String {
    format!(
        r#"/*
  test cases go here
*/
#include "{name}.h"

int main(void)
{{
  const char szExpected[] = SZ_DEBUG SZ_PROJ_NAME;
  char *szResult = print_hello(SZ_PROJ_NAME);

  if(szResult == NULL || strcmp(szResult, szExpected) != 0)
  {{
    printf("test failed\n");
    return 1;
  }}
  printf("test passed\n");
  return 0;
}}
"#
    )
}

fn header_cpp(name: &str, caps: &str) -> String {
    format!(
        r#"/*
  Project wide types and defines go here.
*/
#include <string>

#ifndef {caps}_HPP
#define {caps}_HPP

#define SZ_PROJ_NAME "{name}"

class Greeter {{
  public:
    std::string greeting;
    explicit Greeter(std::string greeting) : greeting(std::move(greeting)) {{}}
    void greet(const std::string &who);
}};

#endif // {caps}_HPP
"#
    )
}

fn print_cpp(name: &str) -> String {
    format!(
        r#"#include <iostream>
#include "{name}.hpp"

void Greeter::greet(const std::string &who)
{{
  std::cout << greeting << " " << who << "!\n";
}}
"#
    )
}

fn main_cpp(name: &str) -> String {
    format!(
        r#"#include "{name}.hpp"

int main()
{{
  Greeter hello("hello");
  hello.greet(SZ_PROJ_NAME);
  return 0;
}}
"#
    )
}

fn test_cpp(name: &str) -> String {
    format!(
        r#"#include <iostream>
#include "{name}.hpp"

int main()
{{
  Greeter hello("hello");
  hello.greet(SZ_PROJ_NAME);
  std::cout << "test passed\n";
  return 0;
}}
"#
    )
}

const LICENSE: &str = r#"MIT License <https://mit-license.org>

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> Options {
        Options {
            verbosity: 0,
            ..Options::default()
        }
    }

    #[test]
    fn test_new_default_project() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("a/b/c");
        fs::create_dir_all(&base).unwrap();
        let target = base.join("myapp");
        cmd_new(&quiet(), &target.display().to_string()).unwrap();

        assert!(target.join("flymake.toml").is_file());
        assert!(target.join("inc/myapp.h").is_file());
        assert!(target.join("src/myapp.c").is_file());
        assert!(target.join("src/myapp_print.c").is_file());
        assert!(!target.join("lib").exists());
        assert!(!target.join("test").exists());

        // the generated manifest parses cleanly
        let src = fs::read_to_string(target.join("flymake.toml")).unwrap();
        let m = crate::config::Manifest::parse(&src, "flymake.toml", config::default_rules())
            .unwrap();
        assert_eq!(m.name.as_deref(), Some("myapp"));
        assert_eq!(m.version.as_deref(), Some("0.1.0"));
    }

    #[test]
    fn test_new_library_project() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("a/b/c");
        fs::create_dir_all(&base).unwrap();
        let target = base.join("mylib");
        let opts = Options {
            lib: true,
            verbosity: 0,
            ..Options::default()
        };
        cmd_new(&opts, &target.display().to_string()).unwrap();

        assert!(target.join("lib/mylib_print.c").is_file());
        assert!(target.join("test/test_mylib.c").is_file());
        assert!(!target.join("src").exists());
    }

    #[test]
    fn test_new_cpp_project() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("a/b/c");
        fs::create_dir_all(&base).unwrap();
        let target = base.join("cppapp");
        let opts = Options {
            cpp: true,
            verbosity: 0,
            ..Options::default()
        };
        cmd_new(&opts, &target.display().to_string()).unwrap();
        assert!(target.join("inc/cppapp.hpp").is_file());
        assert!(target.join("src/cppapp.cpp").is_file());
    }

    #[test]
    fn test_new_refuses_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        fs::create_dir(&target).unwrap();
        let result = cmd_new(&quiet(), &target.display().to_string());
        assert!(matches!(result, Err(Error::Silent)));
    }

    #[test]
    fn test_new_dry_run_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("a/b/c");
        fs::create_dir_all(&base).unwrap();
        let target = base.join("ghost");
        let opts = Options {
            dry_run: true,
            verbosity: 0,
            ..Options::default()
        };
        cmd_new(&opts, &target.display().to_string()).unwrap();
        assert!(!target.exists());
    }
}
