//! # flymake - a C/C++ project build, test and package manager
//!
//! Inspired by Cargo, flymake scaffolds new C/C++ projects, compiles them
//! with rule-driven conventions, resolves source-level dependencies
//! (prebuilt libraries, sibling projects, git repositories), checks semantic
//! version compatibility across the graph, links programs and runs them.
//!
//! ## Quick Start
//!
//! ```bash
//! # create a new project
//! flymake new foo
//!
//! # build and run it
//! cd foo
//! flymake run
//! ```
//!
//! ## Module Organization
//!
//! - [`project`] - project state and root discovery
//! - [`config`] - manifest parsing (`flymake.toml`)
//! - [`deps`] - dependency resolution and materialization
//! - [`build`] - incremental compiles, folder builders, clean, run
//! - [`target`] - user arguments to build targets

/// Build orchestration: compile drivers, folder builders, clean and run.
pub mod build;

/// Manifest parsing and compiler-rule validation.
pub mod config;

/// Dependency resolution and building.
pub mod deps;

/// The error taxonomy shared by every command.
pub mod error;

/// Command echo and execution (the dry-run machinery lives here).
pub mod exec;

/// Project state, root discovery and manifest loading.
pub mod project;

/// Project scaffolding for the `new` command.
pub mod scaffold;

/// Source file classification and tool grouping.
pub mod sources;

/// Target resolution.
pub mod target;

/// Semver ranges and git-log version discovery.
pub mod version;
