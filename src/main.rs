use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::*;
use flymake::build;
use flymake::config::{self, Rule};
use flymake::deps;
use flymake::error::{Error, Result};
use flymake::project::{self, Options, Project};
use flymake::scaffold;
use flymake::target;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "flymake")]
#[command(about = "A C/C++ project build, test and package manager, all in one", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Rebuild project targets even if up to date (but not dependencies)
    #[arg(short = 'B', global = true)]
    rebuild: bool,

    /// Build with debug flags; -D=2 passes -DDEBUG=2
    #[arg(short = 'D', global = true, value_name = "N", num_args = 0..=1,
          require_equals = true, default_missing_value = "1")]
    debug: Option<u32>,

    /// Dry run: print the commands without executing anything
    #[arg(short = 'n', long = "dry-run", global = true)]
    dry_run: bool,

    /// Verbosity: -v=0 errors only, -v normal, -v=2 more
    #[arg(short = 'v', global = true, value_name = "N", num_args = 0..=1,
          require_equals = true, default_missing_value = "1")]
    verbose: Option<u8>,

    /// Turn off warnings-as-errors when compiling
    #[arg(short = 'w', long = "no-warn", global = true)]
    no_warn: bool,

    /// Rebuild everything, dependencies included; for clean, remove deps/ too
    #[arg(long, global = true)]
    all: bool,

    /// For new: create a C++ project instead of C
    #[arg(long, global = true)]
    cpp: bool,

    /// For new: create a library skeleton (lib/ and test/, no src/)
    #[arg(long, global = true)]
    lib: bool,

    /// Force library rules for all targets
    #[arg(long = "rl", global = true)]
    rules_lib: bool,

    /// Force source-program rules for all targets
    #[arg(long = "rs", global = true)]
    rules_src: bool,

    /// Force tool rules for all targets
    #[arg(long = "rt", global = true)]
    rules_tool: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project or specific targets
    Build {
        /// Folders or files to build; the whole project when omitted
        targets: Vec<String>,
    },
    /// Remove object files; -B also removes programs and libraries
    Clean,
    /// Create a new C or C++ project
    New {
        /// Folder to create
        folder: String,
    },
    /// Build the project, then run the target program(s)
    Run {
        /// Programs or folders to run; defaults to the src/ program
        targets: Vec<String>,
        /// Arguments after -- go to the child program(s)
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Build the project, then run the programs in the test/ folder
    Test {
        /// Tests or folders to run; defaults to the test/ folder
        targets: Vec<String>,
        /// Arguments after -- go to the child program(s)
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Generate shell completion scripts
    Completion { shell: CompletionShell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let forced = [
        (cli.rules_lib, Rule::Lib),
        (cli.rules_src, Rule::Src),
        (cli.rules_tool, Rule::Tool),
    ];
    if forced.iter().filter(|(set, _)| *set).count() > 1 {
        println!("flymake error: select only one of --rl, --rs or --rt");
        return ExitCode::FAILURE;
    }
    let forced_rule = forced.iter().find(|(set, _)| *set).map(|(_, r)| *r);

    let mut opts = Options {
        rebuild: cli.rebuild || cli.all,
        all: cli.all,
        debug: cli.debug.unwrap_or(0),
        dry_run: cli.dry_run,
        verbosity: cli.verbose.unwrap_or(1),
        warnings: !cli.no_warn,
        forced_rule,
        cpp: cli.cpp,
        lib: cli.lib,
    };

    // a dry run is only useful when the commands show
    if opts.dry_run {
        if opts.verbosity == 0 {
            opts.verbosity = 1;
        }
        let args: Vec<String> = std::env::args().skip(1).collect();
        println!("# shell script for flymake {}", args.join(" "));
    }

    if opts.verbosity >= 1 {
        println!("\n# flymake v{}", env!("CARGO_PKG_VERSION"));
    }

    let result = dispatch(cli.command, opts);
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    };
    println!();
    code
}

fn dispatch(command: Option<Commands>, opts: Options) -> Result<()> {
    match command {
        None => cmd_build(opts, &[]),
        Some(Commands::Build { targets }) => cmd_build(opts, &targets),
        Some(Commands::Clean) => {
            let project = discover(opts, None)?;
            build::clean(&project)
        }
        Some(Commands::New { folder }) => scaffold::cmd_new(&opts, &folder),
        Some(Commands::Run { targets, args }) => {
            let mut project = discover(opts, targets.first())?;
            build::run::cmd_run(&mut project, &targets, &args)
        }
        Some(Commands::Test { targets, args }) => {
            let mut project = discover(opts, targets.first())?;
            build::run::cmd_test(&mut project, &targets, &args)
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Resolve the project root from the first target (or the current folder)
/// and load its state.
fn discover(opts: Options, first_target: Option<&String>) -> Result<Project> {
    let path = first_target.map_or(".", |s| s.as_str());
    let rules = config::default_rules();
    let root = project::find_root(path, &rules)?;
    Project::load(root, opts, rules, None)
}

fn cmd_build(opts: Options, targets: &[String]) -> Result<()> {
    let mut project = discover(opts, targets.first())?;

    // dependencies come first: they fill the include and library lists the
    // project's own compiles and links need
    deps::resolve_and_build(&mut project)?;

    if targets.is_empty() {
        let raw = project.root.display().to_string();
        let whole = target::resolve_target(&project, &raw)?;
        build::build_target(&mut project, &whole)?;
    } else {
        for raw in targets {
            let t = target::resolve_target(&project, raw)?;
            build::build_target(&mut project, &t)?;
        }
    }

    if project.src_files == 0 {
        println!("flymake warning: empty project");
    } else if project.compiled == 0 {
        println!("# Everything is up to date");
    }
    Ok(())
}

fn print_error(err: &Error) {
    match err {
        // the detecting site already said everything there is to say
        Error::Silent => {}
        // manifest errors carry their own file:line:col block
        Error::Manifest(e) => println!("{e}"),
        other => println!("{} {other}", "flymake error:".red()),
    }
}
