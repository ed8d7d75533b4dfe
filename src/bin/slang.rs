//! Command-line interface for slang
//! Translates slang source to Python and back, runs or byte-compiles it, and
//! generates editor support from a mapping document.
//!
//! Usage:
//!   slang transpile `<input>` -m `<mapping>` [-o `<out>`] [-r]  - Translate a file
//!   slang run `<input>` -m `<mapping>`                        - Translate and run
//!   slang compile `<input>` -m `<mapping>` [-o `<out>`]       - Translate and byte-compile
//!   slang repl -m `<mapping>`                                 - Interactive session
//!   slang vscode -m `<mapping>` [-o `<dir>`]                  - VS Code extension scaffold

use clap::{Arg, ArgAction, ArgMatches, Command};
use slang::slang::drivers::{ProcessEvaluator, PythonRunner, ReplSession};
use slang::slang::engine::{Direction, TranspileOptions, TranspileOutcome, Transpiler};
use slang::slang::extension::ExtensionScaffold;
use slang::slang::mapping::MappingDocument;
use slang::slang::settings::{Loader, SlangSettings, LOCAL_SETTINGS_FILE};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn mapping_arg() -> Arg {
    Arg::new("mapping")
        .long("mapping")
        .short('m')
        .help("Path to the keyword mapping document (JSON or YAML)")
        .required(true)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Path to the source file")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("slang")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A keyword-substitution transpiler between slang and Python")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("settings")
                .long("settings")
                .help("Settings file layered over the defaults and ./slang.toml")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("transpile")
                .about("Translate a file to Python, or back with --reverse")
                .arg(input_arg())
                .arg(mapping_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the result here instead of stdout"),
                )
                .arg(
                    Arg::new("reverse")
                        .long("reverse")
                        .short('r')
                        .help("Translate Python to slang")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Translate a file and run it with Python")
                .arg(input_arg())
                .arg(mapping_arg()),
        )
        .subcommand(
            Command::new("compile")
                .about("Translate a file and byte-compile it to .pyc")
                .arg(input_arg())
                .arg(mapping_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output path without extension (default: input without extension)"),
                ),
        )
        .subcommand(
            Command::new("repl")
                .about("Start an interactive session")
                .arg(mapping_arg()),
        )
        .subcommand(
            Command::new("vscode")
                .about("Generate a VS Code syntax-highlighting extension")
                .arg(mapping_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Extension directory (default: vscode-<language id>)"),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    init_logging(matches.get_flag("verbose"));
    let settings = load_settings(matches.get_one::<String>("settings"));

    match matches.subcommand() {
        Some(("transpile", sub)) => handle_transpile_command(sub, &settings),
        Some(("run", sub)) => handle_run_command(sub, &settings),
        Some(("compile", sub)) => handle_compile_command(sub, &settings),
        Some(("repl", sub)) => handle_repl_command(sub, &settings),
        Some(("vscode", sub)) => handle_vscode_command(sub),
        _ => unreachable!("a subcommand is required"),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(explicit: Option<&String>) -> SlangSettings {
    let mut loader = Loader::new().with_optional_file(LOCAL_SETTINGS_FILE);
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    }
    loader
        .build()
        .unwrap_or_else(|e| exit_with("Settings error", e))
}

fn exit_with(context: &str, error: impl Display) -> ! {
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_else(|| exit_with("Missing argument", id))
}

fn load_transpiler(matches: &ArgMatches, settings: &SlangSettings) -> Transpiler {
    let mapping = required(matches, "mapping");
    Transpiler::from_path(mapping, TranspileOptions::from(&settings.transpile))
        .unwrap_or_else(|e| exit_with("Configuration error", e))
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| exit_with(&format!("Failed to read {}", path), e))
}

/// Handle the transpile command
fn handle_transpile_command(matches: &ArgMatches, settings: &SlangSettings) {
    let transpiler = load_transpiler(matches, settings);
    let input = Path::new(required(matches, "input"));
    let output = matches.get_one::<String>("output").map(Path::new);
    let direction = if matches.get_flag("reverse") {
        Direction::FromCanonical
    } else {
        Direction::ToCanonical
    };

    match transpiler.transpile_file(input, output, direction) {
        Ok(TranspileOutcome::Written(path)) => println!("Transpiled to {}", path.display()),
        Ok(TranspileOutcome::Text(text)) => print!("{}", text),
        Err(e) => exit_with("Transpile error", e),
    }
}

/// Handle the run command; the process exits with the program's status
fn handle_run_command(matches: &ArgMatches, settings: &SlangSettings) {
    let transpiler = load_transpiler(matches, settings);
    let canonical = transpiler.to_canonical(&read_source(required(matches, "input")));

    let runner = PythonRunner::new(settings.runner.python.clone());
    let status = runner
        .run_attached(&canonical)
        .unwrap_or_else(|e| exit_with("Run error", e));
    std::process::exit(status.code().unwrap_or(1));
}

/// Handle the compile command
fn handle_compile_command(matches: &ArgMatches, settings: &SlangSettings) {
    let transpiler = load_transpiler(matches, settings);
    let input = required(matches, "input");
    let canonical = transpiler.to_canonical(&read_source(input));

    let target = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(input).with_extension(""));

    let runner = PythonRunner::new(settings.runner.python.clone());
    let artifact = runner
        .compile_from(Path::new(input), &canonical, &target)
        .unwrap_or_else(|e| exit_with("Compile error", e));
    println!("Compiled to {}", artifact.bytecode.display());
}

/// Handle the repl command
fn handle_repl_command(matches: &ArgMatches, settings: &SlangSettings) {
    let transpiler = load_transpiler(matches, settings);
    let evaluator = ProcessEvaluator::new(PythonRunner::new(settings.runner.python.clone()));

    let mut session = ReplSession::new(&transpiler, evaluator, &settings.repl)
        .unwrap_or_else(|e| exit_with("REPL error", e));
    if let Err(e) = session.run() {
        drop(session);
        exit_with("REPL error", e);
    }
}

/// Handle the vscode command
fn handle_vscode_command(matches: &ArgMatches) {
    let document = MappingDocument::from_path(required(matches, "mapping"))
        .unwrap_or_else(|e| exit_with("Configuration error", e));
    let scaffold =
        ExtensionScaffold::generate(&document).unwrap_or_else(|e| exit_with("Scaffold error", e));

    let dir = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| scaffold.default_dir());
    scaffold
        .write_to(&dir)
        .unwrap_or_else(|e| exit_with("Scaffold error", e));
    println!("Generated VS Code extension in {}", dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }
}
