use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser as ClapParser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use strata_runtime::ModuleRegistry;
use stratac::codegen::{default_output_path, validate_path, write_c_source};
use stratac::config::{Config, Flags};
use stratac::{Interpreter, Parser, SourceLoc, TypeChecker, generate_c};

/// Strata - run a .str program and transpile it to C
#[derive(ClapParser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args)]
struct RunArgs {
    /// Strata source file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path of the generated C file (default: FILE with a .c extension)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Skip type checking
    #[arg(long)]
    no_check: bool,

    /// Do not write the generated C file
    #[arg(long, conflicts_with = "emit_only")]
    no_emit: bool,

    /// Write the generated C file without running the program
    #[arg(long)]
    emit_only: bool,

    /// Print progress for each stage to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: strata.config.toml beside FILE, if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions for bash, zsh, fish, or powershell
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// A failure that has already been reported on stderr
struct Reported;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            ExitCode::SUCCESS
        }
        None => {
            let Some(file) = cli.run.file.as_deref() else {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "a source file is required: strata <FILE>",
                    )
                    .exit()
            };
            match run_command(file, &cli.run) {
                Ok(()) => ExitCode::SUCCESS,
                Err(Reported) => ExitCode::FAILURE,
            }
        }
    }
}

fn run_command(file: &Path, args: &RunArgs) -> Result<(), Reported> {
    let start = Instant::now();

    let source = fs::read_to_string(file).map_err(|e| {
        eprintln!("error: could not read {}: {}", file.display(), e);
        Reported
    })?;

    let mut config = Config::load(args.config.as_deref(), file).map_err(|e| {
        eprintln!("error: {}", e);
        Reported
    })?;
    config.apply_flags(Flags {
        no_check: args.no_check,
        no_emit: args.no_emit,
        verbose: args.verbose,
    });
    let verbose = config.diagnostics.verbose;

    if verbose {
        eprintln!("Parsing {}...", file.display());
    }
    let program = Parser::new_with_filename(&source, &file.to_string_lossy())
        .parse()
        .map_err(|e| {
            report(&source, &e.to_string(), e.line, e.column);
            Reported
        })?;

    if config.pipeline.type_check {
        if verbose {
            eprintln!("Type checking...");
        }
        if let Err(errors) = TypeChecker::new().check_program(&program) {
            for error in errors.iter() {
                report_at(&source, &error.to_string(), error.loc());
            }
            eprintln!("{} type error(s)", errors.len());
            return Err(Reported);
        }
    }

    if !args.emit_only {
        if verbose {
            eprintln!("Running...");
        }
        let registry = ModuleRegistry::standard();
        let stdout = io::stdout();
        let mut interpreter = Interpreter::with_output(&registry, stdout.lock());
        interpreter.run(&program).map_err(|e| {
            report_at(&source, &e.to_string(), e.loc());
            Reported
        })?;
    }

    if config.pipeline.emit_c || args.emit_only {
        let path = match &args.output {
            Some(output) => {
                validate_path(output).map_err(|e| {
                    eprintln!("error: {}", e);
                    Reported
                })?;
                PathBuf::from(output)
            }
            None => default_output_path(file, config.output.c_dir.as_deref()),
        };
        write_c_source(&generate_c(&program), &path).map_err(|e| {
            eprintln!("error: {}", e);
            Reported
        })?;
        if verbose {
            eprintln!("Wrote {}", path.display());
        }
    }

    if config.diagnostics.timing {
        eprintln!(
            "Executed in {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    Ok(())
}

fn report_at(source: &str, message: &str, loc: &SourceLoc) {
    report_line(message, loc.line, loc.column, Some(loc.line_slice(source)));
}

fn report(source: &str, message: &str, line: usize, column: usize) {
    let text = line.checked_sub(1).and_then(|i| source.lines().nth(i));
    report_line(message, line, column, text);
}

/// `error: <message>` followed by the offending line and a caret
fn report_line(message: &str, line: usize, column: usize, text: Option<&str>) {
    eprintln!("error: {}", message);
    let Some(text) = text.filter(|_| line > 0) else {
        return;
    };
    let gutter = line.to_string();
    eprintln!("{} | {}", gutter, text.trim_end_matches('\r'));
    eprintln!(
        "{} | {}^",
        " ".repeat(gutter.len()),
        " ".repeat(column.saturating_sub(1))
    );
}

fn generate_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}
