//! Mt CLI

use clap::{Parser, Subcommand};
use mt::error::report_error;
use mt::interp::{self, Session};
use mt::repl::Repl;
use mt::{CompileError, Config};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mt", version, about = "Mt - interactive mathematics environment")]
struct Cli {
    /// Configuration file (default: ./mt.cfg)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive prompt (default)
    Repl,
    /// Evaluate one line of SML and print the result
    Eval {
        /// Source text
        expr: String,
    },
    /// Run an SML source file
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
}

fn main() {
    mt::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => start_repl(cli.config.as_deref()),
        Command::Eval { expr } => eval_source("<eval>", &expr, cli.config.as_deref()),
        Command::Run { file } => run_file(&file, cli.config.as_deref()),
        Command::Parse { file } => parse_file(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Resolve configuration and install the process-wide registry
fn setup(config_path: Option<&Path>) -> Result<(Config, Arc<interp::Registry>), CompileError> {
    let config = Config::resolve(config_path)?;
    let registry = mt::build_registry(&config)?;
    if interp::builtins::install(Arc::clone(&registry)).is_err() {
        tracing::warn!("process registry already installed");
    }
    Ok((config, interp::builtins::global()))
}

fn start_repl(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, registry) = setup(config_path)?;
    let mut repl = Repl::new(registry, config)?;
    repl.run()?;
    Ok(())
}

fn eval_source(
    filename: &str,
    source: &str,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, registry) = setup(config_path)?;
    let mut session = Session::with_config(registry, &config);

    let outcome = mt::parse_source(filename, source)
        .and_then(|program| session.run(&program).map_err(CompileError::from));
    match outcome {
        Ok(Some(value)) => {
            println!("{value}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            report_error(filename, source, &err);
            Err(err.into())
        }
    }
}

fn run_file(path: &Path, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    eval_source(&filename, &source, config_path)
}

fn parse_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let ast = match mt::parse_source(&filename, &source) {
        Ok(ast) => ast,
        Err(err) => {
            report_error(&filename, &source, &err);
            return Err(err.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}
