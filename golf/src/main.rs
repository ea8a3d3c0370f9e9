//! Golf interpreter CLI

use clap::{Parser, Subcommand};
use golf::error::report_error;
use golf::{GolfError, RunConfig};
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "golf", version, about = "Golf - terse stack language interpreter")]
struct Cli {
    /// Log interpreter activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program file
    Run {
        /// Source file to run
        file: PathBuf,
        /// Fixed seed for `rand`
        #[arg(long)]
        seed: Option<u64>,
        /// Maximum block nesting depth
        #[arg(long, default_value_t = golf::config::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        /// Start with an empty string instead of piped input
        #[arg(long)]
        no_stdin: bool,
    },
    /// Run a program given on the command line
    Eval {
        /// Program text
        code: String,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
        /// Emit JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run {
            file,
            seed,
            max_depth,
            no_stdin,
        } => {
            let mut config = RunConfig::new().max_depth(max_depth).read_stdin(!no_stdin);
            config.seed = seed;
            run_file(&file, config)
        }
        Command::Eval { code } => run_program("<eval>", code.as_bytes(), RunConfig::new()),
        Command::Tokens { file, json } => tokenize_file(&file, json),
        Command::Repl => start_repl(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("GOLF_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_file(path: &PathBuf, config: RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read(path)?;
    let filename = path.display().to_string();
    run_program(&filename, &source, config)
}

fn run_program(
    filename: &str,
    source: &[u8],
    config: RunConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(config.read_stdin)?;
    match golf::run_source(source, &input, config) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&output)?;
            stdout.flush()?;
            Ok(())
        }
        Err(e @ GolfError::Lexer { .. }) => {
            report_error(filename, source, &e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Piped standard input, or nothing when stdin is a terminal
fn read_input(enabled: bool) -> io::Result<Vec<u8>> {
    let mut input = Vec::new();
    let stdin = io::stdin();
    if enabled && !stdin.is_terminal() {
        stdin.lock().read_to_end(&mut input)?;
    }
    Ok(input)
}

fn tokenize_file(path: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read(path)?;

    let tokens = golf::lexer::tokenize(&source)?;
    if json {
        let entries: Vec<_> = tokens
            .iter()
            .map(|(tok, span)| {
                serde_json::json!({
                    "kind": tok.kind_name(),
                    "text": String::from_utf8_lossy(span.text(&source)),
                    "span": span,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (tok, span) in &tokens {
            println!("{:?} @ {}..{}", tok, span.start, span.end);
        }
    }

    Ok(())
}

fn start_repl() -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = golf::repl::Repl::new()?;
    repl.run()?;
    Ok(())
}
