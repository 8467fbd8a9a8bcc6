use std::{io::Write, path::PathBuf, process::ExitCode};

use clap::Parser;
use ruanko::{Engine, EngineConfig, Session};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HISTORY_FILE: &str = ".ruanko_history";

/// File-backed relational database engine
#[derive(Parser, Debug)]
#[command(name = "ruanko", version, about)]
struct Args {
    /// Data directory holding ruanko.db and one directory per database
    #[arg(short, long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database to select before running anything
    #[arg(short, long)]
    database: Option<String>,

    /// Execute a single statement and exit
    #[arg(short, long)]
    command: Option<String>,

    /// Execute the statements of a file and exit
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ruanko=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ruanko=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(root) = &args.root {
        config.root_path = root.clone();
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let engine = Engine::open(config)?;
    let mut session = Session::new();

    if let Some(database) = &args.database {
        if !engine.catalog().set_current_database(&mut session, database) {
            return Err(format!("database '{}' does not exist", database).into());
        }
    }

    if let Some(command) = &args.command {
        println!("{}", engine.execute(command, &mut session));
        return Ok(());
    }
    if let Some(file) = &args.file {
        info!("Executing file: {}", file.display());
        let content = std::fs::read_to_string(file)?;
        for statement in split_statements(&content) {
            println!("{}", engine.execute(&statement, &mut session));
        }
        return Ok(());
    }

    run_repl(&engine, &mut session)
}

/// Splits script text on `;` outside quoted strings, dropping `--` comment lines and blank pieces.
fn split_statements(content: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;

    for (i, c) in content.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ';') => {
                pieces.push(&content[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&content[start..]);

    pieces
        .into_iter()
        .map(|piece| {
            piece
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty() && statement != ";")
        .collect()
}

/// Reads lines until the statement ends with `;`.
fn read_statement(rl: &mut DefaultEditor, prompt: &str) -> rustyline::Result<String> {
    let mut input = String::new();
    let mut prompt = prompt.to_string();

    loop {
        let line = rl.readline(&prompt)?;
        let trimmed = line.trim_end();
        if !input.is_empty() {
            input.push(' ');
        }
        input.push_str(trimmed);

        let command = input.trim();
        if command.is_empty() || command.ends_with(';') || is_shell_command(command) {
            return Ok(input);
        }
        prompt = "     -> ".to_string();
    }
}

fn is_shell_command(command: &str) -> bool {
    matches!(
        command.to_lowercase().as_str(),
        "exit" | "quit" | "q" | "clear" | "help"
    )
}

fn run_repl(engine: &Engine, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    println!("ruanko {}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help;' for the supported statements, 'exit' to quit.");
    println!("Statements end with ';' and may span several lines.\n");

    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        let prompt = match &session.current_database {
            Some(database) => format!("ruanko [{}]> ", database),
            None => "ruanko> ".to_string(),
        };

        match read_statement(&mut rl, &prompt) {
            Ok(input) => {
                let command = input.trim();
                if command.is_empty() {
                    continue;
                }
                rl.add_history_entry(command)?;

                match command.to_lowercase().as_str() {
                    "exit" | "quit" | "q" => {
                        println!("Goodbye!");
                        break;
                    }
                    "clear" => {
                        print!("\x1B[2J\x1B[1;1H");
                        std::io::stdout().flush()?;
                    }
                    "help" => println!("{}", engine.execute("help;", session)),
                    _ => println!("{}", engine.execute(command, session)),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
