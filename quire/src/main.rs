//! quire CLI: edit a spreadsheet or Word document through an agent.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use quire::prelude::*;
use quire::{QuireConfig, QuireError, build_agent};

#[derive(Parser)]
#[command(name = "quire", version, about = "Edit .xlsx and .docx files by asking an agent")]
struct Cli {
    /// Config file (defaults to ./quire.json when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session id; runs in the same session share history.
    #[arg(long, default_value = "default")]
    session: String,

    /// Model override.
    #[arg(long)]
    model: Option<String>,

    /// Engine consultations allowed per message.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// The document to edit.
    file: PathBuf,

    /// Message to send. Without one, quire reads messages from stdin, one per line.
    message: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli(Cli::parse()).await {
        eprintln!("quire error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<(), QuireError> {
    let mut config = QuireConfig::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.agent.model = Some(model);
    }
    if let Some(max) = cli.max_iterations {
        config.agent.max_iterations = max;
    }

    let agent = build_agent(&config, Arc::new(SessionStore::new()))?;
    let session = SessionId::new(cli.session);
    tracing::info!(
        file = %cli.file.display(),
        kind = %FileKind::from_path(&cli.file),
        session = %session,
        "quire ready"
    );

    if !cli.message.is_empty() {
        let output = agent.run(&cli.message.join(" "), &cli.file, &session).await?;
        println!("{}", output.response);
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }
        match agent.run(message, &cli.file, &session).await {
            Ok(output) => println!("{}", output.response),
            Err(err) => eprintln!("quire error: {err}"),
        }
    }
    Ok(())
}
