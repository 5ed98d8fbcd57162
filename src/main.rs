use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use jpeg_probe::config::DEFAULT_CHUNK_SIZE;
use jpeg_probe::probe::try_probe_async_read;
use jpeg_probe::{ImageSize, ProbeError, ProbeOptions};

#[derive(Parser)]
#[command(name = "jpeg-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Print JPEG dimensions by reading only the header segments")]
struct Cli {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[arg(long)]
    max_input: Option<u64>,

    #[arg(long)]
    json: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> ProbeOptions {
        let options = ProbeOptions::new().with_chunk_size(self.chunk_size);
        match self.max_input {
            Some(limit) => options.with_max_input(limit),
            None => options,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    path: String,
    #[serde(flatten)]
    size: &'a ImageSize,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.options();
    let tasks: Vec<_> = cli
        .files
        .iter()
        .cloned()
        .map(|path| {
            let options = options.clone();
            tokio::spawn(async move {
                let outcome = probe_file(&path, &options).await;
                (path, outcome)
            })
        })
        .collect();

    let mut all_sized = true;
    for task in tasks {
        let (path, outcome) = task.await.context("Probe task failed")?;
        match outcome {
            Ok(size) => print_size(&path, &size, cli.json)?,
            Err(err) => {
                all_sized = false;
                eprintln!("{}: no dimensions ({}: {})", path.display(), err.kind(), err);
            }
        }
    }

    Ok(if all_sized {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn probe_file(path: &Path, options: &ProbeOptions) -> Result<ImageSize, ProbeError> {
    let file = tokio::fs::File::open(path).await?;
    try_probe_async_read(file, options).await
}

fn print_size(path: &Path, size: &ImageSize, json: bool) -> Result<()> {
    if json {
        let report = Report {
            path: path.display().to_string(),
            size,
        };
        let line = serde_json::to_string(&report).context("Failed to encode report")?;
        println!("{line}");
    } else {
        println!("{}: {}x{}", path.display(), size.width, size.height);
    }
    Ok(())
}
