use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsift::config::Config;
use docsift::processing::{preview, write_output, DocumentProcessor};

#[derive(Parser)]
#[command(name = "docsift")]
#[command(about = "Extract plain text from PDFs, images and office documents")]
struct Args {
    /// File to process. Asked for on stdin when omitted.
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    if config.ocr.api_key.is_none() {
        anyhow::bail!("MISTRAL_API_KEY is not set. Add it to the environment or a .env file.");
    }

    let processor = DocumentProcessor::new(&config)?;

    let path = match args.path {
        Some(path) => path,
        None => prompt_for_path()?,
    };

    let text = match processor.process_file(&path).await {
        Ok(content) if !content.is_blank() => content.text,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "No text extracted");
            println!("Failed to extract text from file.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            tracing::error!(path = %path.display(), "{}", e);
            println!("Failed to extract text from file.");
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("\n=== Extracted Text ===");
    println!("{}", preview(&text, config.output.preview_chars));

    let output = write_output(&path, &text).await?;
    println!("\nSaved to: {}", output.display());

    Ok(ExitCode::SUCCESS)
}

fn prompt_for_path() -> anyhow::Result<PathBuf> {
    print!("Enter the path of the file to process: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read file path from stdin")?;

    Ok(PathBuf::from(line.trim()))
}
