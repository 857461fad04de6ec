use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use ragdoc::{Answer, OllamaClient, OllamaConfig, RagConfig, RagPipeline};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Ask questions about a PDF using a local Ollama server.
#[derive(Debug, Parser)]
#[command(name = "ragdoc", version, about)]
struct Cli {
    /// PDF to ingest before answering.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Questions to answer. Read one per line from stdin when omitted.
    questions: Vec<String>,

    /// Answer without retrieval.
    #[arg(long)]
    chat: bool,

    /// Pull the completion and embedding models if the server lacks them.
    #[arg(long)]
    pull: bool,

    /// Skip waiting for the server to come up.
    #[arg(long)]
    no_wait: bool,

    /// Ollama base URL (defaults to $OLLAMA_URL).
    #[arg(long)]
    ollama_url: Option<String>,

    /// Completion model (defaults to $OLLAMA_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Embedding model (defaults to $OLLAMA_EMBED_MODEL).
    #[arg(long)]
    embed_model: Option<String>,

    /// Number of chunks retrieved per question.
    #[arg(long, default_value_t = 3)]
    top_k: usize,

    /// Target chunk size in characters.
    #[arg(long, default_value_t = 500)]
    chunk_size: usize,

    /// Sentence overlap between chunks in characters.
    #[arg(long, default_value_t = 100)]
    chunk_overlap: usize,
}

impl Cli {
    fn ollama_config(&self) -> OllamaConfig {
        let mut config = OllamaConfig::from_env();
        if let Some(url) = &self.ollama_url {
            config = config.with_base_url(url);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(model) = &self.embed_model {
            config = config.with_embed_model(model);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let ollama = Arc::new(OllamaClient::new(cli.ollama_config())?);
    if !cli.no_wait && !ollama.wait_until_ready().await {
        bail!("Ollama server is not available at {}", ollama.config().base_url);
    }
    if cli.pull {
        ollama.ensure_models().await.context("failed to provision models")?;
    }

    let config = RagConfig::builder()
        .top_k(cli.top_k)
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .build()?;
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(ollama.clone())
        .completer(ollama)
        .build()?;

    if let Some(pdf) = &cli.pdf {
        let report = pipeline.ingest_pdf(pdf).await?;
        eprintln!(
            "Indexed {} chunk(s) from {}{}",
            report.chunks_indexed,
            report.source,
            if report.used_placeholder { " (no extractable text)" } else { "" }
        );
    } else if !cli.chat {
        warn!("no --pdf given, questions will be answered without context");
    }

    let mut failures = 0usize;
    if cli.questions.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if !answer(&pipeline, &line, cli.chat).await {
                failures += 1;
            }
        }
    } else {
        for question in &cli.questions {
            if !answer(&pipeline, question, cli.chat).await {
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} question(s) could not be answered");
    }
    Ok(())
}

/// Answer one question, printing the result. Returns `false` on failure.
async fn answer(pipeline: &RagPipeline, question: &str, chat: bool) -> bool {
    let result =
        if chat { pipeline.chat(question).await } else { pipeline.query(question).await };
    match result {
        Ok(answer) => {
            print_answer(question, &answer);
            true
        }
        Err(e) => {
            eprintln!("Q: {question}\n{e}\n");
            false
        }
    }
}

fn print_answer(question: &str, answer: &Answer) {
    println!("Q: {question}");
    println!("{}", answer.text.trim());
    for (i, chunk) in answer.context.iter().enumerate() {
        let preview: String = chunk.text.chars().take(80).collect();
        println!("  {}. [score={:.4}] {preview}", i + 1, chunk.score);
    }
    println!("  ({:.2}s)\n", answer.elapsed.as_secs_f64());
}
