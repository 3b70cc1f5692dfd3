use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use interlinear_core::{activate, gloss_for, BlockRegistry, Config, Document, RepeatPolicy};

#[derive(Parser)]
#[command(name = "interlinear", version)]
#[command(about = "Read tokenized passages word by word with their morphology")]
struct Cli {
    /// Corpus JSON file (overrides the config file)
    #[arg(short, long, global = true)]
    corpus: Option<PathBuf>,
    /// Block tag the passage renderer registers under
    #[arg(long, global = true)]
    tag: Option<String>,
    /// Render a sentence once even when it spans several verses
    #[arg(long, global = true)]
    collapse: bool,
    /// Reference to open on start (interactive mode)
    #[arg(short, long)]
    open: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a passage as plain text
    Show {
        /// Reference, e.g. "John 3:16-18"
        reference: String,
        /// Print lemma, part of speech and features under each line
        #[arg(short, long)]
        gloss: bool,
    },
    /// List books and their chapter counts
    Books,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none())?;

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable config: {}", e);
        Config::new()
    });
    if let Some(corpus) = cli.corpus {
        config.corpus_path = Some(corpus);
    }
    if let Some(tag) = cli.tag {
        config.language_tag = Some(tag);
    }
    if cli.collapse {
        config.repeat_policy = Some(RepeatPolicy::Collapse);
    }

    // A corpus that fails to load disables everything
    let mut registry = BlockRegistry::new();
    let corpus = activate(&mut registry, &config).await?;

    match cli.command {
        None => run_tui(registry, &config, cli.open).await?,
        Some(Commands::Show { reference, gloss }) => show_passage(&registry, &config, &reference, gloss),
        Some(Commands::Books) => {
            for book in corpus.books() {
                println!("  • {} ({} chapters)", book, corpus.chapter_count(book));
            }
        }
    }

    Ok(())
}

fn init_logging(to_file: bool) -> Result<()> {
    let default_level = if to_file { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("INTERLINEAR_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    if to_file {
        // stderr belongs to the terminal UI
        let path = log_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn log_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

    Ok(cache_dir.join("interlinear").join("interlinear.log"))
}

async fn run_tui(registry: BlockRegistry, config: &Config, open: Option<String>) -> Result<()> {
    let mut app = App::new(registry, config.language_tag());
    if let Some(reference) = open {
        app.reference_input = reference;
        app.submit_input();
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result: Result<()> = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        Ok(())
    }
    .await;

    tui::restore()?;
    result
}

fn show_passage(registry: &BlockRegistry, config: &Config, reference: &str, gloss: bool) {
    let mut document = Document::new();
    let root = document.root();
    registry.process(config.language_tag(), reference, &mut document, root);

    for line in passage_lines(&document, gloss) {
        println!("{}", line);
    }
}

/// Plain-text rendering of a document: one row per sentence, optionally
/// followed by `form: lemma upos (features)` rows, and a blank row after each.
fn passage_lines(document: &Document, gloss: bool) -> Vec<String> {
    let mut out = Vec::new();
    for line in document.children(document.root()) {
        out.push(document.text_content(*line).trim_end().to_string());
        if gloss {
            for child in document.children(*line) {
                if !document.is_activatable(*child) {
                    continue;
                }
                let panel = match gloss_for(document, *child) {
                    Ok(panel) => panel,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        continue;
                    }
                };
                let summary = panel.summary.unwrap_or_default();
                if panel.features.is_empty() {
                    out.push(format!("    {}: {}", panel.title, summary));
                } else {
                    out.push(format!(
                        "    {}: {} ({})",
                        panel.title,
                        summary,
                        panel.features.join(", ")
                    ));
                }
            }
        }
        out.push(String::new());
    }
    out
}
