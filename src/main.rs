use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use markdoc::ast::{Node, Value};
use markdoc::config::load_config;
use markdoc::{parse, render_html, transform, validate, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a document to HTML
    Render {
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the parsed document as JSON
    Ast { file: PathBuf },
    /// Check a document against the configured schemas
    Validate {
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn read_document(path: &Path) -> anyhow::Result<Node> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Error reading document {}:", path.display()))?;
    Ok(parse(&source))
}

/// Loads the configuration file, if any, and exposes the document's front matter as
/// `$frontmatter`.
fn document_config(config: Option<&Path>, document: &Node) -> anyhow::Result<Config> {
    let mut config = match config {
        Some(path) => load_config(path).context("Error loading project configuration:")?,
        None => Config::default(),
    };

    if let Some(raw) = document.attribute("frontmatter").and_then(Value::as_str) {
        let frontmatter: Value =
            serde_yaml::from_str(raw).context("Error parsing document front matter:")?;
        config = config.with_variable("frontmatter", frontmatter);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "markdoc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            file,
            config,
            output,
        } => {
            let document = read_document(&file)?;
            let config = document_config(config.as_deref(), &document)?;
            let html = render_html(&transform(&document, &config));

            match output {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("Error writing {}:", path.display()))?;
                    info!("wrote {}", path.display());
                }
                None => println!("{}", html),
            }
            Ok(())
        }
        Commands::Ast { file } => {
            let document = read_document(&file)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Commands::Validate { file, config } => {
            let document = read_document(&file)?;
            let config = document_config(config.as_deref(), &document)?;
            let diagnostics = validate(&document, &config);
            debug!("{} diagnostics for {}", diagnostics.len(), file.display());

            for diagnostic in &diagnostics {
                println!(
                    "{}: [{}] {}",
                    file.display(),
                    diagnostic.id,
                    diagnostic.message
                );
            }

            if !diagnostics.is_empty() {
                bail!("{} validation error(s)", diagnostics.len());
            }
            info!("{} is valid", file.display());
            Ok(())
        }
    }
}
