use clap::{Parser, Subcommand};
use serde::Serialize;
use snipmatch_embed::HashingEmbedProvider;
use snipmatch_retriever::{
    Corpus, CorpusEntry, CorpusIndex, EngineConfig, MatchEngine, MatchOptions, MatchResult,
    corpus::load_corpus_records,
};
use snipmatch_text::TextNormalizer;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Find the code snippets that best answer a natural-language question.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with the snippet corpus (overrides the config file)
    #[arg(short, long, global = true)]
    corpus: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the built-in hashing embedder instead of downloading a model
    #[arg(long, global = true)]
    offline: bool,

    /// Query embedding timeout in milliseconds (overrides the config file)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Match a question against the corpus
    Query {
        /// The question to answer
        text: String,
        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<i64>,
        /// Minimum star rating (1-5)
        #[arg(short, long)]
        min_stars: Option<i64>,
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// List the snippets in the corpus
    List {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Show one snippet by title
    Show {
        /// Snippet title
        title: String,
        /// Output format
        #[arg(short, long, default_value = "full")]
        format: OutputFormat,
    },
    /// Print the normalized form of a text
    Normalize {
        /// Text to normalize
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum OutputFormat {
    Summary,
    Full,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "full" => Ok(OutputFormat::Full),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {s}")),
        }
    }
}

#[derive(Serialize)]
struct SnippetOutput<'a> {
    title: &'a str,
    summary: &'a str,
    code: &'a str,
    tags: &'a [String],
    normalized_text: &'a str,
}

impl<'a> From<&'a CorpusEntry> for SnippetOutput<'a> {
    fn from(entry: &'a CorpusEntry) -> Self {
        Self {
            title: &entry.snippet.title,
            summary: &entry.snippet.summary,
            code: &entry.snippet.body,
            tags: &entry.snippet.tags,
            normalized_text: &entry.normalized_text,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    match args.command {
        Commands::Query {
            text,
            top_k,
            min_stars,
            format,
        } => {
            let defaults = config.default_match_options();
            let options = MatchOptions::new(
                top_k.unwrap_or(defaults.top_k),
                min_stars.unwrap_or(defaults.min_stars),
            );

            let engine = MatchEngine::from_config(&config);
            engine.initialize().await?;
            let results = engine.match_query(&text, options).await?;
            print_results(&results, &format)?;
            Ok(())
        }
        Commands::List { format } => {
            let corpus = load_for_browsing(&config).await?;
            match format {
                OutputFormat::Json => {
                    let output: Vec<SnippetOutput> = corpus.iter().map(SnippetOutput::from).collect();
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Summary => {
                    println!("Found {} snippets:", corpus.len());
                    for entry in corpus.iter() {
                        println!("  {} | {}", entry.snippet.title, entry.snippet.summary);
                    }
                }
                OutputFormat::Full => {
                    for entry in corpus.iter() {
                        print_entry(entry);
                        println!("---");
                    }
                }
            }
            Ok(())
        }
        Commands::Show { title, format } => {
            let corpus = load_for_browsing(&config).await?;
            let entry = corpus
                .lookup(&title)
                .ok_or_else(|| anyhow::anyhow!("No snippet titled '{}'", title))?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&SnippetOutput::from(entry))?);
                }
                OutputFormat::Summary => {
                    println!("{} | {}", entry.snippet.title, entry.snippet.summary);
                }
                OutputFormat::Full => print_entry(entry),
            }
            Ok(())
        }
        Commands::Normalize { text } => {
            println!("{}", TextNormalizer::new().normalize(&text));
            Ok(())
        }
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(corpus) = &args.corpus {
        config.corpus_path = corpus.clone();
    }
    if args.offline {
        config.offline = true;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_query_timeout_ms(timeout_ms);
    }
    config.validate()?;
    Ok(config)
}

/// Validate the corpus file without loading a model.
async fn load_for_browsing(config: &EngineConfig) -> anyhow::Result<Arc<Corpus>> {
    let records = load_corpus_records(&config.corpus_path).await?;
    let index = CorpusIndex::new(
        TextNormalizer::new(),
        Arc::new(HashingEmbedProvider::default()),
    );
    Ok(Arc::new(index.build(records).await?))
}

fn print_entry(entry: &CorpusEntry) {
    println!("Title: {}", entry.snippet.title);
    println!("Summary: {}", entry.snippet.summary);
    if !entry.snippet.tags.is_empty() {
        println!("Tags: {}", entry.snippet.tags.join(", "));
    }
    println!("Normalized: {}", entry.normalized_text);
    println!("Code:");
    println!("{}", entry.snippet.body);
}

fn stars(score: u8) -> String {
    "★".repeat(score as usize) + &"☆".repeat(5usize.saturating_sub(score as usize))
}

fn print_results(results: &[MatchResult], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Summary => {
            if results.is_empty() {
                println!("No matching snippets.");
            }
            for (i, result) in results.iter().enumerate() {
                println!(
                    "{}. {} {} | {} (similarity: {:.3})",
                    i + 1,
                    stars(result.score),
                    result.title,
                    result.summary,
                    result.similarity
                );
            }
        }
        OutputFormat::Full => {
            if results.is_empty() {
                println!("No matching snippets.");
            }
            for (i, result) in results.iter().enumerate() {
                println!("=== Match {} ===", i + 1);
                println!("Title: {}", result.title);
                println!("Rating: {} ({}/5)", stars(result.score), result.score);
                println!("Similarity: {:.4}", result.similarity);
                println!("Summary: {}", result.summary);
                if !result.tags.is_empty() {
                    println!("Tags: {}", result.tags.join(", "));
                }
                println!("Code:");
                println!("{}", result.code);
                println!();
            }
        }
    }
    Ok(())
}
