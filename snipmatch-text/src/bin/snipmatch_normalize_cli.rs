use clap::Parser;
use serde::Serialize;
use snipmatch_text::{TextNormalizer, snippet_embedding_text};
use std::fs;
use std::io::{self, BufRead, Read};

/// A CLI tool to show how snipmatch-text normalizes queries and snippet descriptions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Normalize each input line separately instead of the whole input.
    #[arg(short, long)]
    lines: bool,

    /// Treat the input as a snippet summary and prefix it with this title.
    #[arg(short, long)]
    title: Option<String>,

    /// Emit JSON objects with the original and normalized text.
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct NormalizedText<'a> {
    original: &'a str,
    normalized: String,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let content = if let Some(input_path) = &args.input {
        fs::read_to_string(input_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        buffer
    };

    let texts: Vec<String> = if args.lines {
        content
            .as_bytes()
            .lines()
            .collect::<io::Result<Vec<_>>>()?
    } else {
        vec![content]
    };

    let texts: Vec<String> = match &args.title {
        Some(title) => texts
            .iter()
            .map(|summary| snippet_embedding_text(title, summary.trim()))
            .collect(),
        None => texts,
    };

    let normalizer = TextNormalizer::new();
    let results: Vec<NormalizedText> = texts
        .iter()
        .map(|text| NormalizedText {
            original: text,
            normalized: normalizer.normalize(text),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in results {
            println!("{}", result.normalized);
        }
    }

    Ok(())
}
