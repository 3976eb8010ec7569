//! Embeds a few snippet descriptions and a query, then prints their cosine similarities.
//!
//! Pass `--offline` to use the hashing provider instead of downloading model weights.

use snipmatch_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider, HashingEmbedProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let offline = std::env::args().any(|arg| arg == "--offline");
    let provider: Box<dyn EmbeddingProvider> = if offline {
        Box::new(HashingEmbedProvider::default())
    } else {
        let config = EmbedConfig::default().with_download_progress(true);
        println!("Model: {}", config.model_name());
        Box::new(FastEmbedProvider::create(config).await?)
    };

    println!("Provider: {}", provider.provider_name());
    println!("Dimension: {}", provider.embedding_dimension());

    let snippets = vec![
        "dropna drop row missing value".to_string(),
        "fillna fill missing value".to_string(),
        "histogram plot distribution column".to_string(),
    ];
    let corpus = provider.embed_texts(&snippets).await?;
    let query = provider.embed_text("remove row nan").await?;

    for (text, embedding) in snippets.iter().zip(corpus.embeddings.iter()) {
        let similarity: f32 = query
            .iter()
            .zip(embedding.iter())
            .map(|(a, b)| a.to_f32() * b.to_f32())
            .sum();
        println!("{similarity:.3}  {text}");
    }

    Ok(())
}
