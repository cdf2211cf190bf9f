//! Example: Look up titles similar to a movie
//!
//! Run with: cargo run --package sources --example similar_titles -- "Avatar"
//!
//! This example shows how to:
//! 1. Load the similarity artifact
//! 2. Build a SimilaritySource
//! 3. Print the ten closest titles with their scores

use data_loader::SimilarityStore;
use sources::SimilaritySource;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let title = std::env::args().nth(1).unwrap_or_else(|| "Avatar".to_string());

    println!("Loading similarity artifact...");
    let start = Instant::now();
    let store = Arc::new(SimilarityStore::load_from_files(Path::new("model"))?);
    println!("Loaded {} movies in {:?}\n", store.len(), start.elapsed());

    let source = SimilaritySource::new(store);

    let start = Instant::now();
    let candidates = source.recommend(&title, 10)?;
    println!("Titles similar to '{}' ({:?}):", title, start.elapsed());
    for (rank, candidate) in candidates.iter().enumerate() {
        println!(
            "  {:>2}. {} [id {}] score {:.4}",
            rank + 1,
            candidate.title,
            candidate.movie_id,
            candidate.score
        );
    }

    Ok(())
}
