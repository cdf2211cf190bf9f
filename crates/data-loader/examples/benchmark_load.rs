use data_loader::SimilarityStore;
use std::path::Path;
use std::time::Instant;

fn main() {
    let model_dir = Path::new("model");

    println!("Loading similarity artifact...\n");

    let start = Instant::now();
    let store = SimilarityStore::load_from_files(model_dir)
        .expect("Failed to load artifact");
    let elapsed = start.elapsed();

    let dimension = store.matrix().dimension();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", store.len());
    println!("Matrix: {}x{}", dimension, dimension);
    println!("\nPerformance: {:.0} scores/second",
             (dimension * dimension) as f64 / elapsed.as_secs_f64());
}
