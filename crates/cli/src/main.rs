use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use data_loader::{CatalogPage, SimilarityStore};
use server::{Config, MovieRecommendation, RecommendationOrchestrator, Recommendations};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// MovieMentor - "movies like this one" from the command line
#[derive(Parser, Debug)]
#[command(name = "movie-mentor")]
#[command(about = "Movie recommender backed by a precomputed similarity matrix", long_about = None)]
struct Cli {
    /// Movie title to get recommendations for, or "list" to browse the catalog
    #[arg(long)]
    movie: String,

    /// Number of recommendations to show
    #[arg(long, alias = "num_recommendations", default_value = "5")]
    num_recommendations: usize,

    /// Page to show when listing movies
    #[arg(long, alias = "page_number", default_value = "1")]
    page_number: usize,

    /// Movies per page when listing
    #[arg(long, default_value = "800")]
    page_size: usize,

    /// Directory holding movie_list.dat and similarity.bin (overrides MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// TMDB poster size
    #[arg(long, default_value = "w500")]
    poster_size: String,
}

impl Cli {
    fn wants_listing(&self) -> bool {
        self.movie.eq_ignore_ascii_case("list")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they don't mix with the results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    exit_code(run(cli).await)
}

/// Print the error of a failed run and pick the process exit status
fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    execute(cli, config).await
}

/// Apply flag overrides to `config`, load the artifact and dispatch
async fn execute(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(model_dir) = &cli.model_dir {
        config.model_dir = model_dir.clone();
    }
    config.poster_size = cli.poster_size.clone();
    debug!(
        "Model dir {}, poster size {}",
        config.model_dir.display(),
        config.poster_size
    );

    let store = load_store(&config.model_dir)?;

    if cli.wants_listing() {
        handle_list(&store, cli.page_number, cli.page_size)
    } else {
        handle_recommend(store, &config, &cli.movie, cli.num_recommendations).await
    }
}

fn load_store(model_dir: &Path) -> Result<Arc<SimilarityStore>> {
    let start = Instant::now();
    let store = SimilarityStore::load_from_files(model_dir)
        .with_context(|| format!("Failed to load similarity artifact from {}", model_dir.display()))?;
    eprintln!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        store.len(),
        start.elapsed()
    );
    Ok(Arc::new(store))
}

/// Handle `--movie list`
fn handle_list(store: &SimilarityStore, page_number: usize, page_size: usize) -> Result<()> {
    info!("Listing page {} (page size {})", page_number, page_size);
    let page = store
        .page(page_number, page_size)
        .ok_or_else(|| anyhow!("Page number and page size must be at least 1"))?;

    print_catalog_page(&page);
    Ok(())
}

/// Handle a title lookup
async fn handle_recommend(
    store: Arc<SimilarityStore>,
    config: &Config,
    title: &str,
    limit: usize,
) -> Result<()> {
    info!("Recommending {} titles like '{}'", limit, title);
    let orchestrator = RecommendationOrchestrator::from_config(store, config)?;

    let start = Instant::now();
    let recommendations = orchestrator.get_recommendations(title, limit).await?;

    print_recommendations(&recommendations);
    eprintln!("{}", format!("Done in {:.2?}", start.elapsed()).dimmed());
    Ok(())
}

fn print_catalog_page(page: &CatalogPage<'_>) {
    println!(
        "{}",
        format!(
            "List of Movies (Page {} of {}, {} movies)",
            page.page_number, page.total_pages, page.total_movies
        )
        .bold()
        .magenta()
    );

    if page.entries.is_empty() {
        println!("{}", "No movies on this page".yellow());
        return;
    }

    let first = page.first_position();
    let width = (first + page.entries.len()).to_string().len();
    for (offset, record) in page.entries.iter().enumerate() {
        println!(
            "{:>width$}  {}",
            (first + offset).to_string().dimmed(),
            record.title.yellow().bold(),
            width = width
        );
    }
}

fn print_recommendations(recommendations: &Recommendations) {
    println!(
        "\n{}\n",
        format!(
            "Top {} Recommended Movies for '{}':",
            recommendations.items.len(),
            recommendations.query
        )
        .bold()
        .green()
    );

    for rec in &recommendations.items {
        print_recommendation(rec);
    }

    if !recommendations.skipped.is_empty() {
        println!("{}", "Skipped (details unavailable):".yellow().bold());
        for skipped in &recommendations.skipped {
            println!("  - {} ({})", skipped.title.yellow(), skipped.reason);
        }
    }
}

fn print_recommendation(rec: &MovieRecommendation) {
    println!(
        "{}. {} {}",
        rec.rank.to_string().green(),
        rec.title.underline().yellow(),
        format!("(similarity {:.3})", rec.score).dimmed()
    );
    println!(
        "   {} {}   {} {:.1}/10",
        "Released:".bright_cyan(),
        rec.release_date,
        "Rating:".bright_cyan(),
        rec.rating
    );
    if !rec.genres.is_empty() {
        println!("   {} {}", "Genres:".bright_cyan(), rec.genres.join(", "));
    }
    if !rec.overview.is_empty() {
        println!("   {} {}", "Overview:".bright_magenta(), rec.overview.italic());
    }
    if let Some(poster) = &rec.poster_url {
        println!("   {} {}", "Poster:".bright_cyan(), poster);
    }
    if let Some(homepage) = &rec.homepage_url {
        println!("   {} {}", "Homepage:".bright_cyan(), homepage);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::parser::{MATRIX_FILE, MOVIE_LIST_FILE, write_matrix, write_movie_list};
    use data_loader::{MovieRecord, SimilarityMatrix};

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["movie-mentor", "--movie", "Avatar"]).unwrap();

        assert_eq!(cli.movie, "Avatar");
        assert_eq!(cli.num_recommendations, 5);
        assert_eq!(cli.page_number, 1);
        assert_eq!(cli.page_size, 800);
        assert_eq!(cli.poster_size, "w500");
        assert!(cli.model_dir.is_none());
        assert!(!cli.wants_listing());
    }

    #[test]
    fn test_list_is_case_insensitive() {
        for movie in ["list", "LIST", "List"] {
            let cli = Cli::try_parse_from(["movie-mentor", "--movie", movie]).unwrap();
            assert!(cli.wants_listing(), "{movie}");
        }
    }

    #[test]
    fn test_underscore_aliases() {
        let cli = Cli::try_parse_from([
            "movie-mentor",
            "--movie",
            "list",
            "--page_number",
            "3",
            "--num_recommendations",
            "9",
        ])
        .unwrap();

        assert_eq!(cli.page_number, 3);
        assert_eq!(cli.num_recommendations, 9);
    }

    #[test]
    fn test_movie_is_required() {
        assert!(Cli::try_parse_from(["movie-mentor"]).is_err());
    }

    // ============================================================================
    // Runs against an artifact on disk
    // ============================================================================

    fn write_artifact() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            MovieRecord::new(19995, "Avatar", 0),
            MovieRecord::new(285, "Pirates of the Caribbean: At World's End", 1),
        ];
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0, 0.4], vec![0.4, 1.0]]).unwrap();

        write_movie_list(&dir.path().join(MOVIE_LIST_FILE), &records).unwrap();
        write_matrix(&dir.path().join(MATRIX_FILE), &matrix).unwrap();
        dir
    }

    fn cli_for(dir: &Path, movie: &str) -> Cli {
        let model_dir = dir.display().to_string();
        Cli::try_parse_from(["movie-mentor", "--movie", movie, "--model-dir", model_dir.as_str()])
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_title_exits_with_failure() {
        let dir = write_artifact();
        let config = Config::from_pairs([("TMDB_API_KEY", "test-key")]).unwrap();

        let result = execute(cli_for(dir.path(), "Titanic"), config).await;

        let err = result.as_ref().unwrap_err();
        assert!(
            err.to_string().contains("Movie 'Titanic' not found in the database"),
            "unexpected error: {err:#}"
        );
        assert_eq!(exit_code(result), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_listing_needs_no_api_key() {
        let dir = write_artifact();
        let config = Config::from_pairs(Vec::<(String, String)>::new()).unwrap();

        let result = execute(cli_for(dir.path(), "LIST"), config).await;

        assert!(result.is_ok(), "unexpected error: {result:?}");
        assert_eq!(exit_code(result), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_recommending_without_api_key_fails() {
        let dir = write_artifact();
        let config = Config::from_pairs(Vec::<(String, String)>::new()).unwrap();

        let result = execute(cli_for(dir.path(), "Avatar"), config).await;

        assert_eq!(exit_code(result), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_missing_artifact_exits_with_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_pairs([("TMDB_API_KEY", "test-key")]).unwrap();

        let result = execute(cli_for(dir.path(), "Avatar"), config).await;

        let err = result.as_ref().unwrap_err();
        assert!(err.to_string().contains("Failed to load similarity artifact"));
        assert_eq!(exit_code(result), ExitCode::FAILURE);
    }
}
