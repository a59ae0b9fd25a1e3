use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{parser, Catalog, ParsedRatings, MIN_SEARCH_QUERY_LEN};
use feed::{FeedConfig, FeedOutcome, HttpRecommendationService, RecommendationFeed};
use stats::{aggregate, bucket_label, RatingSummary, MONTH_LABELS};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// reel-stats - personal movie ratings, statistics and recommendations
#[derive(Parser)]
#[command(name = "reel-stats")]
#[command(about = "Movie rating statistics and recommendations", long_about = None)]
struct Cli {
    /// Path to the bundled movie catalog (JSON)
    #[arg(short, long, env = "REEL_CATALOG", default_value = "data/popular_movies.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show rating distribution, genre averages and monthly activity
    Stats {
        /// User ratings document exported from the store (JSON)
        #[arg(long)]
        ratings: PathBuf,

        /// Year for the monthly breakdown (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Search the catalog by title
    Search {
        /// Case-insensitive title fragment, at least 3 characters
        #[arg(long)]
        title: String,

        /// Mark movies already rated in this ratings document
        #[arg(long)]
        ratings: Option<PathBuf>,
    },

    /// List rated movies
    Rated {
        #[arg(long)]
        ratings: PathBuf,
    },

    /// Fetch recommendations page by page
    Recommend {
        #[arg(long)]
        ratings: PathBuf,

        /// Recommendation service endpoint
        #[arg(long, env = "REEL_RECOMMEND_URL", default_value = feed::types::DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Movies requested per page
        #[arg(long, default_value_t = feed::types::DEFAULT_PER_PAGE)]
        per_page: u32,

        /// Maximum number of pages to load
        #[arg(long, default_value = "3")]
        pages: u32,

        /// Request timeout in seconds
        #[arg(long, default_value = "10")]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { ratings, year } => {
            let (catalog, ratings) = load_with_ratings(&cli.catalog, &ratings)?;
            let year = year.unwrap_or_else(|| chrono::Local::now().year());
            handle_stats(&catalog, &ratings, year)
        }
        Commands::Search { title, ratings } => {
            let (catalog, ratings) = match ratings {
                Some(path) => {
                    let (catalog, ratings) = load_with_ratings(&cli.catalog, &path)?;
                    (catalog, Some(ratings))
                }
                None => (load_catalog(&cli.catalog)?, None),
            };
            handle_search(&catalog, ratings.as_ref(), &title)
        }
        Commands::Rated { ratings } => {
            let (catalog, ratings) = load_with_ratings(&cli.catalog, &ratings)?;
            handle_rated(&catalog, &ratings)
        }
        Commands::Recommend {
            ratings,
            endpoint,
            per_page,
            pages,
            timeout_secs,
        } => {
            let (catalog, ratings) = load_with_ratings(&cli.catalog, &ratings)?;
            let config = FeedConfig::new()
                .with_endpoint(endpoint)
                .with_per_page(per_page)
                .with_timeout(Duration::from_secs(timeout_secs));
            handle_recommend(&catalog, ratings, &config, pages).await
        }
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load_from_file(path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))
}

/// Load the catalog and a ratings document in parallel
fn load_with_ratings(catalog_path: &Path, ratings_path: &Path) -> Result<(Catalog, ParsedRatings)> {
    let start = Instant::now();
    let (catalog, ratings) = rayon::join(
        || load_catalog(catalog_path),
        || parser::parse_user_ratings_file(ratings_path),
    );
    let catalog = catalog?;
    let ratings = ratings
        .with_context(|| format!("Failed to read ratings from {}", ratings_path.display()))?;

    if !ratings.dropped.is_empty() {
        warn!(
            "{} rating entries could not be read and were skipped",
            ratings.dropped.len()
        );
    }
    info!(
        "Loaded {} movies and {} ratings in {:?}",
        catalog.len(),
        ratings.snapshot.len(),
        start.elapsed()
    );
    Ok((catalog, ratings))
}

/// Handle the 'stats' command
fn handle_stats(catalog: &Catalog, ratings: &ParsedRatings, year: i32) -> Result<()> {
    let summary = aggregate(&ratings.snapshot, catalog, year);
    print_summary(&summary);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &Catalog, ratings: Option<&ParsedRatings>, title: &str) -> Result<()> {
    if title.trim().chars().count() < MIN_SEARCH_QUERY_LEN {
        bail!(
            "Search needs at least {} characters, got {:?}",
            MIN_SEARCH_QUERY_LEN,
            title
        );
    }

    let matches = catalog.search_titles(title);
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  no matches");
    }
    for movie in matches.iter().take(20) {
        let rated = ratings
            .and_then(|r| r.snapshot.get(movie.id))
            .map(|entry| format!(" (rated {})", entry.rating).yellow().to_string())
            .unwrap_or_default();
        println!(
            "{}: {} [{}]{}",
            movie.id,
            movie.title,
            movie.genres.join(", "),
            rated
        );
    }
    if matches.len() > 20 {
        println!("  ... and {} more", matches.len() - 20);
    }
    Ok(())
}

/// Handle the 'rated' command
fn handle_rated(catalog: &Catalog, ratings: &ParsedRatings) -> Result<()> {
    let rated = catalog.rated_movies(&ratings.snapshot);
    if rated.is_empty() {
        println!("No rated movies");
        return Ok(());
    }

    println!("{}", format!("Rated movies ({}):", rated.len()).bold().blue());
    for (movie, entry) in &rated {
        println!(
            "{} {} - {}",
            "•".green(),
            movie.title,
            format!("{:.1}", entry.rating).yellow()
        );
    }

    let unknown = ratings.snapshot.len() - rated.len();
    if unknown > 0 {
        println!("{} ratings refer to movies missing from the catalog", unknown);
    }
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    catalog: &Catalog,
    ratings: ParsedRatings,
    config: &FeedConfig,
    pages: u32,
) -> Result<()> {
    if ratings.snapshot.is_empty() {
        bail!("Rate some movies first, recommendations are based on your ratings");
    }

    let service = HttpRecommendationService::new(config)
        .context("Failed to build recommendation client")?;
    info!("Fetching recommendations from {}", service.endpoint());
    let feed = RecommendationFeed::new(service, config.per_page);

    let mut outcome = feed
        .activate(1, Arc::new(ratings.snapshot))
        .await
        .context("Failed to fetch the first page of recommendations")?;
    let mut loaded = 1;

    while loaded < pages {
        if !matches!(outcome, FeedOutcome::Appended { .. }) {
            break;
        }
        outcome = match feed.request_more().await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Keep what we have; the next page could be retried later
                warn!("Stopped loading recommendations: {}", e);
                break;
            }
        };
        loaded += 1;
    }

    let state = feed.state().await;
    println!("{}", "Recommended for you:".bold().blue());
    for (rank, movie) in state.accumulated.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}]",
            (rank + 1).to_string().green(),
            movie.title,
            if movie.release_date.is_empty() { "????" } else { movie.release_date.as_str() },
            movie.genres
        );
        if let Some(poster) = catalog.poster_url(movie.id) {
            println!("   {}", poster.dimmed());
        }
    }
    if state.exhausted {
        println!("{}", "End of recommendations".dimmed());
    }
    Ok(())
}

fn print_summary(summary: &RatingSummary) {
    println!("{}", "Rating distribution:".bold().blue());
    let peak = summary.histogram.iter().copied().max().unwrap_or(0);
    for (bucket, &count) in summary.histogram.iter().enumerate() {
        println!(
            "  {:>3.1} | {} {}",
            bucket_label(bucket),
            bar(count, peak, 30).cyan(),
            count
        );
    }
    println!("  {} ratings", summary.total_ratings());

    println!("{}", "Average rating by genre:".bold().blue());
    if summary.genre_averages.is_empty() {
        println!("  no genre data");
    }
    for genre in &summary.genre_averages {
        println!(
            "  {} {} ({}, {} ratings)",
            "•".green(),
            genre.genre,
            genre.display_average(),
            genre.count
        );
    }

    println!(
        "{}",
        format!("Movies watched per month in {}:", summary.year).bold().blue()
    );
    let peak = summary.monthly_watch_counts.iter().copied().max().unwrap_or(0);
    for (month, &count) in summary.monthly_watch_counts.iter().enumerate() {
        println!(
            "  {} | {} {}",
            MONTH_LABELS[month],
            bar(count, peak, 30).magenta(),
            count
        );
    }
}

/// Horizontal bar scaled so `peak` fills `width` characters
fn bar(count: u32, peak: u32, width: usize) -> String {
    if peak == 0 {
        return String::new();
    }
    let len = (count as usize * width).div_ceil(peak as usize);
    "█".repeat(len)
}
