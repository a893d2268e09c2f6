use anyhow::{Context, Result, bail};
use catalog::{Catalog, CatalogItem, ItemId, SelectionSet};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use engine::{
    EngineConfig, ProgressSink, ProgressStreams, RankedResult, RecommendationEngine, RunMetrics,
    Stage,
};
use rand::seq::IteratorRandom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::debug;

/// FlixRecs - Speculative parallel recommendation engine
#[derive(Parser)]
#[command(name = "flix-recs")]
#[command(about = "Recommend catalog items by racing independent scoring heuristics", long_about = None)]
struct Cli {
    /// Path to the catalog file
    #[arg(short, long, default_value = "data/catalog.dat")]
    catalog: PathBuf,

    /// Optional engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// How the user picks the items recommendations are based on
#[derive(Args)]
struct SelectionArgs {
    /// Comma-separated item ids, e.g. --ids 1,4,7
    #[arg(long, value_delimiter = ',', conflicts_with = "random", required_unless_present = "random")]
    ids: Vec<ItemId>,

    /// Pick N random items from the catalog instead
    #[arg(long)]
    random: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a selection of items
    Recommend {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Number of recommendations to return (defaults to the config value)
        #[arg(long)]
        limit: Option<usize>,

        /// Maximum scorers running at once (defaults to hardware units)
        #[arg(long)]
        threads: Option<usize>,

        /// Run the five scorers one after another instead of racing them
        #[arg(long)]
        sequential: bool,

        /// Show why each item was recommended
        #[arg(long)]
        explain: bool,

        /// Stream scorer progress while the engine runs
        #[arg(long)]
        live: bool,
    },

    /// Measure speedup and efficiency across thread budgets
    Benchmark {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Search for items by title
    Search {
        /// Title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// List the highest rated items in the catalog
    List {
        /// Number of items to show
        #[arg(long, default_value = "20")]
        limit: usize,
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

    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog = Arc::new(
        Catalog::load_from_file(&cli.catalog).context("Failed to load catalog")?,
    );
    println!(
        "{} Loaded {} items in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            selection,
            limit,
            threads,
            sequential,
            explain,
            live,
        } => {
            let options = RecommendOptions {
                limit: limit.unwrap_or(config.max_results),
                threads,
                sequential,
                explain,
                live,
            };
            handle_recommend(catalog, config, &selection, options).await?
        }
        Commands::Benchmark { selection } => handle_benchmark(catalog, config, &selection).await?,
        Commands::Search { title } => handle_search(&catalog, &title),
        Commands::List { limit } => handle_list(&catalog, limit),
    }

    Ok(())
}

struct RecommendOptions {
    limit: usize,
    threads: Option<usize>,
    sequential: bool,
    explain: bool,
    live: bool,
}

/// Turn --ids / --random into a validated selection
fn resolve_selection(catalog: &Catalog, args: &SelectionArgs) -> Result<SelectionSet> {
    let ids: Vec<ItemId> = match args.random {
        Some(0) => bail!("--random needs at least one item"),
        Some(count) => catalog
            .item_ids()
            .into_iter()
            .choose_multiple(&mut rand::rng(), count),
        None => args.ids.clone(),
    };

    let selection = catalog
        .resolve_selection(&ids)
        .context("Invalid selection")?;
    debug!("Resolved selection: {:?}", selection.ids().collect::<Vec<_>>());

    println!("{}", "Selected:".bold().blue());
    for item in catalog.selected_items(&selection) {
        println!("  {} {}", "•".green(), describe(item));
    }
    println!();
    Ok(selection)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    catalog: Arc<Catalog>,
    config: EngineConfig,
    selection_args: &SelectionArgs,
    options: RecommendOptions,
) -> Result<()> {
    let selection = resolve_selection(&catalog, selection_args)?;

    let mut engine = RecommendationEngine::new(config)?;
    let mut feed = None;
    if options.live {
        let (sink, streams) = ProgressSink::channel();
        engine = engine.with_progress(sink);
        feed = Some(spawn_live_feed(streams, Arc::clone(&catalog)));
    }

    let start = Instant::now();
    let (results, metrics) = if options.sequential {
        let results = engine.recommend_sequential(&catalog, &selection, options.limit)?;
        (results, None)
    } else {
        let outcome = engine
            .recommend_with_metrics(Arc::clone(&catalog), &selection, options.limit, options.threads)
            .await?;
        (outcome.results, Some(outcome.metrics))
    };
    let elapsed = start.elapsed();

    // Closing the sink ends both streams so the feed task can finish
    drop(engine);
    if let Some(feed) = feed {
        feed.await.context("Live feed task failed")?;
        println!();
    }

    print_recommendations(&results, options.explain);
    match metrics {
        Some(metrics) => print_metrics(&metrics),
        None => println!(
            "\n{} Sequential run finished in {:.2}ms",
            "⏱".cyan(),
            elapsed.as_secs_f64() * 1000.0
        ),
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<Catalog>,
    config: EngineConfig,
    selection_args: &SelectionArgs,
) -> Result<()> {
    let selection = resolve_selection(&catalog, selection_args)?;
    let engine = RecommendationEngine::new(config)?;

    println!("{}", "Running performance analysis...".bold().blue());
    let report = engine.benchmark(catalog, &selection).await?;

    println!("{}", report);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &Catalog, title: &str) {
    let matches = catalog.search_title(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  No items found");
        return;
    }
    for item in matches.iter().take(20) {
        println!("{}: {}", item.id.to_string().green(), describe(item));
    }
}

/// Handle the 'list' command
fn handle_list(catalog: &Catalog, limit: usize) {
    println!("{}", format!("Top {} rated items:", limit).bold().blue());
    for item in catalog.top_rated(limit) {
        println!("{}: {}", item.id.to_string().green(), describe(item));
    }
}

/// Print status and per-item events as they arrive
fn spawn_live_feed(mut streams: ProgressStreams, catalog: Arc<Catalog>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut status_open = true;
        let mut recs_open = true;

        while status_open || recs_open {
            tokio::select! {
                event = streams.status.recv(), if status_open => match event {
                    Some(event) => {
                        let line = event.to_string();
                        match event.stage {
                            Stage::ScorerCancelled => println!("  {} {}", "✗".yellow(), line.dimmed()),
                            Stage::Done => println!("  {} {}", "✓".green(), line.bold()),
                            _ => println!("  {} {}", "→".cyan(), line),
                        }
                    }
                    None => status_open = false,
                },
                contribution = streams.recommendations.recv(), if recs_open => match contribution {
                    Some(c) => {
                        let title = catalog
                            .get_item(c.item_id)
                            .map(|item| item.title.as_str())
                            .unwrap_or("<unknown>");
                        println!("    {} {} +{:.2} ({})", "+".green(), title, c.score, c.scorer);
                    }
                    None => recs_open = false,
                },
            }
        }
    })
}

/// Helper function to format and print recommendations
fn print_recommendations(results: &[RankedResult], explain: bool) {
    print!("{}", "Recommendations:\n".bold().blue());
    if results.is_empty() {
        println!("  Nothing to recommend for this selection");
        return;
    }

    for (idx, result) in results.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.2} [{}]",
            (idx + 1).to_string().green(),
            describe(&result.item),
            result.score,
            result.scorer_list()
        );
        if explain {
            println!("   Why: {}", result.rationale);
        }
    }
}

fn print_metrics(metrics: &RunMetrics) {
    println!();
    println!(
        "{} {:.2}ms with {} threads | {} contributions | {} scorers finished, {} cancelled",
        "⏱".cyan(),
        metrics.elapsed_ms,
        metrics.thread_budget,
        metrics.contributions,
        metrics.scorers_completed,
        metrics.scorers_cancelled
    );
    if let Some(primary) = metrics.primary_scorer {
        let verdict = if metrics.accepted_primary {
            "accepted on its own".green()
        } else if metrics.timed_out {
            "merged with stragglers (wait timed out)".yellow()
        } else {
            "merged with stragglers".yellow()
        };
        println!("  First finisher: {} ({})", primary.to_string().bold(), verdict);
    }
}

fn describe(item: &CatalogItem) -> String {
    format!(
        "{} ({}) [{}] {:.1}/10, {}min",
        item.title,
        item.year,
        item.genre_list(),
        item.rating,
        item.duration_minutes
    )
}
