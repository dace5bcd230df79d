use anyhow::{Result, anyhow};
use backend::{InMemoryBackend, LogNotifier, roster};
use clap::{Parser, Subcommand};
use colored::Colorize;
use coordinator::SearchCoordinator;
use model::{FilterSet, PageRequest, PlayerResult, SchoolType, SortDirection, SortField};
use scheduler::QueryScheduler;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Scout - Esports Recruiting Search
#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Search orchestration demo over a synthetic player roster", long_about = None)]
struct Cli {
    /// Number of synthetic players to generate
    #[arg(long, default_value = "500")]
    roster_size: usize,

    /// Simulated endpoint latency in milliseconds
    #[arg(long, default_value = "120")]
    latency_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the roster and page through results
    Search {
        /// Free-text search over gamertag / real name
        #[arg(long, default_value = "")]
        term: String,

        /// Restrict to one game, e.g. "valorant"
        #[arg(long)]
        game: Option<String>,

        /// Inclusive lower GPA bound
        #[arg(long)]
        gpa_min: Option<f32>,

        /// Restrict to high school players
        #[arg(long)]
        high_school: bool,

        /// Sort by GPA descending instead of relevance
        #[arg(long)]
        by_gpa: bool,

        /// Page to display
        #[arg(long, default_value = "1")]
        page: u32,

        /// Results per page
        #[arg(long, default_value = "20")]
        page_size: u32,
    },

    /// Run a scripted session showing debounce, prefetch, and favorites
    Demo,

    /// Benchmark page fetches through the scheduler
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
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

    let start = Instant::now();
    let backend = Arc::new(
        InMemoryBackend::new(roster::generate(cli.roster_size))
            .with_latency(Duration::from_millis(cli.latency_ms)),
    );
    println!(
        "{} Generated {} players in {:?}",
        "✓".green(),
        cli.roster_size,
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Search {
            term,
            game,
            gpa_min,
            high_school,
            by_gpa,
            page,
            page_size,
        } => {
            let mut filters = FilterSet::new().with_search(term);
            if let Some(game) = game {
                filters = filters.with_game(game);
            }
            if gpa_min.is_some() {
                filters = filters.with_gpa_range(gpa_min, None);
            }
            if high_school {
                filters = filters.with_school_type(SchoolType::HighSchool);
            }
            if by_gpa {
                filters = filters.with_sort(SortField::Gpa, SortDirection::Desc);
            }
            handle_search(backend, filters, page, page_size).await?
        }
        Commands::Demo => handle_demo(backend).await?,
        Commands::Benchmark { requests } => handle_benchmark(backend, requests).await?,
    }

    Ok(())
}

/// Handle the 'search' command
async fn handle_search(
    backend: Arc<InMemoryBackend>,
    filters: FilterSet,
    page: u32,
    page_size: u32,
) -> Result<()> {
    let mut session =
        SearchCoordinator::with_page_size(backend.clone(), backend, Arc::new(LogNotifier), page_size);

    session.set_filters(filters);
    // An empty term settles synchronously; anything else waits out the
    // debounce window.
    if !session.poll_settled().await? {
        session.settle().await?;
    }

    if page > 1 && !session.go_to_page(page).await? {
        let total = session.pagination().map(|p| p.total_pages).unwrap_or(0);
        return Err(anyhow!("Page {} out of range (1-{})", page, total));
    }

    print_page(&session);
    Ok(())
}

/// Handle the 'demo' command
async fn handle_demo(backend: Arc<InMemoryBackend>) -> Result<()> {
    let mut session =
        SearchCoordinator::new(backend.clone(), backend.clone(), Arc::new(LogNotifier));
    session.init().await?;

    // Simulate a recruiter typing "ace" one keystroke at a time. The
    // debounce window means only the final term reaches the endpoint.
    println!("{}", "Typing 'a', 'ac', 'ace'...".bold().blue());
    for term in ["a", "ac", "ace"] {
        session.set_search(term);
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    session.settle().await?;
    session.quiesce().await;
    println!(
        "{} Endpoint saw {} search request(s) for the whole burst",
        "✓".green(),
        backend.search_calls()
    );
    print_page(&session);

    // Walk forward through prefetched pages: these resolve from cache.
    let calls_before = backend.search_calls();
    while session.next_page().await? {
        print_page(&session);
        if session.current_page() >= 3 {
            break;
        }
    }
    session.quiesce().await;
    println!(
        "{} Page walk issued {} new endpoint request(s) (prefetch warmed the rest)",
        "✓".green(),
        backend.search_calls() - calls_before
    );

    // Optimistic favorite: the flag flips before the mutation resolves.
    if let Some(player) = session.players().first().cloned() {
        println!(
            "{}",
            format!("Favoriting {}...", player.gamertag).bold().blue()
        );
        session.toggle_favorite(player.id);
        let shown = session
            .players()
            .iter()
            .find(|p| p.id == player.id)
            .map(|p| p.is_favorited)
            .unwrap_or(false);
        println!(
            "{} Shown as favorited immediately: {} (mutation pending: {})",
            "✓".green(),
            shown,
            session.favorites().is_pending(player.id)
        );
        session.quiesce().await;
        println!(
            "{} Mutation resolved; server now agrees: {:?}",
            "✓".green(),
            backend.favorited(player.id)
        );
    }

    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(backend: Arc<InMemoryBackend>, requests: usize) -> Result<()> {
    let scheduler = QueryScheduler::new(backend.clone());

    // Random but realistic request mix: a handful of filter shapes, pages
    // 1-5, so both cold fetches and cache hits show up.
    let terms = ["", "ace", "nova", "viper", "gg"];
    let page_requests: Vec<PageRequest> = (0..requests)
        .map(|_| {
            let term = terms[rand::random::<u32>() as usize % terms.len()];
            let page = rand::random::<u32>() % 5 + 1;
            PageRequest::new(FilterSet::new().with_search(term), page, 20)
        })
        .collect();

    let mut handles = vec![];
    for request in page_requests {
        let scheduler = scheduler.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            scheduler.schedule(&request).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }
    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    scheduler.quiesce().await;

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];

    println!("Benchmark results:");
    println!("Requests: {}", requests);
    println!("Endpoint calls (after dedup/cache): {}", backend.search_calls());
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);

    Ok(())
}

/// Helper function to format and print the current page of a session
fn print_page(session: &SearchCoordinator) {
    let Some(pagination) = session.pagination() else {
        println!("{}", "No results fetched".yellow());
        return;
    };

    println!(
        "{}",
        format!(
            "Page {}/{} ({} players total)",
            pagination.current_page,
            pagination.total_pages.max(1),
            pagination.total_count
        )
        .bold()
        .blue()
    );
    for player in session.players() {
        print_player(&player);
    }
    if let Some(window) = session.page_window() {
        let strip: Vec<String> = window
            .pages
            .iter()
            .map(|p| {
                if *p == window.current_page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!("  {} {}", strip.join(" "), window.range_text());
    }
}

fn print_player(player: &PlayerResult) {
    let star = if player.is_favorited {
        "★".yellow().to_string()
    } else {
        " ".to_string()
    };
    let games = player
        .profiles
        .iter()
        .map(|p| format!("{} {} ({})", p.game, p.role, p.rank))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} {} - {} | {} '{} | GPA {:.2} | {}",
        star,
        player.gamertag.bold(),
        player.real_name,
        player.school,
        player.class_year % 100,
        player.gpa,
        games
    );
}
