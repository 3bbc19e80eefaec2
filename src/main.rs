use clap::Parser;
use rmv_locator::location::cache::CACHE_PATH_ENV;
use rmv_locator::location::{LocationCache, LocationResolver, Resolve, ResolvedLocation};
use rmv_locator::offices::OfficeRegistry;
use rmv_locator::report::{render_top_list, NearestResponse};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// RMV Locator — find the nearest Massachusetts RMV office.
///
/// Resolves a city name (or raw coordinates), ranks every registry office
/// by great-circle distance and prints the nearest ones.
///
/// Examples:
///   rmv-locator Worcester
///   rmv-locator --city "New Bedford" --top 5
///   rmv-locator --lat 42.3601 --lon -71.0589
///   rmv-locator --offline Bostn
///   rmv-locator --serve --port 8080
#[derive(Parser)]
#[command(name = "rmv-locator", version, about, long_about = None)]
struct Cli {
    /// City name (positional). Example: rmv-locator Worcester
    #[arg(index = 1)]
    city_positional: Option<String>,

    /// City name (named). Example: --city "Fall River"
    #[arg(long)]
    city: Option<String>,

    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Number of offices to list.
    #[arg(long, short = 'n', default_value_t = rmv_locator::report::DEFAULT_TOP_N)]
    top: usize,

    /// Offline mode: only use the cache and office names.
    #[arg(long)]
    offline: bool,

    /// Fail instead of falling back to the Boston city center.
    #[arg(long)]
    strict: bool,

    /// Print the office registry and exit.
    #[arg(long)]
    list: bool,

    /// Geocoding cache file.
    #[arg(long, env = CACHE_PATH_ENV)]
    cache: Option<PathBuf>,

    /// Run the JSON API server instead of a one-off query.
    #[arg(long)]
    serve: bool,

    /// Server bind host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server bind port.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(if cli.serve { "info" } else { "warn" });

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = OfficeRegistry::massachusetts();

    if cli.list {
        println!("{}", serde_json::to_string_pretty(registry.offices())?);
        return Ok(());
    }

    let cache = match &cli.cache {
        Some(path) => LocationCache::load_from(path.clone()),
        None => LocationCache::load(),
    };
    let mut resolver = LocationResolver::with_cache(cache);
    resolver.set_offline(cli.offline);

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(rmv_locator::server::start(&cli.host, cli.port, resolver))?;
        return Ok(());
    }

    if cli.top == 0 {
        return Err("--top must be at least 1".into());
    }

    // ── Resolve query ───────────────────────────────────────────

    let resolved = resolve_query(&cli, &mut resolver)?;
    eprintln!("  {}", resolved.display_line());

    // ── Rank ────────────────────────────────────────────────────

    let ranked = registry.rank(resolved.coordinate)?;

    eprint!("{}", render_top_list(&ranked, cli.top));
    println!(
        "{}",
        serde_json::to_string_pretty(&NearestResponse::new(resolved, &ranked, cli.top))?
    );
    Ok(())
}

fn resolve_query(
    cli: &Cli,
    resolver: &mut LocationResolver,
) -> Result<ResolvedLocation, Box<dyn std::error::Error>> {
    // Priority: --lat/--lon > --city > positional city > default center
    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        return Ok(LocationResolver::from_manual(lat, lon)?);
    }

    let text = cli
        .city
        .as_deref()
        .or(cli.city_positional.as_deref())
        .unwrap_or("");

    let resolved = if cli.strict {
        resolver.resolve_strict(text)?
    } else {
        resolver.resolve(text)?
    };
    Ok(resolved)
}
