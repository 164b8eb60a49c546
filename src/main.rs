mod cli;
mod error;
mod utils;
mod batch;
mod repl;
mod facade;
mod loader;
mod search;
mod series;
mod timekey;

use anyhow::Context;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments and installs logging.
/// 2. Loads the temperature series and the optional humidity series.
/// 3. Builds the query facade (fits the learned index once).
/// 4. Runs either a parallel batch comparison or the interactive loop.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    utils::init_logging(args.verbose);

    let load_start = std::time::Instant::now();
    let (series, humidity) = loader::load_pair(&args.temperature, args.humidity.as_ref())
        .context("Failed to load input series")?;
    println!(
        "✅ Temperature data loaded: {} records in {:?} seconds",
        series.len(),
        load_start.elapsed().as_secs_f64()
    );
    if let Some(h) = &humidity {
        println!("✅ Humidity data loaded: {} records", h.len());
    }
    if series.is_empty() {
        println!("⚠️ Temperature series is empty, every search will miss");
    }

    let facade = facade::QueryFacade::new(series, humidity, args.config.clone());

    if !args.is_batch() {
        let stdin = std::io::stdin();
        return repl::run(&facade, stdin.lock(), std::io::stdout().lock());
    }

    let queries = match &args.queries {
        Some(path) => batch::read_queries(path)?,
        None => facade
            .series()
            .entries()
            .iter()
            .map(|e| e.timestamp.clone())
            .collect(),
    };

    let effective_threads = utils::effective_threads(args.threads)?;
    println!("🚀 Running {} queries on {} thread(s)", queries.len(), effective_threads);

    let start = std::time::Instant::now();
    let summary = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        local_pool.install(|| batch::run_batch(&facade, &queries))
    } else {
        batch::run_batch(&facade, &queries)
    };
    batch::print_summary(&summary);

    if let Some(path) = &args.report {
        batch::write_report(path, &summary.reports)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("📄 Report written to {}", path.display());
    }

    println!(
        "✅ Batch completed in {:?} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
