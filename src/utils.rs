/// Configures a custom Rayon thread pool with specified size.
///
/// Used for batch runs so the number of threads evaluating queries can be
/// controlled separately from the global Rayon pool.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Resolves the requested thread count, capping it at the available CPUs.
pub fn effective_threads(requested: Option<usize>) -> anyhow::Result<usize> {
    match requested {
        Some(n) if n > 0 => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                println!("⚠️ Warning: Limiting thread count to {} (max available)", max_threads);
                anyhow::Ok(max_threads)
            } else {
                anyhow::Ok(n)
            }
        }
        Some(_) => Err(anyhow::anyhow!("Number of threads must be a positive integer")),
        None => anyhow::Ok(rayon::current_num_threads()),
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the level
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace). Logs go to stderr so they
/// never interleave with results on stdout.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Formats an optional measurement, using `N/A` for missing values.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_count_is_capped() {
        assert_eq!(effective_threads(Some(1)).unwrap(), 1);
        assert_eq!(effective_threads(Some(usize::MAX)).unwrap(), num_cpus::get());
        assert!(effective_threads(Some(0)).is_err());
        assert!(effective_threads(None).unwrap() >= 1);
    }

    #[test]
    fn builds_pool() {
        let pool = configure_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }

    #[test]
    fn formats_missing_values() {
        assert_eq!(format_value(Some(12.5)), "12.5");
        assert_eq!(format_value(None), "N/A");
    }
}
