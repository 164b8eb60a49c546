use crate::error::SearchError;
use crate::facade::{QueryFacade, QueryReport};
use crate::search::Strategy;

use rayon::prelude::*;

/// Aggregated cost of one strategy across a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyStats {
    pub strategy: Strategy,
    pub queries: usize,
    pub hits: usize,
    pub total_steps: u64,
    pub max_steps: u32,
}

impl StrategyStats {
    fn new(strategy: Strategy) -> Self {
        StrategyStats { strategy, queries: 0, hits: 0, total_steps: 0, max_steps: 0 }
    }

    pub fn mean_steps(&self) -> f64 {
        if self.queries == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.queries as f64
        }
    }
}

/// Result of a batch comparison run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Reports of accepted queries, in input order.
    pub reports: Vec<QueryReport>,
    /// Query lines that were not valid timestamps.
    pub rejected: Vec<(String, SearchError)>,
    /// One entry per configured strategy, in configuration order.
    pub stats: Vec<StrategyStats>,
}

/// One CSV row: a single strategy's outcome for a single query.
#[derive(Debug, serde::Serialize)]
struct ReportRow<'a> {
    timestamp: &'a str,
    strategy: Strategy,
    found: bool,
    value: Option<f64>,
    steps: u32,
}

/// Reads query timestamps, one per line.
///
/// Blank lines and lines starting with `#` are ignored. Lines are
/// canonicalized later, so invalid ones surface as rejected queries.
pub fn read_queries<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to read queries from {}: {}", path.as_ref().display(), e))?;
    let queries = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect();
    anyhow::Ok(queries)
}

/// Evaluates every query against the facade in parallel.
///
/// Queries run on the current Rayon pool and share the facade read-only.
/// Output order follows input order, so the result equals a sequential run.
///
/// # Arguments
/// * `facade` - Query surface with the loaded series.
/// * `queries` - Raw timestamps; each is canonicalized before searching.
///
/// # Returns
/// * `BatchSummary` - Per-query reports, rejected lines and per-strategy totals.
pub fn run_batch(facade: &QueryFacade, queries: &[String]) -> BatchSummary {
    let progress = indicatif::ProgressBar::new(queries.len() as u64);
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} queries") {
        progress.set_style(style);
    }

    let results: Vec<Result<QueryReport, SearchError>> = queries
        .par_iter()
        .map(|raw| {
            let result = crate::timekey::canonicalize(raw).and_then(|ts| facade.search(&ts));
            progress.inc(1);
            result
        })
        .collect();
    progress.finish_and_clear();

    let mut reports = Vec::with_capacity(results.len());
    let mut rejected = Vec::new();
    for (raw, result) in queries.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!(query = %raw, error = %e, "rejected query");
                rejected.push((raw.clone(), e));
            }
        }
    }

    let stats = summarize(&facade.config().strategies, &reports);
    BatchSummary { reports, rejected, stats }
}

fn summarize(strategies: &[Strategy], reports: &[QueryReport]) -> Vec<StrategyStats> {
    let mut stats: Vec<StrategyStats> = strategies.iter().map(|&s| StrategyStats::new(s)).collect();
    for report in reports {
        for stat in stats.iter_mut() {
            if let Some(outcome) = report.outcome(stat.strategy) {
                stat.queries += 1;
                stat.hits += outcome.is_hit() as usize;
                stat.total_steps += outcome.steps as u64;
                stat.max_steps = stat.max_steps.max(outcome.steps);
            }
        }
    }
    stats
}

/// Writes one CSV row per (query, strategy) pair.
pub fn write_report<P: AsRef<std::path::Path>>(path: P, reports: &[QueryReport]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for report in reports {
        for o in &report.outcomes {
            writer.serialize(ReportRow {
                timestamp: &report.timestamp,
                strategy: o.strategy,
                found: o.outcome.is_hit(),
                value: o.outcome.value,
                steps: o.outcome.steps,
            })?;
        }
    }
    writer.flush()?;
    anyhow::Ok(())
}

/// Prints per-strategy totals of a batch run.
pub fn print_summary(summary: &BatchSummary) {
    println!(
        "📈 {} queries evaluated, {} rejected",
        summary.reports.len(),
        summary.rejected.len()
    );
    for stat in &summary.stats {
        println!(
            " - {:<12} hits: {:>6}/{:<6} mean steps: {:>6.2}  max steps: {}",
            stat.strategy.name(),
            stat.hits,
            stat.queries,
            stat.mean_steps(),
            stat.max_steps,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::SearchConfig;
    use crate::search::testing;
    use crate::series::OrderedSeries;

    fn facade() -> QueryFacade {
        QueryFacade::new(testing::hourly(), None, SearchConfig::default())
    }

    fn queries(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aggregates_per_strategy() {
        let facade = facade();
        let summary = run_batch(
            &facade,
            &queries(&["2024-01-01T00:00:00", "2024-01-01T01:00:00", "2024-01-01T05:00:00", "garbage"]),
        );
        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(summary.rejected[0].0, "garbage");
        assert_eq!(summary.stats.len(), Strategy::ALL.len());
        for stat in &summary.stats {
            assert_eq!(stat.queries, 3);
            assert_eq!(stat.hits, 2, "{}", stat.strategy);
            assert!(stat.mean_steps() >= 1.0);
            assert!(stat.max_steps as f64 >= stat.mean_steps());
        }
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let series = testing::random(9, 2_000);
        let stamps: Vec<String> = (0..series.len())
            .step_by(7)
            .filter_map(|i| crate::timekey::format_key(series.key(i)))
            .collect();
        let pairs: Vec<(String, f64)> = series
            .entries()
            .iter()
            .filter_map(|e| Some((crate::timekey::format_key(e.key)?, e.value)))
            .collect();
        let facade = QueryFacade::new(OrderedSeries::from_pairs(pairs).unwrap(), None, SearchConfig::default());

        let summary = run_batch(&facade, &stamps);
        let sequential: Vec<QueryReport> = stamps.iter().map(|s| facade.search(s).unwrap()).collect();
        assert_eq!(summary.reports, sequential);
    }

    #[test]
    fn writes_csv_report() {
        let facade = facade();
        let summary = run_batch(&facade, &queries(&["2024-01-01T01:00:00"]));
        let file = tempfile::NamedTempFile::new().unwrap();
        write_report(file.path(), &summary.reports).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestamp,strategy,found,value,steps"));
        assert_eq!(lines.next(), Some("2024-01-01T01:00:00,bis,true,12.0,1"));
        assert_eq!(text.lines().count(), 1 + Strategy::ALL.len());
    }

    #[test]
    fn reads_queries_skipping_comments() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "# header\n2024-01-01T00:00:00\n\n  2024-01-01T01:00:00  \n").unwrap();
        assert_eq!(
            read_queries(file.path()).unwrap(),
            ["2024-01-01T00:00:00", "2024-01-01T01:00:00"]
        );
        assert!(read_queries("/no/such/queries.txt").is_err());
    }
}
