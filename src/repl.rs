use crate::facade::{QueryFacade, QueryReport};
use crate::search::Strategy;
use crate::timekey;
use crate::utils;

/// Entries shown on each side of the insertion point after a miss.
const NEARBY_RADIUS: usize = 2;

/// Runs the interactive read-eval loop until `exit`, `quit` or end of input.
///
/// Every line is canonicalized first; invalid input prints a hint and the
/// loop continues. Valid timestamps are searched through the facade and the
/// report is written to `out`.
///
/// # Arguments
/// * `facade` - Query surface with the loaded series.
/// * `input` - Source of user lines (stdin in the binary).
/// * `out` - Destination for prompts and results (stdout in the binary).
///
/// # Returns
/// * `anyhow::Result<()>` - Fails only on I/O errors.
pub fn run<R: std::io::BufRead, W: std::io::Write>(facade: &QueryFacade, input: R, mut out: W) -> anyhow::Result<()> {
    let mut lines = input.lines();
    loop {
        writeln!(out, "\nEnter timestamp (format: YYYY-MM-DDTHH:MM:SS)")?;
        writeln!(out, "Or type 'exit' to quit")?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let timestamp = match timekey::canonicalize(line) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::debug!(input = line, "rejected input");
                writeln!(out, "⚠️ {}", e)?;
                continue;
            }
        };
        let report = facade.search(&timestamp)?;
        print_report(facade, &report, &mut out)?;
    }
    anyhow::Ok(())
}

/// Writes one query report in human-readable form.
pub fn print_report<W: std::io::Write>(facade: &QueryFacade, report: &QueryReport, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "Normalized timestamp: {}", report.timestamp)?;
    writeln!(out, "\nResults:")?;
    writeln!(out, "{}", "-".repeat(40))?;

    match report.value() {
        Some(value) => writeln!(out, "Temperature: {}°C", value)?,
        None => writeln!(out, "No temperature data found for this timestamp.")?,
    }
    writeln!(out, "Humidity: {}", utils::format_value(report.humidity))?;

    for o in &report.outcomes {
        let verdict = match o.outcome.index {
            Some(i) => format!("found at index {}", i),
            None => "miss".to_string(),
        };
        writeln!(out, " - {:<12} steps: {:<4} {}", o.strategy.name(), o.outcome.steps, verdict)?;
    }
    if let Some((reference, delta)) = report.labis_improvement() {
        writeln!(out, "LABIS improvement over {}: {} steps", reference, delta)?;
    }

    let labis_missed = report.outcome(Strategy::Labis).is_some_and(|o| !o.is_hit());
    if report.value().is_none() {
        print_miss_context(facade, report, out)?;
    } else if labis_missed {
        writeln!(out, "⚠️ LABIS window missed a stored timestamp")?;
    }

    if !report.neighbors.is_empty() {
        writeln!(out, "\nKNN ({} nearest):", report.neighbors.len())?;
        for n in &report.neighbors {
            writeln!(
                out,
                "{}: {}°C, Humidity: {}",
                n.timestamp,
                n.value,
                utils::format_value(n.humidity)
            )?;
        }
    }
    anyhow::Ok(())
}

fn print_miss_context<W: std::io::Write>(facade: &QueryFacade, report: &QueryReport, out: &mut W) -> anyhow::Result<()> {
    let nearby = facade.nearby(report.key, NEARBY_RADIUS);
    if !nearby.is_empty() {
        writeln!(out, "Nearby timestamps:")?;
        for entry in nearby {
            writeln!(out, " - {}: {}°C", entry.timestamp, entry.value)?;
        }
    }

    if facade.humidity().is_some() && report.humidity.is_none() {
        let same_day = facade.humidity_on_date(&report.timestamp);
        if !same_day.is_empty() {
            writeln!(out, "Humidity timestamps on this date:")?;
            for entry in same_day {
                writeln!(out, " - {}", entry.timestamp)?;
            }
        }
    }
    anyhow::Ok(())
}
