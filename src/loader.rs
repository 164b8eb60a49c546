use crate::error::SearchError;
use crate::series::{Entry, OrderedSeries};

/// A measurement as it appears in the input files.
///
/// Sources write numbers either bare or quoted, and use `""` or `null` for
/// missing readings.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

/// One input line: an object mapping canonical timestamps to measurements.
type Record = std::collections::BTreeMap<String, Option<RawValue>>;

/// Loads a line-delimited JSON file into an `OrderedSeries`.
///
/// The file is memory-mapped and parsed line by line. Each line holds one JSON
/// object of `timestamp → value` pairs; blank lines are skipped and empty
/// values are dropped.
///
/// # Arguments
/// * `path` - Path to the input file (e.g. `tempm.txt`).
///
/// # Returns
/// * `Result<OrderedSeries, SearchError>` - The sorted series.
///
/// # Errors
/// * `Io` if the file cannot be opened or mapped.
/// * `Json` if a line is not a JSON object.
/// * `MalformedTimestamp` / `InvalidValue` for bad pairs.
pub fn load_series<P: AsRef<std::path::Path>>(path: P) -> Result<OrderedSeries, SearchError> {
    let path = path.as_ref();
    let io_err = |source| SearchError::Io { path: path.to_path_buf(), source };

    let file = std::fs::File::open(path).map_err(io_err)?;
    if file.metadata().map_err(io_err)?.len() == 0 {
        tracing::warn!(path = %path.display(), "input file is empty");
        return Ok(OrderedSeries::default());
    }
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;

    let series = parse_records(&mmap).inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to parse input");
    })?;
    log_summary(path, &series);
    Ok(series)
}

/// Parses line-delimited JSON records from a byte buffer.
pub fn parse_records(data: &[u8]) -> Result<OrderedSeries, SearchError> {
    let mut entries = Vec::new();
    let mut dropped = 0usize;

    for (line_no, line) in data.split(|&b| b == b'\n').enumerate() {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        let record: Record = serde_json::from_slice(line)
            .map_err(|source| SearchError::Json { line: line_no + 1, source })?;

        for (timestamp, raw) in record {
            match parse_value(&timestamp, raw)? {
                Some(value) => {
                    let entry = Entry::new(&timestamp, value).inspect_err(|_| {
                        tracing::debug!(line = line_no + 1, %timestamp, "malformed timestamp");
                    })?;
                    entries.push(entry);
                }
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "dropped empty readings");
    }
    Ok(OrderedSeries::from_entries(entries))
}

/// Converts a raw reading into a number; empty readings become `None`.
fn parse_value(timestamp: &str, raw: Option<RawValue>) -> Result<Option<f64>, SearchError> {
    let invalid = |value: String| SearchError::InvalidValue { timestamp: timestamp.to_string(), value };
    match raw {
        None => Ok(None),
        Some(RawValue::Number(n)) => Ok(Some(n)),
        Some(RawValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            match text.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(invalid(text.to_string())),
            }
        }
    }
}

/// Loads the primary series and, if given, the secondary series in parallel.
pub fn load_pair<P: AsRef<std::path::Path> + Sync>(
    primary: P,
    secondary: Option<P>,
) -> Result<(OrderedSeries, Option<OrderedSeries>), SearchError> {
    let (primary, secondary) = rayon::join(
        || load_series(&primary),
        || secondary.as_ref().map(load_series).transpose(),
    );
    Ok((primary?, secondary?))
}

fn log_summary(path: &std::path::Path, series: &OrderedSeries) {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => tracing::info!(
            path = %path.display(),
            entries = series.len(),
            first = %first.timestamp,
            last = %last.timestamp,
            "series loaded"
        ),
        _ => tracing::warn!(path = %path.display(), "series loaded without entries"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_sorts_records() {
        let file = write_file(concat!(
            "{\"2024-01-01T02:00:00\": \"9\"}\n",
            "{\"2024-01-01T00:00:00\": \"10.0\", \"2024-01-01T01:00:00\": 12}\n",
            "\n",
            "{\"2024-01-01T03:00:00\": \"\"}\n",
            "{\"2024-01-01T04:00:00\": null}\n",
        ));
        let series = load_series(file.path()).unwrap();
        let pairs: Vec<_> = series.entries().iter().map(|e| (e.timestamp.as_str(), e.value)).collect();
        assert_eq!(
            pairs,
            [
                ("2024-01-01T00:00:00", 10.0),
                ("2024-01-01T01:00:00", 12.0),
                ("2024-01-01T02:00:00", 9.0),
            ]
        );
    }

    #[test]
    fn malformed_timestamp_fails_fast() {
        let file = write_file("{\"2024-01-01T00:00:00\": \"1\"}\n{\"01/02/2024 10:00\": \"2\"}\n");
        match load_series(file.path()) {
            Err(SearchError::MalformedTimestamp { input }) => assert_eq!(input, "01/02/2024 10:00"),
            other => panic!("expected MalformedTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn reports_bad_json_line() {
        let file = write_file("{\"2024-01-01T00:00:00\": \"1\"}\nnot json\n");
        assert!(matches!(load_series(file.path()), Err(SearchError::Json { line: 2, .. })));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = parse_records(b"{\"2024-01-01T00:00:00\": \"warm\"}").unwrap_err();
        assert!(matches!(err, SearchError::InvalidValue { .. }));
    }

    #[test]
    fn empty_and_missing_files() {
        let empty = write_file("");
        assert!(load_series(empty.path()).unwrap().is_empty());
        assert!(matches!(
            load_series("/definitely/not/here.txt"),
            Err(SearchError::Io { .. })
        ));
    }

    #[test]
    fn loads_pair_in_parallel() {
        let temp = write_file("{\"2024-01-01T00:00:00\": \"10\"}\n");
        let hum = write_file("{\"2024-01-01T00:00:00\": \"80\"}\n");
        let (t, h) = load_pair(temp.path(), Some(hum.path())).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(h.unwrap().lookup("2024-01-01T00:00:00").unwrap(), Some(80.0));

        let (_, none) = load_pair(temp.path(), None).unwrap();
        assert!(none.is_none());
    }
}
