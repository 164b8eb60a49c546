/// Errors raised while projecting timestamps, loading series or reading configuration.
///
/// A search miss is never an error: it is reported as an absent value in
/// `search::SearchOutcome`. Searching an empty series is a miss as well.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Input does not match the canonical `YYYY-MM-DDTHH:MM:SS` format.
    #[error("Malformed timestamp '{input}', expected YYYY-MM-DDTHH:MM:SS")]
    MalformedTimestamp { input: String },

    /// A non-empty measurement that is not a number.
    #[error("Invalid value '{value}' for timestamp {timestamp}")]
    InvalidValue { timestamp: String, value: String },

    /// A line that is not a JSON object of timestamp → value pairs.
    #[error("Invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown strategy '{0}'. Available: bis, jump, exponential, labis")]
    UnknownStrategy(String),

    #[error("Unknown model '{0}'. Available: linear, endpoints")]
    UnknownModel(String),
}

impl SearchError {
    pub fn malformed(input: &str) -> Self {
        SearchError::MalformedTimestamp { input: input.to_string() }
    }
}
