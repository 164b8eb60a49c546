use crate::facade::SearchConfig;
use crate::search::Strategy;
use crate::search::learned::ModelKind;

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub temperature: std::path::PathBuf,
    pub humidity: Option<std::path::PathBuf>,
    pub queries: Option<std::path::PathBuf>,
    pub all: bool,
    pub report: Option<std::path::PathBuf>,
    pub threads: Option<usize>,
    pub verbose: u8,
    pub config: SearchConfig,
}

/// Command-line arguments parser using Clap.
///
/// Feature selection (which strategies run, neighbour count, LABIS tuning)
/// is expressed as flags and collected into a `SearchConfig`.
impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    ///
    /// # Errors
    /// * Exits with a usage message if required arguments are missing or invalid.
    pub fn parse() -> Self {
        Self::parse_from(std::env::args_os())
    }

    /// Parses arguments from an explicit iterator (first item is the binary name).
    pub fn parse_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command().get_matches_from(args);

        let strategies = matches
            .get_many::<Strategy>("strategies")
            .map(|values| dedup(values.copied()))
            .unwrap_or_else(|| Strategy::ALL.to_vec());

        let config = SearchConfig {
            strategies,
            neighbors: matches.get_one::<usize>("neighbors").copied().unwrap_or(5),
            window_radius: matches.get_one::<usize>("window").copied().unwrap_or(10),
            model: matches.get_one::<ModelKind>("model").copied().unwrap_or_default(),
            refit_per_query: matches.get_flag("refit"),
        };

        Args {
            temperature: matches
                .get_one::<std::path::PathBuf>("temperature")
                .cloned()
                .unwrap_or_default(),
            humidity: matches.get_one::<std::path::PathBuf>("humidity").cloned(),
            queries: matches.get_one::<std::path::PathBuf>("queries").cloned(),
            all: matches.get_flag("all"),
            report: matches.get_one::<std::path::PathBuf>("report").cloned(),
            threads: matches.get_one::<usize>("threads").cloned(),
            verbose: matches.get_count("verbose"),
            config,
        }
    }

    /// True when queries come from a file or the series itself rather than stdin.
    pub fn is_batch(&self) -> bool {
        self.queries.is_some() || self.all
    }
}

fn command() -> clap::Command {
    clap::Command::new("ts_search")
        .version("0.1.0")
        .about("Compare search strategies over timestamp-keyed measurement series")
        .arg(
            clap::Arg::new("temperature")
                .short('t')
                .long("temperature")
                .help("Path to line-delimited JSON temperature file")
                .required(true)
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("humidity")
                .short('H')
                .long("humidity")
                .help("Path to line-delimited JSON humidity file joined onto results")
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("strategies")
                .short('s')
                .long("strategies")
                .help("Comma-separated strategies to run. Available: bis, jump, exponential, labis (default: all)")
                .num_args(1)
                .value_delimiter(',')
                .action(clap::ArgAction::Append)
                .value_parser(clap::builder::ValueParser::new(parse_strategy)),
        )
        .arg(
            clap::Arg::new("neighbors")
                .short('k')
                .long("neighbors")
                .help("Number of nearest neighbours to list, 0 disables (default: 5)")
                .num_args(1)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            clap::Arg::new("window")
                .short('w')
                .long("window")
                .help("LABIS search radius around the predicted position (default: 10)")
                .num_args(1)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .help("LABIS position model. Available: linear, endpoints")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_model)),
        )
        .arg(
            clap::Arg::new("refit")
                .long("refit")
                .help("Refit the LABIS model on every query instead of once at startup")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("queries")
                .short('q')
                .long("queries")
                .help("Run a batch comparison over timestamps listed one per line")
                .num_args(1)
                .conflicts_with("all")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("all")
                .short('a')
                .long("all")
                .help("Run a batch comparison over every stored timestamp")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("report")
                .short('r')
                .long("report")
                .help("Write per-query batch results to this CSV file")
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("threads")
                .short('j')
                .long("threads")
                .help("Number of threads for batch runs (default: all available)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(clap::ArgAction::Count),
        )
}

fn dedup(values: impl Iterator<Item = Strategy>) -> Vec<Strategy> {
    let mut out = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse::<Strategy>().map_err(|e| e.to_string())
}

fn parse_model(s: &str) -> Result<ModelKind, String> {
    s.parse::<ModelKind>().map_err(|e| e.to_string())
}

/// Validates that the number of threads is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number of threads.
///
/// # Returns
/// * `Result<usize>` - Validated number of threads.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}
