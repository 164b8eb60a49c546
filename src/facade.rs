use crate::error::SearchError;
use crate::search::classic;
use crate::search::learned::{self, LearnedIndex, ModelKind};
use crate::search::neighbor;
use crate::search::{SearchOutcome, Strategy};
use crate::series::{Entry, OrderedSeries};
use crate::timekey;

/// Which strategies run for each query and how they are tuned.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Exact-match strategies, reported in this order.
    pub strategies: Vec<Strategy>,
    /// Nearest-neighbour list size; 0 disables the neighbour search.
    pub neighbors: usize,
    /// LABIS window radius around the predicted position.
    pub window_radius: usize,
    pub model: ModelKind,
    /// Refit the LABIS model on every query instead of reusing the cached fit.
    pub refit_per_query: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            strategies: Strategy::ALL.to_vec(),
            neighbors: 5,
            window_radius: learned::DEFAULT_WINDOW_RADIUS,
            model: ModelKind::Linear,
            refit_per_query: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub outcome: SearchOutcome,
}

/// A nearest neighbour joined with the secondary series.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborReport {
    pub timestamp: String,
    pub value: f64,
    pub distance: f64,
    pub humidity: Option<f64>,
}

/// Side-by-side outcome of every enabled strategy for one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub timestamp: String,
    pub key: f64,
    pub outcomes: Vec<StrategyOutcome>,
    /// Exact-key value from the humidity series, if one is loaded and has the key.
    pub humidity: Option<f64>,
    pub neighbors: Vec<NeighborReport>,
}

impl QueryReport {
    pub fn outcome(&self, strategy: Strategy) -> Option<&SearchOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.strategy == strategy)
            .map(|o| &o.outcome)
    }

    /// Strategies that found a value.
    pub fn found_by(&self) -> Vec<Strategy> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_hit())
            .map(|o| o.strategy)
            .collect()
    }

    /// Value reported by the first strategy that found one.
    pub fn value(&self) -> Option<f64> {
        self.outcomes.iter().find_map(|o| o.outcome.value)
    }

    /// `steps(a) - steps(b)`, or `None` if either strategy did not run.
    pub fn step_delta(&self, a: Strategy, b: Strategy) -> Option<i64> {
        let a = self.outcome(a)?.steps as i64;
        let b = self.outcome(b)?.steps as i64;
        Some(a - b)
    }

    /// Steps saved by LABIS over the classic reference strategy.
    ///
    /// The reference is jump search when enabled, otherwise BIS, otherwise
    /// the exponential variant.
    pub fn labis_improvement(&self) -> Option<(Strategy, i64)> {
        [Strategy::Jump, Strategy::Bis, Strategy::Exponential]
            .into_iter()
            .find_map(|reference| Some((reference, self.step_delta(reference, Strategy::Labis)?)))
    }
}

/// Uniform query surface over a temperature series and an optional humidity series.
///
/// Owns both series for the whole session. The learned index is fitted once
/// at construction and reused by every query unless `refit_per_query` is set.
pub struct QueryFacade {
    series: OrderedSeries,
    humidity: Option<OrderedSeries>,
    learned: LearnedIndex,
    config: SearchConfig,
}

impl QueryFacade {
    pub fn new(series: OrderedSeries, humidity: Option<OrderedSeries>, config: SearchConfig) -> Self {
        let learned = LearnedIndex::build(&series, config.model, config.window_radius);
        QueryFacade { series, humidity, learned, config }
    }

    pub fn series(&self) -> &OrderedSeries {
        &self.series
    }

    pub fn humidity(&self) -> Option<&OrderedSeries> {
        self.humidity.as_ref()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs every enabled strategy for `timestamp` and joins humidity.
    ///
    /// # Arguments
    /// * `timestamp` - Timestamp `YYYY-MM-DDTHH:MM:SS`; unpadded fields are accepted
    ///   and the report carries the canonical form.
    ///
    /// # Returns
    /// * `Result<QueryReport, SearchError>` - Outcomes of all strategies, or `MalformedTimestamp`.
    pub fn search(&self, timestamp: &str) -> Result<QueryReport, SearchError> {
        let key = timekey::project(timestamp)?;
        let humidity = match &self.humidity {
            Some(h) => h.lookup(timestamp)?,
            None => None,
        };
        let outcomes = self
            .config
            .strategies
            .iter()
            .map(|&strategy| StrategyOutcome { strategy, outcome: self.run(strategy, key) })
            .collect::<Vec<_>>();

        let neighbors = neighbor::nearest(&self.series, key, self.config.neighbors)
            .into_iter()
            .map(|n| NeighborReport {
                timestamp: n.entry.timestamp.clone(),
                value: n.entry.value,
                distance: n.distance,
                humidity: self.humidity_at(n.entry.key),
            })
            .collect();

        let report = QueryReport {
            timestamp: timekey::format_key(key).unwrap_or_else(|| timestamp.to_string()),
            key,
            outcomes,
            humidity,
            neighbors,
        };
        tracing::debug!(
            timestamp = %report.timestamp,
            found_by = ?report.found_by(),
            "query evaluated"
        );
        Ok(report)
    }

    /// Runs a single strategy against the primary series.
    pub fn run(&self, strategy: Strategy, key: f64) -> SearchOutcome {
        match strategy {
            Strategy::Bis => classic::bis(&self.series, key),
            Strategy::Jump => classic::jump_interpolation(&self.series, key),
            Strategy::Exponential => classic::exponential_interpolation(&self.series, key),
            Strategy::Labis if self.config.refit_per_query => learned::labis(
                &self.series,
                key,
                || self.config.model.create(),
                self.config.window_radius,
            ),
            Strategy::Labis => self.learned.search(&self.series, key),
        }
    }

    fn humidity_at(&self, key: f64) -> Option<f64> {
        self.humidity.as_ref().and_then(|h| h.lookup_key(key))
    }

    /// Entries of the primary series around where `key` would sit.
    pub fn nearby(&self, key: f64, radius: usize) -> &[Entry] {
        self.series.nearby(key, radius)
    }

    /// Humidity entries recorded on the same calendar date as `timestamp`.
    pub fn humidity_on_date(&self, timestamp: &str) -> &[Entry] {
        let date = timestamp.get(..10).unwrap_or(timestamp);
        match &self.humidity {
            Some(h) => h.on_date(date),
            None => &[],
        }
    }
}
