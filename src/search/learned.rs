//! Learned index search (LABIS).
//!
//! A regression model maps a key to its approximate rank in the series. The
//! predicted rank is clamped into the series and a bounded window around it
//! is bisected. Keys outside the window are reported as misses: there is no
//! fallback to a full-series search, so accuracy depends on how well the model
//! captures the key distribution.

use crate::error::SearchError;
use crate::search::SearchOutcome;
use crate::series::OrderedSeries;

/// Default number of positions searched on each side of the prediction.
pub const DEFAULT_WINDOW_RADIUS: usize = 10;

/// Predicts the rank of a key within a sorted series.
pub trait RankModel: Send + Sync {
    /// Fits the model to `(keys[i], i)` pairs. `keys` is sorted ascending.
    fn fit(&mut self, keys: &[f64]);

    /// Predicted (fractional) rank of `key`. May fall outside the series.
    fn predict(&self, key: f64) -> f64;
}

/// Ordinary least squares fit of rank against key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
}

impl RankModel for LinearRegression {
    fn fit(&mut self, keys: &[f64]) {
        let n = keys.len();
        if n == 0 {
            *self = Self::default();
            return;
        }
        // centered sums keep precision with epoch-sized keys
        let mean_x = keys.iter().sum::<f64>() / n as f64;
        let mean_y = (n - 1) as f64 / 2.0;
        let (mut sxx, mut sxy) = (0.0, 0.0);
        for (i, &x) in keys.iter().enumerate() {
            let dx = x - mean_x;
            sxx += dx * dx;
            sxy += dx * (i as f64 - mean_y);
        }
        self.slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        self.intercept = mean_y - self.slope * mean_x;
    }

    fn predict(&self, key: f64) -> f64 {
        self.slope * key + self.intercept
    }
}

/// Straight line through the first and last entries.
///
/// All-equal keys give a flat model predicting the middle rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointLine {
    slope: f64,
    intercept: f64,
}

impl RankModel for EndpointLine {
    fn fit(&mut self, keys: &[f64]) {
        let (Some(&first), Some(&last)) = (keys.first(), keys.last()) else {
            *self = Self::default();
            return;
        };
        let span = (keys.len() - 1) as f64;
        if last == first {
            self.slope = 0.0;
            self.intercept = span / 2.0;
        } else {
            self.slope = span / (last - first);
            self.intercept = -first * self.slope;
        }
    }

    fn predict(&self, key: f64) -> f64 {
        self.slope * key + self.intercept
    }
}

/// Model families selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Linear,
    Endpoints,
}

impl ModelKind {
    /// Creates an unfitted model of this kind.
    pub fn create(&self) -> Box<dyn RankModel> {
        match self {
            ModelKind::Linear => Box::new(LinearRegression::default()),
            ModelKind::Endpoints => Box::new(EndpointLine::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Endpoints => "endpoints",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelKind::Linear),
            "endpoints" => Ok(ModelKind::Endpoints),
            other => Err(SearchError::UnknownModel(other.to_string())),
        }
    }
}

impl RankModel for Box<dyn RankModel> {
    fn fit(&mut self, keys: &[f64]) {
        (**self).fit(keys)
    }

    fn predict(&self, key: f64) -> f64 {
        (**self).predict(key)
    }
}

/// Learned index search that fits a fresh model on every call.
///
/// Step 1 is the prediction itself; each bisection iteration inside the
/// `±window_radius` window adds one more step.
///
/// # Arguments
/// * `series` - Sorted series to search.
/// * `target` - Numeric key to find.
/// * `model_factory` - Produces the unfitted model used for this query.
/// * `window_radius` - Positions searched on each side of the prediction.
///
/// # Returns
/// * `SearchOutcome` - Hit, or a miss if the key is absent or outside the window.
pub fn labis<M, F>(series: &OrderedSeries, target: f64, model_factory: F, window_radius: usize) -> SearchOutcome
where
    M: RankModel,
    F: FnOnce() -> M,
{
    if series.is_empty() {
        return SearchOutcome::miss(0);
    }
    let keys: Vec<f64> = series.entries().iter().map(|e| e.key).collect();
    let mut model = model_factory();
    model.fit(&keys);
    window_search(series, model.predict(target), target, window_radius)
}

/// Learned index with a model fitted once and reused across queries.
///
/// The model is query-independent state, so a built index can be shared
/// read-only between threads. Call `refresh` after the series changes.
pub struct LearnedIndex {
    kind: ModelKind,
    model: Box<dyn RankModel>,
    window_radius: usize,
}

impl LearnedIndex {
    /// Fits a model of `kind` over `series`.
    pub fn build(series: &OrderedSeries, kind: ModelKind, window_radius: usize) -> Self {
        let mut index = LearnedIndex {
            kind,
            model: kind.create(),
            window_radius,
        };
        index.refresh(series);
        index
    }

    /// Refits the model against the current contents of `series`.
    pub fn refresh(&mut self, series: &OrderedSeries) {
        let keys: Vec<f64> = series.entries().iter().map(|e| e.key).collect();
        self.model = self.kind.create();
        self.model.fit(&keys);
        tracing::debug!(model = self.kind.name(), entries = series.len(), "learned index fitted");
    }

    /// Predicts, then bisects the window around the prediction. Same step
    /// accounting as `labis`.
    pub fn search(&self, series: &OrderedSeries, target: f64) -> SearchOutcome {
        if series.is_empty() {
            return SearchOutcome::miss(0);
        }
        window_search(series, self.model.predict(target), target, self.window_radius)
    }
}

/// Bisects `[pos - radius, pos + radius]` around the rounded prediction.
fn window_search(series: &OrderedSeries, predicted: f64, target: f64, radius: usize) -> SearchOutcome {
    let last = series.len() - 1;
    let pos = if predicted.is_finite() {
        predicted.round().clamp(0.0, last as f64) as usize
    } else {
        0
    };

    let mut steps = 1;
    let mut low = pos.saturating_sub(radius) as isize;
    let mut high = pos.saturating_add(radius).min(last) as isize;

    while low <= high {
        steps += 1;
        let mid = low + (high - low) / 2;
        let key = series.key(mid as usize);
        if key == target {
            return SearchOutcome::hit(series, mid as usize, steps);
        }
        if key < target {
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    SearchOutcome::miss(steps)
}
