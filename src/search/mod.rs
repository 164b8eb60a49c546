//! Search strategies over an `OrderedSeries`.
//!
//! Every strategy answers the same question (is there an entry at exactly this
//! key, and what is its value) and reports how many probing steps it needed.
//! Step counts are the comparison metric between strategies, so each strategy
//! documents what one step means for it.

pub mod classic;
pub mod learned;
pub mod neighbor;

use crate::error::SearchError;
use crate::series::OrderedSeries;

/// Result of a single search.
///
/// A miss (`value == None`) is a normal outcome. `steps` always reflects the
/// work performed, including on a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub value: Option<f64>,
    /// Position of the matched entry.
    pub index: Option<usize>,
    pub steps: u32,
}

impl SearchOutcome {
    pub fn hit(series: &OrderedSeries, index: usize, steps: u32) -> Self {
        SearchOutcome {
            value: Some(series.value(index)),
            index: Some(index),
            steps,
        }
    }

    pub fn miss(steps: u32) -> Self {
        SearchOutcome { value: None, index: None, steps }
    }

    pub fn is_hit(&self) -> bool {
        self.value.is_some()
    }
}

/// Exact-match strategies the query facade can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Bisection with a degenerate-range guard.
    Bis,
    /// Interpolation with sqrt-sized block jumps.
    Jump,
    /// Interpolation with exponential galloping and a bisection finish.
    Exponential,
    /// Regression-predicted position plus a bounded window search.
    Labis,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Strategy::Bis, Strategy::Jump, Strategy::Exponential, Strategy::Labis];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Bis => "bis",
            Strategy::Jump => "jump",
            Strategy::Exponential => "exponential",
            Strategy::Labis => "labis",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bis" => Ok(Strategy::Bis),
            "jump" => Ok(Strategy::Jump),
            "exponential" | "bis*" => Ok(Strategy::Exponential),
            "labis" => Ok(Strategy::Labis),
            other => Err(SearchError::UnknownStrategy(other.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!("BIS".parse::<Strategy>().unwrap(), Strategy::Bis);
        assert_eq!(" labis ".parse::<Strategy>().unwrap(), Strategy::Labis);
        assert_eq!("bis*".parse::<Strategy>().unwrap(), Strategy::Exponential);
        assert!(matches!("ternary".parse::<Strategy>(), Err(SearchError::UnknownStrategy(_))));
        for s in Strategy::ALL {
            assert_eq!(s.name().parse::<Strategy>().unwrap(), s);
        }
    }
}
