//! Search configuration for the itinerary planner.

use super::layover::LayoverPolicy;

/// Configuration parameters for itinerary search.
///
/// The defaults apply when a query leaves a parameter unset; the layover
/// bounds are shared by every search and only the mode varies per query.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Transfers allowed when the query does not say (0-2).
    pub default_max_transfers: usize,

    /// Minimum transfer time when the query does not say (minutes).
    pub default_min_transfer_mins: u32,

    /// Maximum number of itineraries returned by one search.
    pub max_results: usize,

    /// Day window and per-period layover bounds.
    pub layover: LayoverPolicy,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        default_max_transfers: usize,
        default_min_transfer_mins: u32,
        max_results: usize,
        layover: LayoverPolicy,
    ) -> Self {
        Self {
            default_max_transfers,
            default_min_transfer_mins,
            max_results,
            layover,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_transfers: 2,
            default_min_transfer_mins: 15,
            max_results: 200,
            layover: LayoverPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PolicyMode;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.default_max_transfers, 2);
        assert_eq!(config.default_min_transfer_mins, 15);
        assert_eq!(config.max_results, 200);
        assert_eq!(config.layover.mode, PolicyMode::Strict);
        assert_eq!(config.layover.daytime.max_minutes, Some(120));
        assert_eq!(config.layover.after_hours.max_minutes, Some(30));
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(1, 20, 5, LayoverPolicy::default());

        assert_eq!(config.default_max_transfers, 1);
        assert_eq!(config.default_min_transfer_mins, 20);
        assert_eq!(config.max_results, 5);
    }
}
