use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::HistoryRing;
use crate::kalman::{KalmanParams, ScalarKalman};
use crate::precision::FilterParams;

/// Filtered scalar channels of a measurement.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Width,
    Height,
    Depth,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Width => "width",
            Dimension::Height => "height",
            Dimension::Depth => "depth",
        }
    }
}

/// Kalman state plus history for one `(object, dimension)` key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub kalman: ScalarKalman,
    pub history: HistoryRing,
    /// Timestamp of the most recent update; drives idle eviction.
    pub last_update_ms: f64,
}

impl DimensionFilter {
    fn new(initial: f64, timestamp_ms: f64, window: usize, params: &KalmanParams) -> Self {
        Self {
            kalman: ScalarKalman::new(initial, params),
            history: HistoryRing::new(window),
            last_update_ms: timestamp_ms,
        }
    }
}

/// Caller-owned map of per-dimension filter state.
///
/// Deliberately not a global: the caller owns the store, passes it `&mut`
/// into each pipeline invocation (single writer), and garbage-collects
/// idle entries with an explicit [`FilterStore::sweep`]. Reuse across
/// sequential invocations needs no locking as long as at most one
/// invocation is in flight at a time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilterStore {
    filters: HashMap<(String, Dimension), DimensionFilter>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the filter for a key, creating it lazily from the first
    /// observation.
    pub fn entry(
        &mut self,
        object_id: &str,
        dimension: Dimension,
        initial: f64,
        timestamp_ms: f64,
        params: &FilterParams,
    ) -> &mut DimensionFilter {
        self.filters
            .entry((object_id.to_owned(), dimension))
            .or_insert_with(|| {
                DimensionFilter::new(initial, timestamp_ms, params.window, &params.kalman)
            })
    }

    pub fn get(&self, object_id: &str, dimension: Dimension) -> Option<&DimensionFilter> {
        self.filters.get(&(object_id.to_owned(), dimension))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Evict every filter idle for longer than `idle_timeout_ms`.
    /// Returns the number of evicted entries.
    pub fn sweep(&mut self, now_ms: f64, idle_timeout_ms: f64) -> usize {
        let before = self.filters.len();
        self.filters
            .retain(|_, f| now_ms - f.last_update_ms <= idle_timeout_ms);
        let evicted = before - self.filters.len();
        if evicted > 0 {
            log::debug!("evicted {evicted} idle measurement filters");
        }
        evicted
    }
}
