//! Temporal stabilization and uncertainty estimation.
//!
//! The precision filter smooths each measured dimension with a scalar
//! Kalman filter backed by a bounded history ring, rejecting low-confidence
//! outliers and applying exponential-decay temporal smoothing. Filter state
//! lives in a caller-owned [`FilterStore`] keyed by `(object, dimension)` —
//! there is no global state; the caller passes the store into every
//! invocation and decides when to [`FilterStore::sweep`] idle entries.
//!
//! The uncertainty estimator combines measurement stability, calibration,
//! algorithm and depth error sources by root-sum-of-squares into one final
//! confidence bound.

mod history;
mod kalman;
mod precision;
mod store;
mod uncertainty;

pub use history::{HistoryRing, Sample};
pub use kalman::{KalmanParams, ScalarKalman};
pub use precision::{stabilize, FilterParams};
pub use store::{Dimension, DimensionFilter, FilterStore};
pub use uncertainty::{assess, UncertaintyBreakdown, UncertaintyParams};
