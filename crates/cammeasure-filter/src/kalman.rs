use serde::{Deserialize, Serialize};

/// Noise configuration for the scalar filters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct KalmanParams {
    /// Initial error covariance.
    pub initial_p: f64,
    /// Process variance.
    pub q: f64,
    /// Measurement variance.
    pub r: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            initial_p: 1.0,
            q: 0.1,
            r: 0.5,
        }
    }
}

/// One-dimensional Kalman filter.
///
/// Blends each new measurement with the running estimate, weighted by the
/// relative uncertainty. A non-finite update (divergence) resets the state
/// to the incoming raw measurement instead of propagating corruption.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScalarKalman {
    /// Current estimate.
    pub x: f64,
    /// Error covariance.
    pub p: f64,
    pub q: f64,
    pub r: f64,
}

impl ScalarKalman {
    pub fn new(initial: f64, params: &KalmanParams) -> Self {
        Self {
            x: initial,
            p: params.initial_p,
            q: params.q,
            r: params.r,
        }
    }

    /// Fold in a measurement and return the updated estimate.
    pub fn update(&mut self, z: f64) -> f64 {
        let p_pred = self.p + self.q;
        let k = p_pred / (p_pred + self.r);
        let x = self.x + k * (z - self.x);
        let p = (1.0 - k) * p_pred;

        if !x.is_finite() || !p.is_finite() {
            log::warn!("kalman divergence, resetting to raw measurement {z}");
            self.x = z;
            self.p = 1.0;
            return z;
        }

        self.x = x;
        self.p = p;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_input_converges_within_one_percent() {
        let v = 250.0;
        let mut filter = ScalarKalman::new(v, &KalmanParams::default());
        let mut out = v;
        for _ in 0..10 {
            out = filter.update(v);
        }
        assert!((out - v).abs() <= 0.01 * v);
    }

    #[test]
    fn step_change_is_tracked_gradually() {
        let mut filter = ScalarKalman::new(100.0, &KalmanParams::default());
        let first = filter.update(200.0);
        assert!(first > 100.0 && first < 200.0);
        let mut out = first;
        for _ in 0..50 {
            out = filter.update(200.0);
        }
        assert!((out - 200.0).abs() < 2.0);
    }

    #[test]
    fn covariance_shrinks_with_observations() {
        let mut filter = ScalarKalman::new(10.0, &KalmanParams::default());
        let p0 = filter.p;
        for _ in 0..5 {
            filter.update(10.0);
        }
        assert!(filter.p < p0);
    }

    #[test]
    fn divergence_resets_to_raw_measurement() {
        let mut filter = ScalarKalman::new(100.0, &KalmanParams::default());
        filter.x = f64::NAN;
        let out = filter.update(42.0);
        assert_eq!(out, 42.0);
        assert_eq!(filter.x, 42.0);
        assert!(filter.p.is_finite());
    }
}
