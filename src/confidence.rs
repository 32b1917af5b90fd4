//! Confidence scoring: how trustworthy an estimate is, given the sample
//! behind it.

use crate::config::ConfidenceConfig;

/// Piecewise-linear map from sample size to a bounded percentage. Zero
/// samples pin the floor outright; beyond the last anchor the curve
/// saturates at its ceiling value. Monotone by construction as long as
/// the configured anchors are.
pub fn sample_size_confidence(n: usize, cfg: &ConfidenceConfig) -> f64 {
    if n == 0 {
        return cfg.floor;
    }
    let anchors = &cfg.breakpoints;
    let Some(&(first_n, first_v)) = anchors.first() else {
        return cfg.floor;
    };
    if n <= first_n {
        return first_v.clamp(cfg.floor, cfg.ceiling);
    }

    for pair in anchors.windows(2) {
        let (lo_n, lo_v) = pair[0];
        let (hi_n, hi_v) = pair[1];
        if n < hi_n {
            let t = (n - lo_n) as f64 / (hi_n - lo_n) as f64;
            let v = lo_v + t * (hi_v - lo_v);
            return v.clamp(cfg.floor, cfg.ceiling);
        }
    }

    anchors
        .last()
        .map(|&(_, v)| v)
        .unwrap_or(cfg.floor)
        .clamp(cfg.floor, cfg.ceiling)
}

/// Clamped linear map from average goal stddev to a confidence value:
/// tight scoring patterns are more predictable than volatile ones.
pub fn dispersion_confidence(avg_stddev: f64, cfg: &ConfidenceConfig) -> f64 {
    (cfg.dispersion_base - cfg.dispersion_slope * avg_stddev).clamp(cfg.floor, cfg.ceiling)
}

/// Weighted blend of the two signals. Sample size carries the larger
/// weight: a precise-looking tiny sample must not out-rank a noisier
/// large one.
pub fn combined_confidence(n: usize, dispersion: f64, cfg: &ConfidenceConfig) -> f64 {
    let sample = sample_size_confidence(n, cfg);
    (sample * cfg.sample_weight + dispersion * cfg.dispersion_weight).clamp(cfg.floor, cfg.ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ConfidenceConfig {
        ConfidenceConfig::default()
    }

    #[test]
    fn zero_sample_pins_the_floor() {
        assert_eq!(sample_size_confidence(0, &cfg()), 5.0);
    }

    #[test]
    fn anchor_values_are_hit_exactly() {
        let c = cfg();
        assert_eq!(sample_size_confidence(5, &c), 15.0);
        assert_eq!(sample_size_confidence(10, &c), 20.0);
        assert_eq!(sample_size_confidence(50, &c), 50.0);
        assert_eq!(sample_size_confidence(100, &c), 65.0);
        assert_eq!(sample_size_confidence(400, &c), 85.0);
        assert_eq!(sample_size_confidence(10_000, &c), 85.0);
    }

    #[test]
    fn interpolates_between_anchors() {
        let c = cfg();
        // Halfway between (20, 30) and (50, 50).
        let v = sample_size_confidence(35, &c);
        assert!((v - 40.0).abs() < 1e-9);
    }

    #[test]
    fn monotone_and_bounded() {
        let c = cfg();
        let mut prev = 0.0;
        for n in 0..600 {
            let v = sample_size_confidence(n, &c);
            assert!(v >= prev - 1e-12, "not monotone at n={n}");
            assert!((5.0..=85.0).contains(&v));
            prev = v;
        }
    }

    #[test]
    fn dispersion_is_clamped_both_ways() {
        let c = cfg();
        assert_eq!(dispersion_confidence(0.0, &c), 85.0);
        assert_eq!(dispersion_confidence(100.0, &c), 5.0);
        let mid = dispersion_confidence(2.0, &c);
        assert!((mid - 65.0).abs() < 1e-9);
    }

    #[test]
    fn sample_size_dominates_the_blend() {
        let c = cfg();
        // A tiny but perfectly steady sample should not beat a large
        // noisy one.
        let tiny_steady = combined_confidence(2, 85.0, &c);
        let big_noisy = combined_confidence(400, 30.0, &c);
        assert!(big_noisy > tiny_steady);
        assert!((5.0..=85.0).contains(&tiny_steady));
    }
}
