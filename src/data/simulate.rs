use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::SalaryRecord;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SAMPLES: usize = 300;
pub const MIN_SAMPLES: usize = 50;
pub const MAX_SAMPLES: usize = 2000;
pub const SAMPLES_STEP: usize = 50;

/// Points on each density outline.
const DENSITY_POINTS: usize = 64;

// ---------------------------------------------------------------------------
// Simulated series
// ---------------------------------------------------------------------------

/// Five-number summary of a sample (whiskers are the sample extrema).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

/// Illustrative samples for one department. Not real salary records.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSeries {
    pub department: String,
    pub samples: Vec<f64>,
    pub stats: BoxStats,
    /// `[salary, density]` pairs spanning the sample range.
    pub density: Vec<[f64; 2]>,
}

/// Draw `samples_per_department` triangular samples (min, mode = average,
/// max) for every record with a usable range.
///
/// Records are skipped when a value is missing, when `min >= max`, or when
/// the average falls outside `[min, max]`. One RNG is shared across records
/// in view order so the result depends only on the inputs and `seed`.
pub fn simulate_distributions(
    records: &[SalaryRecord],
    samples_per_department: usize,
    seed: u64,
) -> Vec<SimulatedSeries> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = samples_per_department.max(1);

    records
        .iter()
        .filter_map(|r| {
            let (Some(lo), Some(mode), Some(hi)) = (r.min, r.average, r.max) else {
                return None;
            };
            if lo >= hi || mode < lo || mode > hi {
                log::debug!("Skipping simulation for {}: invalid range", r.department);
                return None;
            }
            let samples: Vec<f64> = (0..n)
                .map(|_| triangular(lo, mode, hi, rng.random::<f64>()))
                .collect();
            let stats = box_stats(&samples)?;
            let density = density_outline(&samples, DENSITY_POINTS);
            Some(SimulatedSeries {
                department: r.department.clone(),
                samples,
                stats,
                density,
            })
        })
        .collect()
}

/// Inverse CDF of the triangular distribution at `u` in `[0, 1)`.
pub fn triangular(lo: f64, mode: f64, hi: f64, u: f64) -> f64 {
    let span = hi - lo;
    let split = (mode - lo) / span;
    if u < split {
        lo + (u * span * (mode - lo)).sqrt()
    } else {
        hi - ((1.0 - u) * span * (hi - mode)).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Quantile with linear interpolation between order statistics.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

pub fn box_stats(samples: &[f64]) -> Option<BoxStats> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(BoxStats {
        lower_whisker: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        upper_whisker: sorted[sorted.len() - 1],
    })
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated at
/// `points` evenly spaced salaries between the sample extrema.
pub fn density_outline(samples: &[f64], points: usize) -> Vec<[f64; 2]> {
    if samples.len() < 2 || points < 2 {
        return Vec::new();
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = var.sqrt() * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    let lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let d: f64 = samples
                .iter()
                .map(|s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                .sum();
            [x, d * norm]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangular_hits_the_bounds() {
        assert_eq!(triangular(10.0, 20.0, 40.0, 0.0), 10.0);
        assert!((triangular(10.0, 20.0, 40.0, 1.0) - 40.0).abs() < 1e-9);
        // CDF at the mode equals (mode - lo) / (hi - lo).
        assert!((triangular(10.0, 20.0, 40.0, 1.0 / 3.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn samples_stay_in_range() {
        let records = vec![SalaryRecord::new("IT", 28560.18, 10544.19, 115178.51)];
        let sims = simulate_distributions(&records, 500, DEFAULT_SEED);
        assert_eq!(sims.len(), 1);
        let s = &sims[0];
        assert_eq!(s.samples.len(), 500);
        assert!(s.samples.iter().all(|&v| (10544.19..=115178.51).contains(&v)));
        assert!(s.stats.q1 <= s.stats.median && s.stats.median <= s.stats.q3);
        assert_eq!(s.density.len(), DENSITY_POINTS);
    }

    #[test]
    fn same_seed_same_samples() {
        let records = vec![
            SalaryRecord::new("IT", 30.0, 10.0, 90.0),
            SalaryRecord::new("HR", 20.0, 5.0, 40.0),
        ];
        assert_eq!(
            simulate_distributions(&records, 100, 7),
            simulate_distributions(&records, 100, 7)
        );
    }

    #[test]
    fn invalid_ranges_are_skipped() {
        let mut missing = SalaryRecord::new("Ops", 1.0, 0.0, 2.0);
        missing.max = None;
        let records = vec![
            SalaryRecord::new("Flat", 5.0, 5.0, 5.0),
            SalaryRecord::new("Outside", 50.0, 10.0, 40.0),
            missing,
        ];
        assert!(simulate_distributions(&records, 100, DEFAULT_SEED).is_empty());
    }

    #[test]
    fn quartiles_interpolate() {
        let stats = box_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q3, 3.25);
        assert_eq!(stats.upper_whisker, 4.0);
        assert!(box_stats(&[]).is_none());
    }
}
