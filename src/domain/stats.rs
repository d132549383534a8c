//! Aggregate statistics over a set of position returns.

use serde::Serialize;

/// Equal-weighted aggregate statistics for a group of returns (per analyst,
/// per sector, or portfolio-wide). Each position counts once regardless of
/// size, measuring picking skill rather than position sizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Percentage of strictly positive returns; exactly 0 is not a win.
    pub win_rate: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    pub best: f64,
    pub worst: f64,
}

impl ReturnStats {
    /// Compute statistics over an already-filtered set of returns. An empty
    /// set yields `None`; "no data" is distinguished from a calculated zero.
    pub fn compute(returns: &[f64]) -> Option<ReturnStats> {
        if returns.is_empty() {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;

        let wins = returns.iter().filter(|&&r| r > 0.0).count();
        let win_rate = wins as f64 / n * 100.0;

        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        let best = returns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let worst = returns.iter().cloned().fold(f64::INFINITY, f64::min);

        Some(ReturnStats {
            count: returns.len(),
            mean,
            median: median(returns),
            win_rate,
            std_dev: variance.sqrt(),
            best,
            worst,
        })
    }
}

/// Median of a non-empty slice: middle element for odd counts, average of
/// the two middle elements for even counts.
fn median(returns: &[f64]) -> f64 {
    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_input_is_no_data() {
        assert_eq!(ReturnStats::compute(&[]), None);
    }

    #[test]
    fn three_returns() {
        let stats = ReturnStats::compute(&[33.0, -5.0, 10.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert_relative_eq!(stats.mean, 38.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(stats.median, 10.0);
        assert_relative_eq!(stats.win_rate, 200.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(stats.best, 33.0);
        assert_relative_eq!(stats.worst, -5.0);
    }

    #[test]
    fn population_std_dev_divides_by_n() {
        let stats = ReturnStats::compute(&[10.0, 15.0, -5.0, 20.0, 0.0]).unwrap();
        assert_relative_eq!(stats.mean, 8.0);
        // variance = (4 + 49 + 169 + 144 + 64) / 5 = 86
        assert_relative_eq!(stats.std_dev, 86.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(stats.std_dev, 9.27, epsilon = 0.005);
    }

    #[test]
    fn zero_return_is_not_a_win() {
        let stats = ReturnStats::compute(&[0.0, 5.0]).unwrap();
        assert_relative_eq!(stats.win_rate, 50.0);
    }

    #[test]
    fn all_losses_have_zero_win_rate() {
        let stats = ReturnStats::compute(&[-1.0, -20.0, -0.5]).unwrap();
        assert_relative_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        let stats = ReturnStats::compute(&[1.0, 9.0, 3.0, 7.0]).unwrap();
        assert_relative_eq!(stats.median, 5.0);
    }

    #[test]
    fn median_single_element() {
        let stats = ReturnStats::compute(&[42.0]).unwrap();
        assert_relative_eq!(stats.median, 42.0);
        assert_relative_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn identical_returns_have_zero_spread() {
        let stats = ReturnStats::compute(&[7.0, 7.0, 7.0]).unwrap();
        assert_relative_eq!(stats.std_dev, 0.0);
        assert_relative_eq!(stats.best, stats.worst);
    }
}
