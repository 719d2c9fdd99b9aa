// Descriptive statistics

use crate::stats::DescriptiveStats;

/// Internal implementation of [`crate::stats::describe`]
pub(crate) fn describe_impl(data: &[f64]) -> DescriptiveStats {
    let values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if values.is_empty() {
        return DescriptiveStats::default();
    }

    let count = values.len();
    let (mean, std) = if is_constant(&values) {
        (values[0], 0.0)
    } else {
        let mean = mean(&values);
        (mean, sample_std(&values, mean))
    };

    let mut sorted = values;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    DescriptiveStats {
        count,
        mean,
        std,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation with Bessel's correction; 0 below two values
pub fn sample_std(data: &[f64], mean: f64) -> f64 {
    let n = data.len();
    if n < 2 || is_constant(data) {
        return 0.0;
    }
    let sum_squared_diff = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>();
    let variance = sum_squared_diff / (n - 1) as f64;
    if variance.is_finite() && variance > 0.0 {
        variance.sqrt()
    } else {
        0.0
    }
}

/// Whether every value equals the first; true for fewer than two values
pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Linear interpolation at fractional rank `(n-1)·p` of already sorted data
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let n = sorted_data.len();
    let idx = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let idx_floor = idx.floor() as usize;
    let idx_ceil = idx.ceil() as usize;

    if idx_floor == idx_ceil {
        return sorted_data[idx_floor];
    }

    let lo = sorted_data[idx_floor];
    let hi = sorted_data[idx_ceil];
    let weight = idx - idx_floor as f64;

    let value = lo + (hi - lo) * weight;
    if lo <= hi {
        value.clamp(lo, hi)
    } else {
        value
    }
}

/// Adjusted Fisher-Pearson standardized moment coefficient (G1)
pub(crate) fn skewness_impl(data: &[f64]) -> f64 {
    let values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    let n = values.len();
    if n < 3 || is_constant(&values) {
        return 0.0;
    }
    let nf = n as f64;
    let m = mean(&values);
    let m2 = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|x| (x - m).powi(3)).sum::<f64>() / nf;
    if !(m2.is_finite() && m2 > 0.0) {
        return 0.0;
    }
    let g1 = m3 / m2.powf(1.5);
    let adjusted = g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0);
    if adjusted.is_finite() {
        adjusted
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = describe_impl(&data);

        assert_eq!(stats.count, 5);
        assert!((stats.mean - 3.0).abs() < 1e-10);
        assert!((stats.std - 1.5811388300841898).abs() < 1e-10);
        assert!((stats.min - 1.0).abs() < 1e-10);
        assert!((stats.max - 5.0).abs() < 1e-10);
        assert!((stats.median - 3.0).abs() < 1e-10);
        assert!((stats.q1 - 2.0).abs() < 1e-10);
        assert!((stats.q3 - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_describe_interpolates() {
        let stats = describe_impl(&[30.0, 10.0, 20.0]);
        assert_eq!(stats.q1, 15.0);
        assert_eq!(stats.median, 20.0);
        assert_eq!(stats.q3, 25.0);
        assert_eq!(stats.std, 10.0);

        let even = describe_impl(&[1.0, 2.0, 3.0, 4.0]);
        assert!((even.q1 - 1.75).abs() < 1e-12);
        assert!((even.median - 2.5).abs() < 1e-12);
        assert!((even.q3 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_describe_degenerate() {
        assert_eq!(describe_impl(&[]), DescriptiveStats::default());

        let single = describe_impl(&[7.0]);
        assert_eq!(single.std, 0.0);
        assert_eq!((single.min, single.q1, single.median, single.q3, single.max), (7.0, 7.0, 7.0, 7.0, 7.0));

        let with_nan = describe_impl(&[1.0, f64::NAN, 3.0, f64::INFINITY]);
        assert_eq!(with_nan.count, 2);
        assert_eq!(with_nan.mean, 2.0);
    }

    #[test]
    fn test_constant_values_have_no_spread() {
        // 0.1 is not exactly representable, so a naive mean drifts
        for n in [3, 10] {
            let data = vec![0.1; n];
            let stats = describe_impl(&data);
            assert_eq!(stats.mean, 0.1);
            assert_eq!(stats.std, 0.0);
            assert_eq!(sample_std(&data, mean(&data)), 0.0);
            assert_eq!(skewness_impl(&data), 0.0);
        }
    }

    #[test]
    fn test_skewness() {
        assert_eq!(skewness_impl(&[1.0, 2.0]), 0.0);
        assert_eq!(skewness_impl(&[5.0; 10]), 0.0);
        assert!(skewness_impl(&[1.0, 2.0, 3.0]).abs() < 1e-12);
        // 1, 2, 3, 10: strongly right-skewed
        let skew = skewness_impl(&[1.0, 2.0, 3.0, 10.0]);
        assert!((skew - 1.7636326148).abs() < 1e-6);
        assert!(skewness_impl(&[-10.0, 1.0, 2.0, 3.0]) < 0.0);
    }
}
