// =============================================================================
// Pivot Detection — confirmed local extrema over a symmetric window
// =============================================================================
//
// Index `i` is a pivot low when `series[i]` is STRICTLY below the `left`
// values before it and the `right` values after it.  Pivot highs mirror the
// rule with strictly-above.  Ties disqualify, so flat stretches never pivot.
//
// A pivot is only confirmed once `right` later values exist; the most recent
// `right` bars of a series can therefore never be pivots.
// =============================================================================

use serde::{Deserialize, Serialize};

/// A confirmed local extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub index: usize,
    pub value: f64,
}

/// `true` when `series[i]` is a confirmed pivot low.
///
/// Windows that run off either end of the series, and NaN values anywhere in
/// the window, disqualify the candidate.
pub fn is_pivot_low(series: &[f64], i: usize, left: usize, right: usize) -> bool {
    pivot_with(series, i, left, right, |v, other| v < other)
}

/// `true` when `series[i]` is a confirmed pivot high.
pub fn is_pivot_high(series: &[f64], i: usize, left: usize, right: usize) -> bool {
    pivot_with(series, i, left, right, |v, other| v > other)
}

/// Return `(peaks, troughs)`: every index that is a strict pivot high / low
/// with `order` values on each side.
pub fn find_peaks_troughs(series: &[f64], order: usize) -> (Vec<usize>, Vec<usize>) {
    let mut peaks = Vec::new();
    let mut troughs = Vec::new();

    for i in 0..series.len() {
        if is_pivot_high(series, i, order, order) {
            peaks.push(i);
        } else if is_pivot_low(series, i, order, order) {
            troughs.push(i);
        }
    }

    (peaks, troughs)
}

/// Walk backwards from `from - min_distance` to `from - max_distance` and
/// return the nearest index accepted by `is_pivot`.
pub fn nearest_earlier_pivot(
    series: &[f64],
    from: usize,
    min_distance: usize,
    max_distance: usize,
    is_pivot: impl Fn(&[f64], usize) -> bool,
) -> Option<PivotPoint> {
    (min_distance..=max_distance)
        .filter_map(|k| from.checked_sub(k))
        .find(|&idx| is_pivot(series, idx))
        .map(|index| PivotPoint {
            index,
            value: series[index],
        })
}

fn pivot_with(
    series: &[f64],
    i: usize,
    left: usize,
    right: usize,
    beats: impl Fn(f64, f64) -> bool,
) -> bool {
    let Some(last) = i.checked_add(right) else {
        return false;
    };
    if i < left || last >= series.len() {
        return false;
    }

    let value = series[i];
    if value.is_nan() {
        return false;
    }

    series[i - left..i].iter().all(|&x| beats(value, x))
        && series[i + 1..=last].iter().all(|&x| beats(value, x))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_peak_is_the_only_peak() {
        let data = [10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 18.0, 16.0, 14.0, 12.0, 10.0];
        let (peaks, troughs) = find_peaks_troughs(&data, 2);
        assert_eq!(peaks, vec![5]);
        assert!(troughs.is_empty());
    }

    #[test]
    fn single_trough_is_found() {
        let data = [20.0, 18.0, 16.0, 14.0, 12.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
        let (peaks, troughs) = find_peaks_troughs(&data, 2);
        assert!(peaks.is_empty());
        assert_eq!(troughs, vec![5]);
    }

    #[test]
    fn wave_has_peaks_and_troughs() {
        let data = [50.0, 55.0, 60.0, 55.0, 50.0, 45.0, 50.0, 55.0, 60.0, 55.0, 50.0];
        let (peaks, troughs) = find_peaks_troughs(&data, 2);
        assert_eq!(peaks, vec![2, 8]);
        assert_eq!(troughs, vec![5]);
    }

    #[test]
    fn flat_data_has_no_pivots() {
        let data = vec![50.0; 20];
        let (peaks, troughs) = find_peaks_troughs(&data, 2);
        assert!(peaks.is_empty());
        assert!(troughs.is_empty());
    }

    #[test]
    fn nan_neighbour_disqualifies() {
        let data = [10.0, f64::NAN, 5.0, 8.0, 9.0];
        assert!(!is_pivot_low(&data, 2, 2, 2));
        assert!(!is_pivot_low(&data, 1, 1, 1));
    }

    #[test]
    fn oversized_window_is_not_a_pivot() {
        let data = [3.0, 1.0, 3.0];
        assert!(!is_pivot_low(&data, 1, 1, usize::MAX));
        assert!(!is_pivot_high(&data, 1, usize::MAX, 1));
        assert!(!is_pivot_low(&data, usize::MAX, 1, 1));
    }

    #[test]
    fn ties_disqualify() {
        let data = [3.0, 1.0, 1.0, 3.0, 4.0];
        assert!(!is_pivot_low(&data, 1, 1, 1));
        assert!(!is_pivot_low(&data, 2, 1, 1));
    }

    #[test]
    fn window_off_the_end_is_not_a_pivot() {
        let data = [5.0, 4.0, 3.0, 2.0, 1.0];
        // Index 4 is the minimum but has no confirming bars to its right.
        assert!(!is_pivot_low(&data, 4, 2, 2));
        assert!(!is_pivot_low(&data, 0, 2, 2));
        assert!(!is_pivot_low(&data, 10, 1, 1));
    }

    #[test]
    fn asymmetric_window() {
        let data = [9.0, 8.0, 7.0, 1.0, 2.0];
        assert!(is_pivot_low(&data, 3, 3, 1));
        assert!(!is_pivot_low(&data, 3, 3, 2));
    }

    #[test]
    fn nearest_earlier_pivot_stops_at_first_hit() {
        let mut data = vec![50.0; 30];
        data[10] = 20.0;
        data[18] = 30.0;
        let found =
            nearest_earlier_pivot(&data, 25, 2, 20, |s, i| is_pivot_low(s, i, 2, 2)).unwrap();
        assert_eq!(found.index, 18);
        assert!((found.value - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_earlier_pivot_respects_range() {
        let mut data = vec![50.0; 30];
        data[10] = 20.0;
        assert!(nearest_earlier_pivot(&data, 25, 2, 10, |s, i| is_pivot_low(s, i, 2, 2)).is_none());
    }
}
