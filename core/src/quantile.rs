//! Quantile binning used by RFM scoring.
//!
//! Edges are the 0/20/40/60/80/100th percentiles with linear interpolation
//! between closest ranks. Bins are right-closed and the first bin includes
//! its lower edge. When edges repeat, a value falls into the first of the
//! repeated bins, so collapsed levels never occur in the output.

/// Number of bins (and score levels) per dimension.
pub const QUINTILES: usize = 5;

/// Score given to every customer on a dimension that cannot be binned.
pub const NEUTRAL_SCORE: u8 = 3;

/// Outcome of binning one dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Binning {
    /// One bin index in `1..=5` per input value, same order as the input.
    Binned(Vec<u8>),
    /// Fewer than two distinct values.
    InsufficientData,
}

impl Binning {
    /// Bin indices, or the neutral score for every value.
    pub fn or_neutral(self, len: usize) -> Vec<u8> {
        match self {
            Binning::Binned(bins) => bins,
            Binning::InsufficientData => vec![NEUTRAL_SCORE; len],
        }
    }
}

/// Bin `values` into quintiles.
pub fn quintile_bins(values: &[f64]) -> Binning {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    if distinct_count(&sorted) < 2 {
        return Binning::InsufficientData;
    }

    let edges = quintile_edges(&sorted);
    let bins = values.iter().map(|v| bin_of(*v, &edges)).collect();
    Binning::Binned(bins)
}

/// Positions `1..=n` ordered by value. Equal values keep their input order,
/// so the ranks are always distinct.
pub fn rank_first(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    let mut ranks = vec![0.0; values.len()];
    for (position, idx) in order.into_iter().enumerate() {
        ranks[idx] = (position + 1) as f64;
    }
    ranks
}

fn quintile_edges(sorted: &[f64]) -> [f64; QUINTILES + 1] {
    let mut edges = [0.0; QUINTILES + 1];
    for (i, edge) in edges.iter_mut().enumerate() {
        *edge = percentile(sorted, i as f64 / QUINTILES as f64);
    }
    edges
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn bin_of(value: f64, edges: &[f64; QUINTILES + 1]) -> u8 {
    (1..=QUINTILES)
        .find(|&i| value <= edges[i])
        .unwrap_or(QUINTILES) as u8
}

fn distinct_count(sorted: &[f64]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    1 + sorted.windows(2).filter(|w| w[0] != w[1]).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_distinct_values_fill_every_bin_twice() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let Binning::Binned(bins) = quintile_bins(&values) else {
            panic!("expected bins");
        };
        assert_eq!(bins, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn repeated_edges_collapse_levels() {
        // Edges: [0, 0, 0, 0, 3.8, 10]; the first three upper edges repeat.
        let values = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 7.0, 10.0];
        let Binning::Binned(bins) = quintile_bins(&values) else {
            panic!("expected bins");
        };
        assert_eq!(bins, vec![1, 1, 1, 1, 1, 1, 1, 4, 5, 5]);
        assert!(!bins.contains(&2) && !bins.contains(&3));
    }

    #[test]
    fn single_value_is_insufficient() {
        assert_eq!(quintile_bins(&[4.0, 4.0, 4.0]), Binning::InsufficientData);
        assert_eq!(quintile_bins(&[]), Binning::InsufficientData);
        assert_eq!(
            quintile_bins(&[4.0]).or_neutral(1),
            vec![NEUTRAL_SCORE]
        );
    }

    #[test]
    fn two_values_split_low_and_high() {
        let Binning::Binned(bins) = quintile_bins(&[1.0, 2.0]) else {
            panic!("expected bins");
        };
        assert_eq!(bins, vec![1, 5]);
    }

    #[test]
    fn rank_first_breaks_ties_by_position() {
        assert_eq!(rank_first(&[3.0, 1.0, 3.0, 2.0]), vec![3.0, 1.0, 4.0, 2.0]);
    }
}
