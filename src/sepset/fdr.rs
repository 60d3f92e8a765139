//! False-discovery-rate cutoff over a list of p-values.

/// Benjamini-Hochberg step-up cutoff at level `alpha`.
///
/// With p-values sorted ascending as `p(1) <= ... <= p(m)`, returns `p(k)` for the
/// largest `k` with `p(k) <= k / m * alpha`. Hypotheses at or below the cutoff are
/// rejected. When nothing is rejected (or the list is empty) the cutoff is `0.0`.
///
/// The input order does not matter.
pub fn fdr_cutoff(alpha: f64, p_values: &[f64]) -> f64 {
    let mut sorted = p_values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    fdr_cutoff_sorted(alpha, &sorted)
}

/// As `fdr_cutoff`, for input already sorted ascending.
pub fn fdr_cutoff_sorted(alpha: f64, sorted: &[f64]) -> f64 {
    let m = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .filter(|&(i, &p)| p <= (i + 1) as f64 / m * alpha)
        .map(|(_, &p)| p)
        .last()
        .unwrap_or(0.0)
}
