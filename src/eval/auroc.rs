//! Area under the ROC curve via the Mann-Whitney U statistic

use std::cmp::Ordering;

/// AUROC of `scores` against binary `targets` (1 = positive).
///
/// Tied scores share their average rank, so a tie between a positive and a
/// negative counts one half. Returns `None` when the targets hold a single
/// class, where the curve is undefined.
pub fn auroc(scores: &[f32], targets: &[f32]) -> Option<f32> {
    assert_eq!(scores.len(), targets.len(), "Scores and targets must have same length");

    let n_pos = targets.iter().filter(|&&t| t == 1.0).count();
    let n_neg = targets.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let ranks = average_ranks(scores);
    let pos_rank_sum: f64 = ranks
        .iter()
        .zip(targets)
        .filter(|(_, &t)| t == 1.0)
        .map(|(&r, _)| r)
        .sum();

    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    Some((u / (n_pos * n_neg as f64)) as f32)
}

/// 1-based ranks with ties averaged
fn average_ranks(values: &[f32]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len()
            && values[order[end]].total_cmp(&values[order[start]]) == Ordering::Equal
        {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}
