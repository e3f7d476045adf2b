//! Summary statistics over a recording's samples
//!
//! One block per recording, computed once at load time from the raw device
//! samples, plus the same four figures over the max-normalized series.

use serde::Serialize;

use crate::transform::{mean_of, normalize, round3};

/// Summary statistics for one sample sequence, all rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatBlock {
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub stddev: f64,
    pub normalized_mean: f64,
    pub normalized_median: f64,
    pub normalized_mode: f64,
    pub normalized_stddev: f64,
}

/// Compute the statistics block, or `None` for an empty sequence.
pub fn compute_stats(samples: &[f64]) -> Option<StatBlock> {
    if samples.is_empty() {
        return None;
    }
    let max = samples.iter().cloned().fold(f64::MIN, f64::max);
    let normalized = normalize(samples, max);

    Some(StatBlock {
        mean: round3(mean_of(samples)),
        median: round3(median_of(samples)),
        mode: round3(mode_of(samples)),
        stddev: round3(stddev_of(samples)),
        normalized_mean: round3(mean_of(&normalized)),
        normalized_median: round3(median_of(&normalized)),
        normalized_mode: round3(mode_of(&normalized)),
        normalized_stddev: round3(stddev_of(&normalized)),
    })
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties break toward the earliest first occurrence.
fn mode_of(values: &[f64]) -> f64 {
    use std::collections::HashMap;

    let mut counts: HashMap<u64, (usize, usize)> = HashMap::new();
    for (index, v) in values.iter().enumerate() {
        let entry = counts.entry(v.to_bits()).or_insert((0, index));
        entry.0 += 1;
    }
    let mut best: Option<(u64, usize, usize)> = None;
    for (&bits, &(count, first)) in &counts {
        let wins = match best {
            None => true,
            Some((_, best_count, best_first)) => {
                count > best_count || (count == best_count && first < best_first)
            }
        };
        if wins {
            best = Some((bits, count, first));
        }
    }
    best.map(|(bits, _, _)| f64::from_bits(bits)).unwrap_or(0.0)
}

/// Population standard deviation.
fn stddev_of(values: &[f64]) -> f64 {
    let mean = mean_of(values);
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_has_no_stats() {
        assert!(compute_stats(&[]).is_none());
    }

    #[test]
    fn basic_block() {
        let stats = compute_stats(&[1.0, 2.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.median, 2.0);
        assert_eq!(stats.mode, 2.0);
        // population stddev of [1,2,2,3] = sqrt(0.5)
        assert_eq!(stats.stddev, 0.707);
        // normalized by max 3
        assert_eq!(stats.normalized_mode, 0.667);
    }

    #[test]
    fn median_even_length_averages_middles() {
        let stats = compute_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn mode_tie_takes_first_seen() {
        let stats = compute_stats(&[5.0, 7.0, 7.0, 5.0, 1.0]).unwrap();
        assert_eq!(stats.mode, 5.0);
    }

    #[test]
    fn all_zero_samples() {
        // max is 0, so the normalized series equals the raw series
        let stats = compute_stats(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.normalized_mean, 0.0);
        assert_eq!(stats.stddev, 0.0);
    }
}
