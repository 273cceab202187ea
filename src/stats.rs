//! Small statistics helpers used when merging measures: normalization and a
//! pooled-variance effect size. Anything heavier belongs in the downstream
//! statistics tooling, not here.

use crate::records::UserId;
use ahash::AHashMap;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64], m: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Z-score every value of a measure against the measure's own mean and
/// (population) standard deviation.
pub fn zscore(measure: &AHashMap<UserId, f64>) -> AHashMap<UserId, f64> {
    let values: Vec<f64> = measure.values().copied().collect();
    let m = mean(&values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len().max(1) as f64;
    let sd = var.sqrt();
    measure
        .iter()
        .map(|(&uid, &v)| (uid, if sd > 0.0 { (v - m) / sd } else { 0.0 }))
        .collect()
}

/// Scale a measure into [0, 1] by its min/max. Constant measures map to 0.
pub fn min_max_scale(measure: &AHashMap<UserId, f64>) -> AHashMap<UserId, f64> {
    let min = measure.values().copied().fold(f64::INFINITY, f64::min);
    let max = measure.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    measure
        .iter()
        .map(|(&uid, &v)| (uid, if range > 0.0 { (v - min) / range } else { 0.0 }))
        .collect()
}

/// Cohen's d between two measures over the users present in both.
/// NaN when either side has fewer than two shared users.
pub fn cohens_d(a: &AHashMap<UserId, f64>, b: &AHashMap<UserId, f64>) -> f64 {
    let mut d1 = Vec::new();
    let mut d2 = Vec::new();
    for (uid, &va) in a {
        if let Some(&vb) = b.get(uid) {
            d1.push(va);
            d2.push(vb);
        }
    }
    let (n1, n2) = (d1.len(), d2.len());
    if n1 < 2 || n2 < 2 {
        return f64::NAN;
    }
    let (m1, m2) = (mean(&d1), mean(&d2));
    let (s1, s2) = (sample_variance(&d1, m1), sample_variance(&d2, m2));
    let pooled = (((n1 - 1) as f64 * s1 + (n2 - 1) as f64 * s2) / (n1 + n2 - 2) as f64).sqrt();
    (m1 - m2) / pooled
}
