// Summary statistics over one column's non-null values

use std::collections::HashMap;

use crate::model::{NumericStats, StringStats, ValueCount};

pub fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = values.iter().sum();
    let mean = sum / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let std_dev = (values.len() >= 2).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    });

    Some(NumericStats { min, max, mean, median, std_dev, sum })
}

pub fn string_stats<'a>(values: impl Iterator<Item = &'a str>) -> Option<StringStats> {
    let mut count = 0usize;
    let mut total = 0usize;
    let mut min_length = usize::MAX;
    let mut max_length = 0usize;
    for s in values {
        let len = s.chars().count();
        count += 1;
        total += len;
        min_length = min_length.min(len);
        max_length = max_length.max(len);
    }
    (count > 0).then(|| StringStats {
        min_length,
        max_length,
        avg_length: total as f64 / count as f64,
    })
}

/// Most frequent values, by count descending then first appearance.
pub fn top_values<'a>(values: impl Iterator<Item = &'a str>, total_rows: usize, top_n: usize) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, v) in values.enumerate() {
        counts.entry(v).or_insert((0, i)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts.into_iter().map(|(v, (c, first))| (v, c, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(value, count, _)| ValueCount {
            value: value.to_string(),
            count,
            percentage: percent(count, total_rows),
        })
        .collect()
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
