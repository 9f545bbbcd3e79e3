// Heuristic 0-100 quality scores

use crate::model::ColumnProfile;

/// Largest deduction for missing values, in points.
const MAX_NULL_PENALTY: f64 = 30.0;
const CONSTANT_PENALTY: f64 = 10.0;
const UNIQUE_BONUS: f64 = 5.0;
/// Deduction when every row is a duplicate.
const DUPLICATE_PENALTY: f64 = 10.0;

pub fn column_score(profile: &ColumnProfile) -> f64 {
    let mut score = 100.0 - profile.null_percentage.min(MAX_NULL_PENALTY);
    if profile.is_constant && profile.total_count > 1 {
        score -= CONSTANT_PENALTY;
    }
    if profile.is_unique && profile.null_count == 0 {
        score += UNIQUE_BONUS;
    }
    score.clamp(0.0, 100.0)
}

/// Mean of the column scores less the duplicate-row penalty. Columns that
/// failed to profile are left out; no scored columns gives 0.
pub fn overall_score(columns: &[ColumnProfile], duplicate_rows: usize, total_rows: usize) -> f64 {
    let scores: Vec<f64> = columns.iter().filter(|c| c.is_ok()).map(|c| c.quality_score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let duplicate_ratio = if total_rows == 0 {
        0.0
    } else {
        duplicate_rows as f64 / total_rows as f64
    };
    (mean - duplicate_ratio * DUPLICATE_PENALTY).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdrecon_table::DType;

    fn profile(total: usize, nulls: usize, unique: usize) -> ColumnProfile {
        let non_null = total - nulls;
        let mut p = ColumnProfile::failed("c", "");
        p.error = None;
        p.dtype = DType::Integer;
        p.total_count = total;
        p.null_count = nulls;
        p.null_percentage = if total == 0 { 0.0 } else { nulls as f64 / total as f64 * 100.0 };
        p.unique_count = unique;
        p.is_unique = non_null > 0 && unique == non_null;
        p.is_constant = unique == 1;
        p
    }

    #[test]
    fn unique_complete_column_is_capped_at_100() {
        assert_eq!(column_score(&profile(10, 0, 10)), 100.0);
    }

    #[test]
    fn null_penalty_is_capped() {
        // 50% nulls costs at most 30 points
        assert_eq!(column_score(&profile(10, 5, 2)), 70.0);
        assert_eq!(column_score(&profile(10, 1, 3)), 90.0);
    }

    #[test]
    fn constant_column_penalty() {
        assert_eq!(column_score(&profile(4, 0, 1)), 90.0);
        // a single row is not penalised as constant, and is unique
        assert_eq!(column_score(&profile(1, 0, 1)), 100.0);
    }

    #[test]
    fn overall_applies_duplicate_penalty_and_skips_failures() {
        let mut a = profile(10, 0, 10);
        a.quality_score = 100.0;
        let mut b = profile(10, 5, 2);
        b.quality_score = 70.0;
        let failed = ColumnProfile::failed("x", "column 'x' not found");

        let overall = overall_score(&[a, b, failed], 2, 10);
        assert!((overall - 83.0).abs() < 1e-9);
        assert_eq!(overall_score(&[], 0, 0), 0.0);
    }
}
