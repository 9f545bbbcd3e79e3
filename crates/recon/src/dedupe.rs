// Grouping of near-duplicate values within a single list

use std::time::Instant;

use mdrecon_table::Table;

use crate::matcher::{column_text, FuzzyMatcher};
use crate::model::{DedupeGroup, DedupeMember, DedupeResult, DedupeTotals, KeepPolicy, Side};

impl FuzzyMatcher {
    /// Group values whose similarity to a group master reaches the threshold.
    ///
    /// Values are visited in order. The first unassigned value opens a group
    /// and collects every later unassigned value close enough to it. Groups
    /// are not transitive: a member is never compared with other members.
    pub fn deduplicate<S: AsRef<str>>(&self, values: &[S], keep: KeepPolicy) -> DedupeResult {
        let started = Instant::now();
        let threshold = self.config().threshold;

        let normalized: Vec<String> = values.iter().map(|v| self.normalize(v.as_ref())).collect();
        let mut assigned = vec![false; values.len()];
        let mut groups = Vec::new();
        let mut skipped = 0usize;

        for i in 0..values.len() {
            if assigned[i] {
                continue;
            }
            if normalized[i].is_empty() {
                skipped += 1;
                continue;
            }
            assigned[i] = true;

            let mut members = Vec::new();
            for j in i + 1..values.len() {
                if assigned[j] || normalized[j].is_empty() {
                    continue;
                }
                let score = self.score_normalized(&normalized[i], &normalized[j]);
                if score >= threshold {
                    assigned[j] = true;
                    members.push(DedupeMember { index: j, value: values[j].as_ref().to_string(), score });
                }
            }
            if members.is_empty() {
                continue;
            }

            let keep_index = keep_index(i, &members, keep);
            groups.push(DedupeGroup {
                master_index: i,
                master_value: values[i].as_ref().to_string(),
                members,
                keep_index,
                keep_value: values[keep_index].as_ref().to_string(),
            });
        }

        let duplicate_records: usize = groups.iter().map(|g| g.members.len()).sum();
        let totals = DedupeTotals {
            total: values.len(),
            unique: values.len() - duplicate_records,
            duplicate_groups: groups.len(),
            duplicate_records,
        };

        let mut warnings = Vec::new();
        if skipped > 0 {
            warnings.push(format!("{skipped} empty value(s) left ungrouped"));
        }

        let elapsed = started.elapsed().as_millis() as u64;
        log::info!(
            "dedupe ({}, threshold {threshold}): {} group(s), {} duplicate(s) among {} values in {elapsed}ms",
            self.config().method,
            totals.duplicate_groups,
            totals.duplicate_records,
            totals.total
        );

        DedupeResult {
            success: true,
            method: self.config().method,
            threshold,
            keep,
            totals,
            groups,
            warnings,
            errors: Vec::new(),
            dedupe_time_ms: elapsed,
        }
    }

    /// Group near-duplicate cells of one column, by their text form.
    pub fn deduplicate_column(&self, table: &Table, column: &str, keep: KeepPolicy) -> DedupeResult {
        match column_text(table, Side::Source, column) {
            Ok(values) => self.deduplicate(&values, keep),
            Err(e) => {
                log::warn!("dedupe failed: {e}");
                DedupeResult::failed(self.config().method, self.config().threshold, keep, e)
            }
        }
    }
}

fn keep_index(master: usize, members: &[DedupeMember], keep: KeepPolicy) -> usize {
    match keep {
        KeepPolicy::First => master,
        KeepPolicy::Last => members.iter().map(|m| m.index).max().unwrap_or(master),
        KeepPolicy::Best => {
            // Master scores 100 against itself; ties go to the lowest index.
            let mut best = (master, 100.0);
            for m in members {
                if m.score > best.1 || (m.score == best.1 && m.index < best.0) {
                    best = (m.index, m.score);
                }
            }
            best.0
        }
    }
}
