use std::cmp::Ordering;

use crate::models::NormalizedRecord;

/// Picks the single best match among the records of a search
///
/// Ranks by score descending, breaking ties by how close the runtime is to
/// `target_runtime`. The store ordering of `records` is otherwise ignored;
/// fully tied records keep their relative order, so the earliest one wins.
/// Returns `None` for an empty list.
pub fn recommend(records: &[NormalizedRecord], target_runtime: u32) -> Option<&NormalizedRecord> {
    records
        .iter()
        .min_by(|a, b| rank(a, b, target_runtime))
}

/// Confidence bounds reported alongside a recommendation, in percent
pub const MIN_MATCH_CONFIDENCE: u8 = 70;
pub const MAX_MATCH_CONFIDENCE: u8 = 99;

const RUNTIME_PENALTY_PER_MINUTE: f64 = 0.35;

/// How well a record fits the requested runtime, as a percentage
///
/// The 0-10 score is read on a 0-100 scale, less 0.35 points per minute of
/// runtime distance, rounded and bounded to `[70, 99]`.
pub fn match_confidence(record: &NormalizedRecord, target_runtime: u32) -> u8 {
    let base = record.score * 10.0;
    let penalty = f64::from(runtime_distance(record, target_runtime)) * RUNTIME_PENALTY_PER_MINUTE;

    (base - penalty).round().clamp(
        f64::from(MIN_MATCH_CONFIDENCE),
        f64::from(MAX_MATCH_CONFIDENCE),
    ) as u8
}

fn rank(a: &NormalizedRecord, b: &NormalizedRecord, target_runtime: u32) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| runtime_distance(a, target_runtime).cmp(&runtime_distance(b, target_runtime)))
}

fn runtime_distance(record: &NormalizedRecord, target_runtime: u32) -> u32 {
    record.runtime.abs_diff(target_runtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, score: f64, runtime: u32) -> NormalizedRecord {
        NormalizedRecord {
            title: title.to_string(),
            genres: vec![],
            runtime,
            rating: "PG".to_string(),
            score,
            synopsis: String::new(),
            cast: vec![],
            year: None,
            votes: 0,
        }
    }

    #[test]
    fn test_empty_list_has_no_recommendation() {
        assert_eq!(recommend(&[], 100), None);
    }

    #[test]
    fn test_equal_score_prefers_closer_runtime() {
        let records = vec![record("short", 9.0, 90), record("long", 9.0, 150)];
        assert_eq!(recommend(&records, 100).unwrap().title, "short");
    }

    #[test]
    fn test_higher_score_beats_closer_runtime() {
        let records = vec![record("close", 7.0, 100), record("better", 8.5, 200)];
        assert_eq!(recommend(&records, 100).unwrap().title, "better");
    }

    #[test]
    fn test_ignores_incoming_order() {
        let records = vec![
            record("a", 6.0, 100),
            record("b", 9.0, 80),
            record("c", 9.0, 110),
        ];
        assert_eq!(recommend(&records, 100).unwrap().title, "c");
    }

    #[test]
    fn test_full_tie_keeps_first() {
        let records = vec![
            record("first", 8.0, 90),
            record("second", 8.0, 110),
            record("third", 8.0, 90),
        ];
        assert_eq!(recommend(&records, 100).unwrap().title, "first");
    }

    #[test]
    fn test_match_confidence_penalizes_runtime_distance() {
        assert_eq!(match_confidence(&record("exact", 9.0, 100), 100), 90);
        assert_eq!(match_confidence(&record("off by 20", 8.0, 120), 100), 73);
        assert_eq!(match_confidence(&record("off by 33", 8.8, 148), 115), 76);
    }

    #[test]
    fn test_match_confidence_is_bounded() {
        assert_eq!(match_confidence(&record("perfect", 10.0, 100), 100), MAX_MATCH_CONFIDENCE);
        assert_eq!(match_confidence(&record("weak", 5.0, 100), 100), MIN_MATCH_CONFIDENCE);
        assert_eq!(match_confidence(&record("far", 9.0, 400), 100), MIN_MATCH_CONFIDENCE);
        assert_eq!(match_confidence(&record("unknown", 0.0, 0), 100), MIN_MATCH_CONFIDENCE);
    }
}
