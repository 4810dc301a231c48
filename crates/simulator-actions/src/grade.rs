//! Partial-update policy: how many fields an update touches.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default share of fields an update overwrites.
pub const DEFAULT_PERCENT: u32 = 10;

/// Editing grade of an update action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditingGrade {
    /// Percentage of the document's fields, at least one.
    Percent(u32),
    /// Absolute number of fields, capped at the field count.
    Count(usize),
}

impl Default for EditingGrade {
    fn default() -> Self {
        EditingGrade::Percent(DEFAULT_PERCENT)
    }
}

impl EditingGrade {
    /// Number of fields to overwrite in a document with `field_count`
    /// updatable (non-identifier) fields.
    ///
    /// Never exceeds `field_count`, so a document without updatable fields
    /// always yields zero.
    pub fn fields_to_update(&self, field_count: usize) -> usize {
        match *self {
            EditingGrade::Percent(percent) => {
                let share = field_count.saturating_mul(percent as usize) / 100;
                share.max(1).min(field_count)
            }
            EditingGrade::Count(count) => count.min(field_count),
        }
    }
}

impl std::fmt::Display for EditingGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditingGrade::Percent(p) => write!(f, "{p}%"),
            EditingGrade::Count(c) => write!(f, "{c} fields"),
        }
    }
}

/// Draw `count` names from `fields` without replacement, in arbitrary order.
pub fn select_fields<R: Rng + ?Sized>(rng: &mut R, fields: &[String], count: usize) -> Vec<String> {
    let count = count.min(fields.len());
    index::sample(rng, fields.len(), count)
        .into_iter()
        .map(|i| fields[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_percent_rounds_down_with_minimum_one() {
        let grade = EditingGrade::Percent(10);
        assert_eq!(grade.fields_to_update(10), 1);
        assert_eq!(grade.fields_to_update(5), 1);
        assert_eq!(grade.fields_to_update(25), 2);
        assert_eq!(grade.fields_to_update(0), 0);
    }

    #[test]
    fn test_percent_never_exceeds_field_count() {
        assert_eq!(EditingGrade::Percent(100).fields_to_update(4), 4);
        assert_eq!(EditingGrade::Percent(250).fields_to_update(4), 4);
    }

    #[test]
    fn test_count_is_capped() {
        assert_eq!(EditingGrade::Count(3).fields_to_update(10), 3);
        assert_eq!(EditingGrade::Count(30).fields_to_update(10), 10);
        assert_eq!(EditingGrade::Count(0).fields_to_update(10), 0);
    }

    #[test]
    fn test_default_is_ten_percent() {
        assert_eq!(EditingGrade::default(), EditingGrade::Percent(10));
    }

    #[test]
    fn test_select_fields_without_replacement() {
        let fields: Vec<String> = (0..6).map(|i| format!("f{i}")).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut selected = select_fields(&mut rng, &fields, 4);
        assert_eq!(selected.len(), 4);
        selected.sort();
        selected.dedup();
        assert_eq!(selected.len(), 4);
        assert!(selected.iter().all(|f| fields.contains(f)));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&EditingGrade::Percent(25)).unwrap();
        assert_eq!(json, r#"{"percent":25}"#);
        let grade: EditingGrade = serde_json::from_str(r#"{"count":3}"#).unwrap();
        assert_eq!(grade, EditingGrade::Count(3));
    }
}
