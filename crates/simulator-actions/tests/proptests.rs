//! Property-based tests for the partial-update policy.

use bson::{doc, Bson, Document};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simulator_actions::{select_fields, Action, DocumentActions, EditingGrade, MemoryStore};
use std::collections::HashSet;

fn document(fields: usize, tag: &str) -> Document {
    let mut document = doc! {};
    for i in 0..fields {
        document.insert(format!("field_{i}"), Bson::String(format!("{tag}_{i}")));
    }
    document
}

fn arb_grade() -> impl Strategy<Value = EditingGrade> {
    prop_oneof![
        (1u32..=100).prop_map(EditingGrade::Percent),
        (0usize..40).prop_map(EditingGrade::Count),
    ]
}

proptest! {
    /// The update count never exceeds the number of updatable fields.
    #[test]
    fn prop_count_bounded_by_fields(grade in arb_grade(), fields in 0usize..200) {
        prop_assert!(grade.fields_to_update(fields) <= fields);
    }

    /// Percent mode touches at least one field whenever there is one.
    #[test]
    fn prop_percent_touches_at_least_one(percent in 1u32..=100, fields in 1usize..200) {
        let count = EditingGrade::Percent(percent).fields_to_update(fields);
        prop_assert!(count >= 1);
        prop_assert_eq!(count, (fields * percent as usize / 100).max(1));
    }

    /// Count mode is the requested count capped at the field count.
    #[test]
    fn prop_count_mode_is_min(count in 0usize..50, fields in 0usize..50) {
        prop_assert_eq!(EditingGrade::Count(count).fields_to_update(fields), count.min(fields));
    }

    /// Selection draws distinct names from the given fields.
    #[test]
    fn prop_selection_is_distinct_subset(seed in any::<u64>(), fields in 0usize..30, count in 0usize..40) {
        let names: Vec<String> = (0..fields).map(|i| format!("field_{i}")).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let selected = select_fields(&mut rng, &names, count);

        prop_assert_eq!(selected.len(), count.min(fields));
        let unique: HashSet<_> = selected.iter().collect();
        prop_assert_eq!(unique.len(), selected.len());
        prop_assert!(selected.iter().all(|f| names.contains(f)));
    }

    /// An update against a stored document touches exactly the policy's
    /// count, keeps the identifier and releases its connection.
    #[test]
    fn prop_update_applies_policy(grade in arb_grade(), fields in 0usize..25) {
        let store = MemoryStore::new();
        let id = store.insert("propdb", "Things", document(fields, "old"));
        let actions = DocumentActions::new(&store, "memory://prop", "propdb", "Things", document(fields, "new"));

        let outcome = tokio_test::block_on(actions.perform(Action::Update, grade)).unwrap();

        prop_assert_eq!(outcome.fields_updated, grade.fields_to_update(fields));
        prop_assert!(!outcome.created_target);
        prop_assert_eq!(&outcome.id, &id);
        let stored = store.get("propdb", "Things", &id).unwrap();
        let rewritten = stored
            .iter()
            .filter(|(_, value)| matches!(value, Bson::String(s) if s.starts_with("new_")))
            .count();
        prop_assert_eq!(rewritten, outcome.fields_updated);
        prop_assert_eq!(store.count("propdb", "Things"), 1);
        prop_assert_eq!(store.open_connections(), 0);
    }
}
