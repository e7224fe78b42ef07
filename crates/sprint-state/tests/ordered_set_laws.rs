use proptest::prelude::*;
use sprint_state::OrderedSet;

fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]", 0..8)
}

proptest! {
    #[test]
    fn prop_no_duplicates(values in names()) {
        let set: OrderedSet<String> = values.iter().cloned().collect();
        let mut seen = std::collections::HashSet::new();
        for value in &set {
            prop_assert!(seen.insert(value.clone()));
        }
    }

    #[test]
    fn prop_order_follows_first_occurrence(values in names()) {
        let set: OrderedSet<String> = values.iter().cloned().collect();
        let mut expected: Vec<String> = Vec::new();
        for value in values {
            if !expected.contains(&value) {
                expected.push(value);
            }
        }
        prop_assert_eq!(set.to_vec(), expected);
    }

    #[test]
    fn prop_subtract_and_intersect_partition(left in names(), right in names()) {
        let left: OrderedSet<String> = left.into_iter().collect();
        let right: OrderedSet<String> = right.into_iter().collect();

        let kept = left.intersect(&right);
        let dropped = left.subtract(&right);

        prop_assert_eq!(kept.len() + dropped.len(), left.len());
        prop_assert!(kept.is_subset(&left));
        prop_assert!(dropped.intersect(&right).is_empty());
        prop_assert!(kept.union(&dropped).same_members(&left));
    }

    #[test]
    fn prop_union_keeps_left_prefix(left in names(), right in names()) {
        let left: OrderedSet<String> = left.into_iter().collect();
        let right: OrderedSet<String> = right.into_iter().collect();

        let union = left.union(&right);
        prop_assert_eq!(&union.to_vec()[..left.len()], &left.to_vec()[..]);
        prop_assert!(right.is_subset(&union));
    }
}
