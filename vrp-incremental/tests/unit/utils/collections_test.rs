use super::*;
use crate::utils::DefaultRandom;

#[test]
fn can_add_and_remove_indices() {
    let mut set = IndexSet::default();

    assert!(set.add(3));
    assert!(set.add(7));
    assert!(set.add(1));
    assert!(!set.add(7));
    assert_eq!(set.len(), 3);

    assert!(set.remove(3));
    assert!(!set.remove(3));
    assert!(!set.contains(3));
    assert!(set.contains(7));
    assert!(set.contains(1));
    assert_eq!(set.len(), 2);

    assert!(set.remove(1));
    assert!(set.remove(7));
    assert!(set.is_empty());
}

#[test]
fn can_keep_positions_consistent_after_swap_remove() {
    let mut set = IndexSet::default();
    (0..10).for_each(|idx| {
        set.add(idx);
    });

    set.remove(0);
    set.remove(5);

    let mut items = set.as_slice().to_vec();
    items.sort();
    assert_eq!(items, vec![1, 2, 3, 4, 6, 7, 8, 9]);
    assert!(items.iter().all(|&idx| set.contains(idx)));
    assert!(set.remove(9));
    assert!(set.remove(1));
    assert_eq!(set.len(), 6);
}

#[test]
fn can_pick_random_elements() {
    let random = DefaultRandom::new_repeatable(0);
    let mut set = IndexSet::default();
    assert_eq!(set.random_element(&random), None);

    (10..20).for_each(|idx| {
        set.add(idx);
    });

    let element = set.random_element(&random).expect("non empty set");
    assert!(set.contains(element));

    let mut elements = set.random_elements(&random, 4);
    assert_eq!(elements.len(), 4);
    elements.sort();
    elements.dedup();
    assert_eq!(elements.len(), 4);

    assert_eq!(set.random_elements(&random, 100).len(), 10);
}
