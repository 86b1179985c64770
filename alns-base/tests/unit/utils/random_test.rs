use super::*;

#[test]
fn can_return_weights() {
    let random = DefaultRandom::new_repeatable(0);
    let weights = &[100, 50, 20];
    let experiments = 10000_usize;
    let total_sum = weights.iter().sum::<usize>();
    let mut counter = [0_usize; 3];

    (0..experiments).for_each(|_| {
        let idx = random.weighted(weights);
        counter[idx] += 1;
    });

    weights.iter().enumerate().for_each(|(idx, weight)| {
        let actual_ratio = counter[idx] as Float / experiments as Float;
        let expected_ratio = *weight as Float / total_sum as Float;

        assert!((actual_ratio - expected_ratio).abs() < 0.05);
    });
}

#[test]
fn can_repeat_values_with_the_same_seed() {
    let left = DefaultRandom::new_repeatable(42);
    let right = DefaultRandom::new_repeatable(42);

    let left = (0..10).map(|_| left.uniform_int(0, 1000)).collect::<Vec<_>>();
    let right = (0..10).map(|_| right.uniform_int(0, 1000)).collect::<Vec<_>>();

    assert_eq!(left, right);
}

#[test]
fn can_fork_independent_stream() {
    let original = DefaultRandom::new_repeatable(7);
    let forked = original.fork();

    let left = (0..10).map(|_| original.uniform_int(0, 1_000_000)).collect::<Vec<_>>();
    let right = (0..10).map(|_| forked.uniform_int(0, 1_000_000)).collect::<Vec<_>>();

    assert_ne!(left, right);
}

parameterized_test! {can_keep_values_in_range, (min, max), {
    can_keep_values_in_range_impl(min, max);
}}

can_keep_values_in_range! {
    case01_same: (5, 5),
    case02_small: (0, 1),
    case03_negative: (-10, 10),
}

fn can_keep_values_in_range_impl(min: i32, max: i32) {
    let random = DefaultRandom::new_repeatable(1);

    (0..100).for_each(|_| {
        let value = random.uniform_int(min, max);
        assert!(value >= min && value <= max);
    });
}

#[test]
fn can_shuffle_all_items() {
    let random = DefaultRandom::new_repeatable(3);
    let mut items = (0..20).collect::<Vec<_>>();

    random.shuffle(items.as_mut_slice());
    items.sort();

    assert_eq!(items, (0..20).collect::<Vec<_>>());
}
