use super::*;
use crate::utils::DefaultRandom;

#[test]
fn can_sample_proportionally_to_weights() {
    let random = DefaultRandom::new_repeatable(0);
    let sampler = AliasSampler::new(vec![1., 0., 3.]).unwrap();
    let mut counter = [0_usize; 3];

    (0..10000).for_each(|_| counter[sampler.sample(&random)] += 1);

    assert_eq!(counter[1], 0);
    let ratio = counter[2] as Float / counter[0] as Float;
    assert!((ratio - 3.).abs() < 0.3, "unexpected ratio: {ratio}");
}

#[test]
fn can_reject_invalid_weights() {
    assert!(AliasSampler::new(vec![]).is_err());
    assert!(AliasSampler::new(vec![0., 0.]).is_err());
    assert!(AliasSampler::new(vec![1., -1.]).is_err());
}
