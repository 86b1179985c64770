use super::*;

#[test]
fn can_share_static_hints() {
    let (first, second) = (no_positions_hint(), no_positions_hint());

    assert!(matches!(first, Cow::Borrowed(_)));
    assert!(matches!((&first, &second), (Cow::Borrowed(left), Cow::Borrowed(right)) if std::ptr::eq(*left, *right)));
    assert_eq!(first.as_ref(), &StopPositionsHint::default());
    assert!(!first.skip_vehicle);

    let skip = skip_vehicle_hint();
    assert!(matches!(skip, Cow::Borrowed(_)));
    assert!(skip.skip_vehicle);
    assert!(skip.next_stops.is_empty());
}

#[test]
fn can_copy_stop_data() {
    let data: Box<dyn StopData> = Box::new(vec![1_usize, 2]);

    let copy = data.copy();

    assert_eq!(copy.as_any().downcast_ref::<Vec<usize>>(), Some(&vec![1, 2]));
}

#[test]
fn can_order_estimation_costs() {
    let mut costs = vec![Cost::LinearVehicle, Cost::Constant, Cost::LinearStop];

    costs.sort();

    assert_eq!(costs, vec![Cost::Constant, Cost::LinearStop, Cost::LinearVehicle]);
}
