use super::*;
use crate::models::problem::ConstantExpression;

const HOUR: Duration = 3600.;

fn create_expression_with_override() -> TimeDependentExpression {
    let mut expression =
        TimeDependentExpression::new(Arc::new(ConstantExpression::new("default", HOUR))).expect("valid default");
    expression
        .set_expression(8. * HOUR + 30. * MINUTE, 8. * HOUR + 45. * MINUTE, Arc::new(ConstantExpression::new("rush", 30. * MINUTE)))
        .expect("valid interval");

    expression
}

parameterized_test! {can_get_value_at_time, (departure, expected), {
    let expression = create_expression_with_override();

    assert_eq!(expression.value_at_time(departure, None, None, None), expected);
}}

can_get_value_at_time! {
    case_01_at_override_start: (8. * HOUR + 30. * MINUTE, 2700.),
    case_02_at_override_end: (8. * HOUR + 45. * MINUTE, 3600.),
    case_03_long_before: (0., 3600.),
    case_04_crosses_override: (8. * HOUR + 20. * MINUTE, 2700.),
    case_05_inside_override: (8. * HOUR + 40. * MINUTE, 3300.),
    case_06_far_after: (5. * DAY, 3600.),
}

#[test]
fn can_get_expression_at_time() {
    let expression = create_expression_with_override();

    assert_eq!(expression.expression_at_time(8. * HOUR + 35. * MINUTE).name(), "rush");
    assert_eq!(expression.expression_at_time(8. * HOUR + 45. * MINUTE).name(), "default");
    assert_eq!(expression.expression_at_time(HOUR).name(), "default");
    assert_eq!(expression.name(), "time dependent default");
    assert!(expression.is_dependent_on_time());
    assert_eq!(expression.expressions().len(), 1);
}

#[test]
fn can_use_default_without_overrides() {
    let expression =
        TimeDependentExpression::new(Arc::new(ConstantExpression::new("default", 10.))).expect("valid default");

    assert!(!expression.is_dependent_on_time());
    assert_eq!(expression.value(None, None, None), 10.);
    assert_eq!(expression.value_at_time(123., None, None, None), 10.);
}

#[test]
#[should_panic]
fn can_panic_when_evaluated_without_time() {
    let expression = create_expression_with_override();

    expression.value(None, None, None);
}

#[test]
fn can_reuse_expression_in_several_intervals() {
    let mut expression =
        TimeDependentExpression::new(Arc::new(ConstantExpression::new("default", HOUR))).expect("valid default");
    let rush: Arc<dyn Expression> = Arc::new(ConstantExpression::new("rush", 2. * HOUR));

    expression.set_expression(7. * HOUR, 9. * HOUR, rush.clone()).expect("valid interval");
    expression.set_expression(16. * HOUR, 18. * HOUR, rush).expect("valid interval");

    assert_eq!(expression.expressions().len(), 1);
    assert_eq!(expression.value_at_time(16. * HOUR, None, None, None), 2. * HOUR);
    assert_eq!(expression.value_at_time(17. * HOUR, None, None, None), 1.5 * HOUR);
    assert_eq!(expression.value_at_time(12. * HOUR, None, None, None), HOUR);
}

parameterized_test! {can_reject_invalid_interval, (start, end, value), {
    let mut expression = create_expression_with_override();

    let result = expression.set_expression(start, end, Arc::new(ConstantExpression::new("other", value)));

    assert!(result.is_err());
}}

can_reject_invalid_interval! {
    case_01_before_epoch: (-MINUTE, MINUTE, 1.),
    case_02_start_after_end: (2. * HOUR, HOUR, 1.),
    case_03_not_aligned: (HOUR + 1., 2. * HOUR, 1.),
    case_04_negative: (HOUR, 2. * HOUR, -1.),
    case_05_overlap: (8. * HOUR, 8. * HOUR + 31. * MINUTE, 1.),
    case_06_long_horizon: (9. * HOUR, 8. * DAY, 1.),
}

#[test]
fn can_reject_negative_default() {
    assert!(TimeDependentExpression::new(Arc::new(ConstantExpression::new("default", -1.))).is_err());
}
