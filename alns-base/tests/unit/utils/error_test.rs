use super::*;

#[test]
fn can_join_many_errors() {
    let errors = vec![GenericError::from("first"), GenericError::from("second").context("run 1")];

    assert_eq!(GenericError::join_many(&errors, "; "), "first; run 1: second");
    assert_eq!(GenericError::join_many(&[], "; "), "");
}
