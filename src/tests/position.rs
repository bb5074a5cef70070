use super::{
    normalized, Placement, PositionAlgebra, PositionScheme, FIRST_POSITION, PROVISIONAL_POSITION,
    STRICT_NORMALIZATION_GAP,
};

fn standard() -> PositionAlgebra {
    PositionAlgebra::default()
}

#[test]
fn test_first_item_in_empty_group() {
    assert_eq!(standard().first().position, FIRST_POSITION);
    assert_eq!(standard().first().position, 5);

    let provisional = PositionAlgebra::new(PositionScheme::Provisional, 2);
    assert_eq!(provisional.first().position, PROVISIONAL_POSITION);
}

#[test]
fn test_append_after_last() {
    let placement = standard().append_after(25);
    assert_eq!(placement.position, 35);
    assert!(!placement.needs_normalization);
}

#[test]
fn test_insert_between_ten_and_twenty() {
    assert_eq!(
        standard().between(10, 20),
        Placement {
            position: 15,
            needs_normalization: false
        }
    );
}

#[test]
fn test_insert_between_wide_gap_takes_midpoint() {
    assert_eq!(standard().between(10, 50).position, 30);
    assert_eq!(standard().between(10, 31).position, 20);
}

#[test]
fn test_insert_between_narrow_gap_falls_back() {
    let placement = standard().between(10, 12);
    assert_eq!(placement.position, 11);
    assert!(placement.needs_normalization);

    assert_eq!(standard().between(10, 18).position, 15);
    assert_eq!(standard().between(10, 14).position, 12);
}

#[test]
fn test_insert_between_exhausted_gap_flags_normalization() {
    let adjacent = standard().between(10, 11);
    assert!(adjacent.needs_normalization);

    let duplicate = standard().between(10, 10);
    assert!(duplicate.needs_normalization);
}

#[test]
fn test_insert_between_accepts_reversed_neighbours() {
    assert_eq!(standard().between(20, 10).position, 15);
}

#[test]
fn test_insert_between_negative_positions() {
    assert_eq!(standard().between(-41, -20).position, -31);
    assert_eq!(standard().between(-20, -10).position, -15);
}

#[test]
fn test_before_first_standard_scheme() {
    assert_eq!(standard().before_first(35).position, 25);
    assert_eq!(standard().before_first(12).position, 5);

    let tight = standard().before_first(6);
    assert_eq!(tight.position, 5);
    assert!(tight.needs_normalization);
}

#[test]
fn test_before_first_without_room_leaves_convention() {
    let placement = standard().before_first(5);
    assert!(placement.position < 5);
    assert!(placement.needs_normalization);

    let after_normalization = standard().before_first(0);
    assert!(after_normalization.position < 0);
}

#[test]
fn test_before_first_provisional_goes_negative() {
    let provisional = PositionAlgebra::new(PositionScheme::Provisional, 2);
    let placement = provisional.before_first(-1);
    assert_eq!(placement.position, -11);
    assert!(!placement.needs_normalization);
}

#[test]
fn test_strict_scheme_flags_small_gaps() {
    let strict = PositionAlgebra::new(PositionScheme::Standard, STRICT_NORMALIZATION_GAP);
    assert!(strict.between(10, 20).needs_normalization);
    assert!(!strict.between(10, 40).needs_normalization);
}

#[test]
fn test_for_slot_dispatch() {
    let algebra = standard();
    assert_eq!(algebra.for_slot(None, None).position, 5);
    assert_eq!(algebra.for_slot(Some(15), None).position, 25);
    assert_eq!(algebra.for_slot(None, Some(25)).position, 15);
    assert_eq!(algebra.for_slot(Some(10), Some(20)).position, 15);
}

#[test]
fn test_normalized_spacing() {
    assert_eq!(normalized(0), Vec::<i64>::new());
    assert_eq!(normalized(4), vec![0, 10, 20, 30]);
}
