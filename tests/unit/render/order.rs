use super::*;

#[test]
fn float_to_fixed_is_monotonic_for_mixed_signs() {
    let values = [-1.0e6f32, -100.5, -3.0, -1.0, -0.25, 0.0, 0.25, 1.0, 3.0, 100.5, 1.0e6];
    for bits in [15u32, 16, 24, 31, 32] {
        for w in values.windows(2) {
            let a = float_to_fixed(w[0], bits);
            let b = float_to_fixed(w[1], bits);
            assert!(a < b, "{} !< {} at {bits} bits ({a} vs {b})", w[0], w[1]);
        }
    }
}

#[test]
fn float_to_fixed_fits_width() {
    for bits in [15u32, 24, 32] {
        for v in [f32::MAX, f32::MIN, 0.0, -0.0, 1.5] {
            assert!(float_to_fixed(v, bits) < (1u64 << bits));
        }
    }
}

#[test]
fn negative_zero_equals_zero() {
    assert_eq!(float_to_fixed(-0.0, 24), float_to_fixed(0.0, 24));
    assert_eq!(float_to_fixed(0.0, 24), 1 << 23);
}

#[test]
fn compute_flags_priority() {
    let mut s = PrimitiveState::empty();
    assert_eq!(RecordFlags::compute(s, true), RecordFlags::NORMAL);
    s.insert(PrimitiveState::MEMBER_OF_SELECTED);
    let member = RecordFlags::MEMBER_OF_SELECTED;
    assert_eq!(RecordFlags::compute(s, true), member);
    s.insert(PrimitiveState::OUTER_MEMBER_OF_SELECTED);
    assert_eq!(
        RecordFlags::compute(s, true),
        RecordFlags::OUTER_MEMBER_OF_SELECTED
    );
    assert_eq!(RecordFlags::compute(s, false), member);
    s.insert(PrimitiveState::SELECTED);
    assert_eq!(RecordFlags::compute(s, true), RecordFlags::SELECTED);
    s.insert(PrimitiveState::DISABLED);
    assert_eq!(RecordFlags::compute(s, true), RecordFlags::DISABLED);
}

#[test]
fn disabled_records_sort_below_everything() {
    let disabled = OrderKey::new(RecordFlags::DISABLED, 100.0, 100.0, true);
    let normal = OrderKey::new(RecordFlags::NORMAL, -100.0, -100.0, false);
    assert!(disabled < normal);
}

#[test]
fn major_z_dominates_flags_and_z() {
    let low = OrderKey::new(RecordFlags::SELECTED, 1.0, 50.0, true);
    let high = OrderKey::new(RecordFlags::NORMAL, 2.0, -50.0, false);
    assert!(low < high);
}

#[test]
fn selection_groups_order_within_same_major_z() {
    let normal = OrderKey::new(RecordFlags::NORMAL, 2.0, 9.0, false);
    let member = OrderKey::new(RecordFlags::MEMBER_OF_SELECTED, 2.0, 0.0, false);
    let selected = OrderKey::new(RecordFlags::SELECTED, 2.0, -9.0, false);
    let outer = OrderKey::new(RecordFlags::OUTER_MEMBER_OF_SELECTED, 2.0, -9.0, false);
    assert!(normal < member);
    assert!(member < selected);
    assert!(selected < outer);
}

#[test]
fn simple_node_bit_is_last_tie_break() {
    let icon = OrderKey::new(RecordFlags::NORMAL, 4.0, 0.0, false);
    let simple = OrderKey::new(RecordFlags::NORMAL, 4.0, 0.0, true);
    assert_eq!(simple.0 - icon.0, 1);
}

#[test]
fn key_uses_54_bits() {
    let flags = RecordFlags::OUTER_MEMBER_OF_SELECTED;
    let k = OrderKey::new(flags, f32::MAX, f32::MAX, true);
    assert!(k.0 < (1u64 << 54));
    assert!(k.0 >= (1u64 << 53));
}

#[test]
fn flag_word_fits_four_bits() {
    assert_eq!(RecordFlags::default(), RecordFlags::NORMAL);
    assert!(RecordFlags::NORMAL.is_empty());
    assert_eq!(RecordFlags::all().bits(), 0xf);
    assert!(RecordFlags::SELECTED.is_selected());
    assert!(!RecordFlags::SELECTED.is_member());
}
