use jugglegraph_state::{
    JugglingState, LabelFlags, StateError, to_abbreviated_label, to_binary_label,
};
use proptest::prelude::*;

#[test]
fn binary_label_is_fixed_width_msb_first() {
    let state = JugglingState::from_bits(0b00111);
    assert_eq!(to_binary_label(state, 5, false), "00111");
    assert_eq!(to_binary_label(state, 5, true), "11100");
}

#[test]
fn binary_label_of_zero_is_all_zeros() {
    assert_eq!(to_binary_label(JugglingState::from_bits(0), 4, false), "0000");
}

#[test]
fn binary_label_of_zero_width_is_empty() {
    let state = JugglingState::from_bits(0);
    assert_eq!(to_binary_label(state, 0, false), "");
    assert_eq!(to_binary_label(state, 0, true), "");
    assert_eq!(LabelFlags::PLAIN.label(state, 0), "");
}

#[test]
fn abbreviated_label_skips_trailing_gap() {
    let state = JugglingState::from_bits(0b01010);
    assert_eq!(to_abbreviated_label(state, 5), "11");
}

#[test]
fn abbreviated_label_of_ground_state_is_leading_gap_then_zeros() {
    let ground = JugglingState::ground(3);
    assert_eq!(to_abbreviated_label(ground, 5), "200");
}

#[test]
fn abbreviated_label_uses_letters_for_wide_gaps() {
    let ten = JugglingState::from_bits(1 << 2);
    assert_eq!(to_abbreviated_label(ten, 13), "a");
    let eleven = JugglingState::from_bits(1 << 1);
    assert_eq!(to_abbreviated_label(eleven, 13), "b");
}

#[test]
fn abbreviated_label_of_empty_state_is_empty() {
    assert_eq!(to_abbreviated_label(JugglingState::from_bits(0), 6), "");
}

#[test]
fn label_flags_prefer_abbreviation() {
    let state = JugglingState::from_bits(0b01011);
    let both = LabelFlags {
        reversed: true,
        abbreviated: true,
    };
    assert_eq!(both.label(state, 5), "110");
    let reversed = LabelFlags {
        reversed: true,
        abbreviated: false,
    };
    assert_eq!(reversed.label(state, 5), "11010");
    assert_eq!(LabelFlags::PLAIN.label(state, 5), "01011");
}

#[test]
fn ground_state_sets_low_bits() {
    assert_eq!(JugglingState::ground(3).bits(), 0b111);
    assert_eq!(JugglingState::ground(0).bits(), 0);
    assert_eq!(JugglingState::ground(64).bits(), u64::MAX);
    assert_eq!(JugglingState::ground(3).num_props(), 3);
}

#[test]
fn checked_constructor_rejects_out_of_range_bits() {
    assert_eq!(
        JugglingState::new(0b100000, 5),
        Err(StateError::BitsOutOfRange {
            bits: 0b100000,
            max_height: 5,
        })
    );
    assert!(JugglingState::new(0b11111, 5).is_ok());
    assert!(JugglingState::new(u64::MAX, 64).is_ok());
    assert_eq!(
        JugglingState::new(1, 65),
        Err(StateError::HeightTooLarge { max_height: 65 })
    );
}

#[test]
fn checked_ground_rejects_more_props_than_slots() {
    assert_eq!(
        JugglingState::ground_checked(6, 5),
        Err(StateError::TooManyProps {
            num_props: 6,
            max_height: 5,
        })
    );
}

#[test]
fn occupied_reads_individual_slots() {
    let state = JugglingState::from_bits(0b01001);
    assert!(state.occupied(0));
    assert!(!state.occupied(1));
    assert!(state.occupied(3));
    assert!(!state.occupied(4));
}

#[test]
fn state_serializes_as_plain_integer() {
    let state = JugglingState::from_bits(7);
    let json = serde_json::to_string(&state).expect("serialize");
    assert_eq!(json, "7");
}

#[test]
fn state_converts_from_raw_bits() {
    assert_eq!(JugglingState::from(0b111u64), JugglingState::ground(3));
}

proptest! {
    #[test]
    fn binary_label_reads_back_as_the_state(max_height in 1u32..=20, raw in any::<u64>()) {
        let bits = raw & ((1u64 << max_height) - 1);
        let label = to_binary_label(JugglingState::from_bits(bits), max_height, false);
        prop_assert_eq!(label.len(), max_height as usize);
        prop_assert_eq!(u64::from_str_radix(&label, 2).expect("binary"), bits);
    }

    #[test]
    fn reversed_label_is_character_reverse(max_height in 1u32..=20, raw in any::<u64>()) {
        let state = JugglingState::from_bits(raw & ((1u64 << max_height) - 1));
        let forward = to_binary_label(state, max_height, false);
        let reversed = to_binary_label(state, max_height, true);
        prop_assert_eq!(reversed, forward.chars().rev().collect::<String>());
    }

    #[test]
    fn abbreviated_label_has_one_char_per_prop(max_height in 1u32..=30, raw in any::<u64>()) {
        let state = JugglingState::from_bits(raw & ((1u64 << max_height) - 1));
        let label = to_abbreviated_label(state, max_height);
        prop_assert_eq!(label.chars().count() as u32, state.num_props());
    }
}
