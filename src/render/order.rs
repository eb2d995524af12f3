use bitflags::bitflags;

use crate::data::primitive::PrimitiveState;

bitflags! {
    /// Selection state of a record, as stored in the order key.
    ///
    /// The values are ordered so that selected records paint above members of a selection,
    /// which paint above unselected records. Disabled records are moved below everything by the
    /// first key bit instead.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RecordFlags: u8 {
        /// Nothing special.
        const NORMAL = 0;
        /// Disabled primitive.
        const DISABLED = 1;
        /// Member of a selected relation.
        const MEMBER_OF_SELECTED = 2;
        /// Selected primitive.
        const SELECTED = 4;
        /// Outer member of a selected multipolygon.
        const OUTER_MEMBER_OF_SELECTED = 8;
    }
}

impl Default for RecordFlags {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl RecordFlags {
    /// Flag word of a primitive in `state`. The first match wins:
    /// disabled, selected, outer member (only with `check_outer_member`), member, normal.
    pub fn compute(state: PrimitiveState, check_outer_member: bool) -> Self {
        if state.contains(PrimitiveState::DISABLED) {
            Self::DISABLED
        } else if state.contains(PrimitiveState::SELECTED) {
            Self::SELECTED
        } else if check_outer_member && state.contains(PrimitiveState::OUTER_MEMBER_OF_SELECTED) {
            Self::OUTER_MEMBER_OF_SELECTED
        } else if state.contains(PrimitiveState::MEMBER_OF_SELECTED) {
            Self::MEMBER_OF_SELECTED
        } else {
            Self::NORMAL
        }
    }

    /// `true` when the disabled bit is set.
    pub const fn is_disabled(self) -> bool {
        self.contains(Self::DISABLED)
    }

    /// `true` when the selected bit is set.
    pub const fn is_selected(self) -> bool {
        self.contains(Self::SELECTED)
    }

    /// `true` when the member bit is set.
    pub const fn is_member(self) -> bool {
        self.contains(Self::MEMBER_OF_SELECTED)
    }

    /// `true` when the outer member bit is set.
    pub const fn is_outer_member(self) -> bool {
        self.contains(Self::OUTER_MEMBER_OF_SELECTED)
    }
}

/// Map a float onto an unsigned integer of `total_bits` bits, keeping the order.
///
/// Values that differ only below the kept precision map to the same integer. `-0.0` and `0.0`
/// map to the same value.
pub fn float_to_fixed(number: f32, total_bits: u32) -> u64 {
    debug_assert!(
        (15..=32).contains(&total_bits),
        "total_bits must be in 15..=32, got {total_bits}"
    );
    let mut value = u64::from(number.to_bits());
    let negative = value & 0x8000_0000 != 0;
    value ^= 0x8000_0000;
    if total_bits < 32 {
        value >>= 32 - total_bits;
    }
    if negative {
        value = (1u64 << (total_bits - 1)) - value;
    }
    value
}

/// Paint order of a record, lowest first.
///
/// Layout from the most significant bit: not-disabled (1), major z (24), flags (4), z (24),
/// default simple node (1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderKey(pub u64);

impl OrderKey {
    /// Encode the key.
    pub fn new(
        flags: RecordFlags,
        major_z_index: f32,
        z_index: f32,
        is_default_simple_node: bool,
    ) -> Self {
        let mut order = 0u64;
        if !flags.is_disabled() {
            order |= 1;
        }
        order <<= 24;
        order |= float_to_fixed(major_z_index, 24);
        order <<= 4;
        order |= u64::from(flags.bits() & 0xf);
        order <<= 24;
        order |= float_to_fixed(z_index, 24);
        order <<= 1;
        if is_default_simple_node {
            order |= 1;
        }
        Self(order)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/order.rs"]
mod tests;
