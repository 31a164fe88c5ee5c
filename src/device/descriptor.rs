//! Static descriptor table.
//!
//! Each descriptor declares the addressable `(port, index, id)` cube of one
//! device class. The table is fixed at compile time; store sizes derive from
//! it.

use super::ids::{keys, AnalogAxis, AnalogStick, DeviceKind, JoypadButton, MouseId};

/// Inclusive `[min, max]` coordinate range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub min: u32,
    pub max: u32,
}

impl Span {
    pub const fn new(min: u32, max: u32) -> Self {
        assert!(min <= max, "span minimum exceeds maximum");
        Self { min, max }
    }

    pub const fn single(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Number of coordinates in the span.
    pub const fn len(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.min..=self.max
    }
}

/// Address-space declaration for one device class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub kind: DeviceKind,
    pub ports: Span,
    pub indices: Span,
    pub ids: Span,
}

impl Descriptor {
    /// Ranges for each device class. Pattern-matched so adding a class is a
    /// compile error until its ranges are declared.
    pub const fn for_kind(kind: DeviceKind) -> Self {
        let (indices, ids) = match kind {
            DeviceKind::Joypad => (
                Span::single(0),
                Span::new(JoypadButton::B.id(), JoypadButton::R3.id()),
            ),
            DeviceKind::Analog => (
                Span::new(AnalogStick::Left.index(), AnalogStick::Right.index()),
                Span::new(AnalogAxis::X.id(), AnalogAxis::Y.id()),
            ),
            DeviceKind::Keyboard => (Span::single(0), Span::new(keys::BACKSPACE, keys::UNDO)),
            DeviceKind::Mouse => (
                Span::single(0),
                Span::new(MouseId::X.id(), MouseId::HorizWheelDown.id()),
            ),
        };

        Self {
            kind,
            ports: Span::single(0),
            indices,
            ids,
        }
    }

    /// Number of cells backing this descriptor.
    pub const fn cardinality(&self) -> usize {
        self.ports.len() * self.indices.len() * self.ids.len()
    }

    /// Row-major offset of `(port, index, id)`; `None` if any coordinate lies
    /// outside the declared ranges.
    pub const fn offset(&self, port: u32, index: u32, id: u32) -> Option<usize> {
        if !self.ports.contains(port) || !self.indices.contains(index) || !self.ids.contains(id) {
            return None;
        }

        let id_span = self.ids.len();
        let index_span = self.indices.len();
        let port_rel = (port - self.ports.min) as usize;
        let index_rel = (index - self.indices.min) as usize;
        let id_rel = (id - self.ids.min) as usize;

        Some(port_rel * (index_span * id_span) + index_rel * id_span + id_rel)
    }

    /// Every valid address in poll order: port outer, index middle, id inner.
    pub fn addresses(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        self.ports.iter().flat_map(move |port| {
            self.indices
                .iter()
                .flat_map(move |index| self.ids.iter().map(move |id| (port, index, id)))
        })
    }
}

/// Declaration order is the event order within a frame.
pub const DESCRIPTORS: [Descriptor; 4] = [
    Descriptor::for_kind(DeviceKind::Joypad),
    Descriptor::for_kind(DeviceKind::Analog),
    Descriptor::for_kind(DeviceKind::Keyboard),
    Descriptor::for_kind(DeviceKind::Mouse),
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn offsets_cover_buffer_without_gaps() {
        for descriptor in DESCRIPTORS {
            let offsets: Vec<usize> = descriptor
                .addresses()
                .map(|(port, index, id)| descriptor.offset(port, index, id).unwrap())
                .collect();
            let unique: BTreeSet<usize> = offsets.iter().copied().collect();

            assert_eq!(offsets.len(), descriptor.cardinality());
            assert_eq!(unique.len(), offsets.len(), "{:?} repeats an offset", descriptor.kind);
            assert_eq!(
                unique.into_iter().collect::<Vec<_>>(),
                (0..descriptor.cardinality()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn declared_cardinalities() {
        assert_eq!(DESCRIPTORS[0].cardinality(), 16);
        assert_eq!(DESCRIPTORS[1].cardinality(), 4);
        assert_eq!(DESCRIPTORS[2].cardinality(), 315);
        assert_eq!(DESCRIPTORS[3].cardinality(), 9);
    }

    #[test]
    fn out_of_range_coordinates_have_no_offset() {
        let keyboard = Descriptor::for_kind(DeviceKind::Keyboard);
        assert_eq!(keyboard.offset(0, 0, keys::UNKNOWN), None);
        assert_eq!(keyboard.offset(0, 0, keys::UNDO + 1), None);
        assert_eq!(keyboard.offset(1, 0, keys::RETURN), None);
        assert_eq!(keyboard.offset(0, 0, keys::BACKSPACE), Some(0));

        let analog = Descriptor::for_kind(DeviceKind::Analog);
        assert_eq!(analog.offset(0, 1, 1), Some(3));
        assert_eq!(analog.offset(0, 2, 0), None);
    }

    #[test]
    fn addresses_follow_nested_order() {
        let analog = Descriptor::for_kind(DeviceKind::Analog);
        let order: Vec<_> = analog.addresses().collect();
        assert_eq!(order, vec![(0, 0, 0), (0, 0, 1), (0, 1, 0), (0, 1, 1)]);
    }

    proptest! {
        #[test]
        fn offset_is_injective_for_any_spans(
            port_min in 0u32..4, port_len in 1u32..4,
            index_min in 0u32..4, index_len in 1u32..4,
            id_min in 0u32..300, id_len in 1u32..20,
        ) {
            let descriptor = Descriptor {
                kind: DeviceKind::Joypad,
                ports: Span::new(port_min, port_min + port_len - 1),
                indices: Span::new(index_min, index_min + index_len - 1),
                ids: Span::new(id_min, id_min + id_len - 1),
            };

            let mut seen = vec![false; descriptor.cardinality()];
            for (port, index, id) in descriptor.addresses() {
                let offset = descriptor.offset(port, index, id).unwrap();
                prop_assert!(!seen[offset]);
                seen[offset] = true;
            }
            prop_assert!(seen.into_iter().all(|hit| hit));
        }
    }
}
