//! Flat state store: one dense, zero-filled `u16` buffer per descriptor.

use super::descriptor::{Descriptor, DESCRIPTORS};
use super::ids::DeviceKind;
use tracing::debug;

/// Backing cells for a single descriptor.
#[derive(Debug)]
pub struct Slot {
    descriptor: Descriptor,
    values: Vec<u16>,
}

impl Slot {
    /// Allocates a zeroed buffer sized to the descriptor's address space.
    pub fn allocate(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            values: vec![0; descriptor.cardinality()],
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads a cell. Panics on an address outside the declared ranges: every
    /// caller iterates the descriptor's own ranges, so a miss is a logic error.
    pub fn read(&self, port: u32, index: u32, id: u32) -> u16 {
        self.values[self.checked_offset(port, index, id)]
    }

    /// Writes a cell. Same addressing contract as [`Slot::read`].
    pub fn write(&mut self, port: u32, index: u32, id: u32, value: u16) {
        let offset = self.checked_offset(port, index, id);
        self.values[offset] = value;
    }

    fn checked_offset(&self, port: u32, index: u32, id: u32) -> usize {
        match self.descriptor.offset(port, index, id) {
            Some(offset) => offset,
            None => panic!(
                "address ({port}, {index}, {id}) outside {:?} descriptor ranges",
                self.descriptor.kind
            ),
        }
    }
}

/// All slots, in descriptor declaration order.
#[derive(Debug, Default)]
pub struct StateStore {
    slots: Vec<Slot>,
}

impl StateStore {
    /// Allocates one slot per entry of the static descriptor table.
    pub fn allocate() -> Self {
        Self::allocate_for(&DESCRIPTORS)
    }

    pub fn allocate_for(descriptors: &[Descriptor]) -> Self {
        let slots: Vec<Slot> = descriptors.iter().copied().map(Slot::allocate).collect();
        debug!(
            "Allocated state store: {} descriptors, {} cells",
            slots.len(),
            slots.iter().map(Slot::len).sum::<usize>()
        );
        Self { slots }
    }

    pub fn is_allocated(&self) -> bool {
        !self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    /// Slot for a device class. Panics if the store holds no such descriptor.
    pub fn slot(&self, kind: DeviceKind) -> &Slot {
        match self.slots.iter().find(|slot| slot.descriptor.kind == kind) {
            Some(slot) => slot,
            None => panic!("state store has no {kind:?} descriptor"),
        }
    }

    pub fn read(&self, kind: DeviceKind, port: u32, index: u32, id: u32) -> u16 {
        self.slot(kind).read(port, index, id)
    }

    /// Frees every buffer. Returns `false` when there was nothing to free, so
    /// a second release is a no-op.
    pub fn release(&mut self) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let cells: usize = self.slots.iter().map(Slot::len).sum();
        self.slots = Vec::new();
        debug!("Released state store ({} cells)", cells);
        true
    }
}
