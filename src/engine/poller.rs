//! Poll and diff: one pass over every descriptor per frame.

use crate::device::{DeviceKind, StateStore};
use crate::host::InputHost;
use tracing::trace;

/// A single cell whose sampled value differs from the stored one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub device: DeviceKind,
    pub port: u32,
    pub index: u32,
    pub id: u32,
    pub old: u16,
    pub new: u16,
}

/// Triggers the host poll, then samples every address of every descriptor in
/// declaration order (port, index, id nested). Cells that changed are written
/// back and reported in that same order; unchanged cells are left untouched.
pub fn poll_and_diff<H>(store: &mut StateStore, host: &mut H, changes: &mut Vec<ChangeEvent>)
where
    H: InputHost + ?Sized,
{
    host.poll();

    for slot in store.slots_mut() {
        let descriptor = *slot.descriptor();
        for (port, index, id) in descriptor.addresses() {
            let new = host.sample(port, descriptor.kind, index, id);
            let old = slot.read(port, index, id);
            if new == old {
                continue;
            }

            slot.write(port, index, id, new);
            trace!(
                "{:?} ({}, {}, {}) {} -> {}",
                descriptor.kind,
                port,
                index,
                id,
                old,
                new
            );
            changes.push(ChangeEvent {
                device: descriptor.kind,
                port,
                index,
                id,
                old,
                new,
            });
        }
    }
}
