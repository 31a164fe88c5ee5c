//! Device layer: wire identifiers, the static descriptor table and the flat
//! state store addressed through it.
//!
//! ```text
//! DESCRIPTORS ──► StateStore (one dense u16 slot per descriptor)
//!   (ranges)        offset = row-major (port, index, id)
//! ```

pub mod descriptor;
pub mod ids;
pub mod store;

pub use descriptor::{Descriptor, Span, DESCRIPTORS};
pub use ids::{keys, AnalogAxis, AnalogStick, DeviceKind, JoypadButton, MouseId};
pub use store::{Slot, StateStore};
