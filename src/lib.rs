//! Input plumbing for a libretro core that hosts a pointer-driven widget.
//!
//! Each frame the core polls the host, diffs every declared device address
//! against a flat state store, and derives mouse, held-button and keyboard
//! gestures for the widget.

pub mod config;
pub mod device;
pub mod engine;
pub mod gamepad;
pub mod gesture;
pub mod host;
pub mod plugin;
pub mod surface;

#[cfg(feature = "libretro")]
pub mod ffi;

pub use crate::config::{ConfigError, CoreConfig};
pub use crate::engine::{ChangeEvent, Frame, InputEngine};
pub use crate::host::{HostBindings, HostBindingsBuilder, HostError, InputHost, VideoSink};
pub use crate::plugin::{Core, CoreError, FrameReport};
