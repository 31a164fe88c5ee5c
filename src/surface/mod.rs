//! Consumer side: the frame buffer handed to the host, the pointer surface
//! that turns gestures into widget events, and the widget that draws them.

pub mod frame;
pub mod pointer;
pub mod widget;

pub use frame::{FrameBuffer, PixelFormat};
pub use pointer::PointerSurface;
pub use widget::{EventLog, FocusTarget, MouseButton, Widget, WidgetEvent};
