//! Gesture derivation: turns stored device levels and raw key events into
//! consumer-facing mouse, button and key gestures.

pub mod buttons;
pub mod keyboard;
pub mod mouse;

pub use buttons::held_buttons;
pub use keyboard::{
    on_raw_key, translate, KeyMods, KeyQueue, KeyTranslation, RawKeyEvent, WidgetKey,
    WidgetModifiers, KEY_TABLE,
};
pub use mouse::{derive_mouse, AccumulatorPolicy, Bounds, CursorAccumulator, MouseGesture, Point};
