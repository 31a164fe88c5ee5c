//! Widget-side events and the trait a rendering consumer implements.

use super::frame::FrameBuffer;
use crate::gesture::{Point, WidgetKey, WidgetModifiers};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Which part of the consumer receives keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusTarget {
    AddressBar,
    #[default]
    Page,
}

impl FocusTarget {
    pub fn toggled(self) -> Self {
        match self {
            FocusTarget::AddressBar => FocusTarget::Page,
            FocusTarget::Page => FocusTarget::AddressBar,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    MouseMove {
        position: Point,
    },
    MouseButtonPress {
        button: MouseButton,
        position: Point,
    },
    MouseButtonRelease {
        button: MouseButton,
        position: Point,
    },
    KeyPress {
        key: WidgetKey,
        character: Option<char>,
        modifiers: WidgetModifiers,
        target: FocusTarget,
    },
    KeyRelease {
        key: WidgetKey,
        character: Option<char>,
        modifiers: WidgetModifiers,
        target: FocusTarget,
    },
    FocusChanged {
        target: FocusTarget,
    },
}

/// Rendering consumer driven once per frame.
pub trait Widget: Send {
    fn handle(&mut self, events: &[WidgetEvent]);
    fn render(&mut self, frame: &mut FrameBuffer);
}

const BACKGROUND: u32 = 0x0020_2020;
const CURSOR: u32 = 0x00ff_ffff;
const CURSOR_PRESSED: u32 = 0x00ff_4040;
const CURSOR_ARM: i32 = 4;

/// Default consumer: records what it receives and draws a crosshair at the
/// last pointer position.
#[derive(Debug, Default)]
pub struct EventLog {
    last_frame: Vec<WidgetEvent>,
    total: u64,
    pointer: Point,
    pressed: bool,
    focus: FocusTarget,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered by the most recent frame.
    pub fn last_frame(&self) -> &[WidgetEvent] {
        &self.last_frame
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }
}

impl Widget for EventLog {
    fn handle(&mut self, events: &[WidgetEvent]) {
        self.last_frame.clear();
        self.last_frame.extend_from_slice(events);
        self.total += events.len() as u64;

        for event in events {
            trace!("Widget event: {:?}", event);
            match *event {
                WidgetEvent::MouseMove { position } => self.pointer = position,
                WidgetEvent::MouseButtonPress { position, .. } => {
                    self.pointer = position;
                    self.pressed = true;
                }
                WidgetEvent::MouseButtonRelease { position, .. } => {
                    self.pointer = position;
                    self.pressed = false;
                }
                WidgetEvent::FocusChanged { target } => {
                    debug!("Focus moved to {:?}", target);
                    self.focus = target;
                }
                WidgetEvent::KeyPress { .. } | WidgetEvent::KeyRelease { .. } => {}
            }
        }
    }

    fn render(&mut self, frame: &mut FrameBuffer) {
        frame.fill(BACKGROUND);
        let color = if self.pressed { CURSOR_PRESSED } else { CURSOR };

        for d in -CURSOR_ARM..=CURSOR_ARM {
            put_signed(frame, self.pointer.x + d, self.pointer.y, color);
            put_signed(frame, self.pointer.x, self.pointer.y + d, color);
        }
    }
}

fn put_signed(frame: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        frame.put(x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_tracks_pointer_and_focus() {
        let mut log = EventLog::new();
        log.handle(&[
            WidgetEvent::MouseMove {
                position: Point::new(10, 12),
            },
            WidgetEvent::FocusChanged {
                target: FocusTarget::AddressBar,
            },
        ]);

        assert_eq!(log.pointer(), Point::new(10, 12));
        assert_eq!(log.focus(), FocusTarget::AddressBar);
        assert_eq!(log.last_frame().len(), 2);

        log.handle(&[]);
        assert!(log.last_frame().is_empty());
        assert_eq!(log.total(), 2);
    }

    #[test]
    fn render_draws_crosshair_at_pointer() {
        let mut log = EventLog::new();
        log.handle(&[WidgetEvent::MouseMove {
            position: Point::new(0, 5),
        }]);

        let mut frame = FrameBuffer::new(16, 16);
        log.render(&mut frame);
        assert_eq!(frame.get(0, 5), Some(CURSOR));
        assert_eq!(frame.get(4, 5), Some(CURSOR));
        assert_eq!(frame.get(0, 9), Some(CURSOR));
        assert_eq!(frame.get(8, 8), Some(BACKGROUND));
    }
}
