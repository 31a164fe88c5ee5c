//! Pointer surface: the consumer side of the gesture layer.
//!
//! Turns per-frame gestures into discrete widget events. Positions are
//! clamped to the surface here, whatever the engine proposed.

use super::widget::{FocusTarget, MouseButton, WidgetEvent};
use crate::device::JoypadButton;
use crate::gesture::{Bounds, KeyTranslation, MouseGesture, Point};
use tracing::debug;

#[derive(Debug)]
pub struct PointerSurface {
    bounds: Bounds,
    joypad_speed: i32,
    position: Point,
    left_down: bool,
    right_down: bool,
    select_latched: bool,
    select_seen: bool,
    focus: FocusTarget,
    events: Vec<WidgetEvent>,
}

impl PointerSurface {
    pub fn new(bounds: Bounds, joypad_speed: u32) -> Self {
        Self {
            bounds,
            joypad_speed: i32::try_from(joypad_speed).unwrap_or(i32::MAX),
            position: Point::default(),
            left_down: false,
            right_down: false,
            select_latched: false,
            select_seen: false,
            focus: FocusTarget::default(),
            events: Vec::new(),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    /// Mouse gesture: a move to the clamped proposal whenever it differs
    /// from the old position, then one click per button transition to held.
    pub fn on_mouse(&mut self, gesture: MouseGesture) {
        if gesture.new != gesture.old {
            let clamped = self.bounds.clamp(gesture.new);
            self.position = clamped;
            self.events.push(WidgetEvent::MouseMove { position: clamped });
        }

        if gesture.left {
            if !self.left_down {
                self.left_down = true;
                self.click(MouseButton::Left);
            }
        } else {
            self.left_down = false;
        }

        if gesture.right {
            if !self.right_down {
                self.right_down = true;
                self.click(MouseButton::Right);
            }
        } else {
            self.right_down = false;
        }
    }

    /// Held-button gesture. Select toggles focus once per press; A clicks at
    /// the pointer; the D-pad nudges the pointer.
    pub fn on_pad_button(&mut self, button: JoypadButton) {
        let speed = self.joypad_speed;
        match button {
            JoypadButton::Select => {
                self.select_seen = true;
                if !self.select_latched {
                    self.select_latched = true;
                    self.focus = self.focus.toggled();
                    debug!("Focus toggled to {:?}", self.focus);
                    self.events
                        .push(WidgetEvent::FocusChanged { target: self.focus });
                }
            }
            JoypadButton::A => self.nudge(0, 0, true),
            JoypadButton::Up => self.nudge(0, -speed, false),
            JoypadButton::Down => self.nudge(0, speed, false),
            JoypadButton::Left => self.nudge(-speed, 0, false),
            JoypadButton::Right => self.nudge(speed, 0, false),
            _ => {}
        }
    }

    /// Closes a frame of held-button gestures. A Select that was not held
    /// this frame re-arms the focus toggle.
    pub fn end_frame(&mut self) {
        if !self.select_seen {
            self.select_latched = false;
        }
        self.select_seen = false;
    }

    /// Key gesture: a down always yields a press and release pair, routed to
    /// the focused target.
    pub fn on_key(&mut self, key: KeyTranslation) {
        let target = self.focus;
        self.events.push(WidgetEvent::KeyPress {
            key: key.key,
            character: key.character,
            modifiers: key.modifiers,
            target,
        });
        self.events.push(WidgetEvent::KeyRelease {
            key: key.key,
            character: key.character,
            modifiers: key.modifiers,
            target,
        });
    }

    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    fn nudge(&mut self, dx: i32, dy: i32, left: bool) {
        let old = self.position;
        self.on_mouse(MouseGesture {
            old,
            new: old.offset(dx, dy),
            left,
            right: false,
        });
    }

    fn click(&mut self, button: MouseButton) {
        let position = self.position;
        self.events
            .push(WidgetEvent::MouseButtonPress { button, position });
        self.events
            .push(WidgetEvent::MouseButtonRelease { button, position });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{WidgetKey, WidgetModifiers};

    fn surface() -> PointerSurface {
        PointerSurface::new(Bounds::new(200, 150), 20)
    }

    fn motion(old: (i32, i32), new: (i32, i32)) -> MouseGesture {
        MouseGesture {
            old: Point::new(old.0, old.1),
            new: Point::new(new.0, new.1),
            left: false,
            right: false,
        }
    }

    #[test]
    fn move_inside_bounds_is_unchanged() {
        let mut s = surface();
        s.on_mouse(motion((100, 100), (105, 97)));
        assert_eq!(
            s.take_events(),
            vec![WidgetEvent::MouseMove {
                position: Point::new(105, 97)
            }]
        );
    }

    #[test]
    fn move_outside_bounds_is_clamped() {
        let mut s = surface();
        s.on_mouse(motion((100, 100), (600, 100)));
        assert_eq!(s.position(), Point::new(200, 100));

        // Pinned at the edge, the move is still reported.
        s.take_events();
        s.on_mouse(motion((200, 100), (700, 100)));
        assert_eq!(
            s.take_events(),
            vec![WidgetEvent::MouseMove {
                position: Point::new(200, 100)
            }]
        );
    }

    #[test]
    fn unchanged_proposal_emits_no_move() {
        let mut s = surface();
        s.on_mouse(motion((40, 30), (40, 30)));
        assert!(s.take_events().is_empty());
        assert_eq!(s.position(), Point::new(0, 0));
    }

    #[test]
    fn held_left_button_clicks_once() {
        let mut s = surface();
        let held = MouseGesture {
            left: true,
            ..motion((0, 0), (0, 0))
        };
        s.on_mouse(held);
        s.on_mouse(held);
        let events = s.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            WidgetEvent::MouseButtonPress {
                button: MouseButton::Left,
                ..
            }
        ));

        s.on_mouse(motion((0, 0), (0, 0)));
        s.on_mouse(held);
        assert_eq!(s.take_events().len(), 2);
    }

    #[test]
    fn dpad_moves_by_speed_and_a_clicks() {
        let mut s = surface();
        s.on_pad_button(JoypadButton::Right);
        s.on_pad_button(JoypadButton::Down);
        assert_eq!(s.position(), Point::new(20, 20));

        s.on_pad_button(JoypadButton::Up);
        s.on_pad_button(JoypadButton::Up);
        assert_eq!(s.position(), Point::new(20, 0));

        s.take_events();
        s.on_pad_button(JoypadButton::A);
        assert_eq!(
            s.take_events(),
            vec![
                WidgetEvent::MouseButtonPress {
                    button: MouseButton::Left,
                    position: Point::new(20, 0)
                },
                WidgetEvent::MouseButtonRelease {
                    button: MouseButton::Left,
                    position: Point::new(20, 0)
                },
            ]
        );
    }

    #[test]
    fn select_toggles_focus_once_per_press() {
        let mut s = surface();
        for _ in 0..3 {
            s.on_pad_button(JoypadButton::Select);
            s.end_frame();
        }
        assert_eq!(s.focus(), FocusTarget::AddressBar);
        assert_eq!(s.take_events().len(), 1);

        // Released for a frame, then pressed again.
        s.end_frame();
        s.on_pad_button(JoypadButton::Select);
        assert_eq!(s.focus(), FocusTarget::Page);
    }

    #[test]
    fn key_down_yields_press_and_release_to_focus() {
        let mut s = surface();
        s.on_key(KeyTranslation {
            key: WidgetKey::A,
            character: Some('a'),
            modifiers: WidgetModifiers::empty(),
        });
        let events = s.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            WidgetEvent::KeyPress {
                key: WidgetKey::A,
                target: FocusTarget::Page,
                ..
            }
        ));
        assert!(matches!(events[1], WidgetEvent::KeyRelease { .. }));
    }
}
