//! Gamepad-backed host for running the core without a frontend.
//!
//! Drains gilrs events on poll and answers samples from gilrs' cached
//! gamepad state. Only port 0's joypad and analog devices are backed; mouse
//! and keyboard sample as zero.

use crate::device::{AnalogAxis, AnalogStick, DeviceKind, JoypadButton};
use crate::host::{InputHost, VideoSink};
use crate::surface::FrameBuffer;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum GamepadError {
    #[error("Failed to initialize gamepad input: {0}")]
    InitializationError(String),
}

pub struct GilrsHost {
    gilrs: Gilrs,
    active: Option<GamepadId>,
    presented: u64,
}

impl GilrsHost {
    pub fn connect() -> Result<Self, GamepadError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => g,
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(GamepadError::InitializationError(e.to_string()));
            }
        };

        let mut host = Self {
            gilrs,
            active: None,
            presented: 0,
        };
        host.select_first();
        Ok(host)
    }

    pub fn active_gamepad(&self) -> Option<GamepadId> {
        self.active
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    fn select_first(&mut self) {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();
        match gamepads.first() {
            Some((id, gamepad)) => {
                info!("Selected gamepad: {} ({})", gamepad.name(), id);
                self.active = Some(*id);
            }
            None => warn!("No gamepad connected, sampling zeros until one appears"),
        }
    }
}

impl InputHost for GilrsHost {
    fn poll(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected if self.active.is_none() => {
                    info!("Gamepad connected: {}", id);
                    self.active = Some(id);
                }
                EventType::Disconnected if self.active == Some(id) => {
                    warn!("Active gamepad disconnected: {}", id);
                    self.active = None;
                    self.select_first();
                }
                _ => {}
            }
        }
    }

    fn sample(&mut self, port: u32, device: DeviceKind, index: u32, id: u32) -> u16 {
        let Some(active) = self.active.filter(|_| port == 0) else {
            return 0;
        };
        let gamepad = self.gilrs.gamepad(active);

        match device {
            DeviceKind::Joypad => JoypadButton::from_id(id)
                .map(button_for)
                .map_or(0, |button| u16::from(gamepad.is_pressed(button))),
            DeviceKind::Analog => axis_for(index, id).map_or(0, |(axis, invert)| {
                let value = gamepad.value(axis);
                axis_to_wire(if invert { -value } else { value })
            }),
            DeviceKind::Mouse | DeviceKind::Keyboard => 0,
        }
    }
}

impl VideoSink for GilrsHost {
    fn present(&mut self, frame: &FrameBuffer) {
        self.presented += 1;
        debug!(
            "Frame {} presented ({}x{})",
            self.presented,
            frame.width(),
            frame.height()
        );
    }
}

/// Face buttons follow the host's positional layout: `B` south, `A` east.
fn button_for(button: JoypadButton) -> Button {
    match button {
        JoypadButton::B => Button::South,
        JoypadButton::A => Button::East,
        JoypadButton::Y => Button::West,
        JoypadButton::X => Button::North,
        JoypadButton::Select => Button::Select,
        JoypadButton::Start => Button::Start,
        JoypadButton::Up => Button::DPadUp,
        JoypadButton::Down => Button::DPadDown,
        JoypadButton::Left => Button::DPadLeft,
        JoypadButton::Right => Button::DPadRight,
        JoypadButton::L => Button::LeftTrigger,
        JoypadButton::R => Button::RightTrigger,
        JoypadButton::L2 => Button::LeftTrigger2,
        JoypadButton::R2 => Button::RightTrigger2,
        JoypadButton::L3 => Button::LeftThumb,
        JoypadButton::R3 => Button::RightThumb,
    }
}

/// gilrs reports Y up-positive; the wire wants down-positive.
fn axis_for(index: u32, id: u32) -> Option<(Axis, bool)> {
    let left = index == AnalogStick::Left.index();
    let right = index == AnalogStick::Right.index();
    let x = id == AnalogAxis::X.id();
    let y = id == AnalogAxis::Y.id();

    match (left, right, x, y) {
        (true, _, true, _) => Some((Axis::LeftStickX, false)),
        (true, _, _, true) => Some((Axis::LeftStickY, true)),
        (_, true, true, _) => Some((Axis::RightStickX, false)),
        (_, true, _, true) => Some((Axis::RightStickY, true)),
        _ => None,
    }
}

/// Maps `[-1.0, 1.0]` to a signed 16-bit axis carried in a `u16`.
fn axis_to_wire(value: f32) -> u16 {
    let scaled = (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
    scaled as u16
}
