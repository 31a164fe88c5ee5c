//! Wire identifiers shared with the host.
//!
//! The integer values here are the host's input protocol. They are not ours
//! to renumber: the host samples `(port, device, index, id)` using exactly
//! these spaces.

/// Logical device class as the host numbers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Joypad,
    Mouse,
    Keyboard,
    Analog,
}

impl DeviceKind {
    pub const fn wire(self) -> u32 {
        match self {
            DeviceKind::Joypad => 1,
            DeviceKind::Mouse => 2,
            DeviceKind::Keyboard => 3,
            DeviceKind::Analog => 5,
        }
    }

    pub const fn from_wire(value: u32) -> Option<Self> {
        match value {
            1 => Some(DeviceKind::Joypad),
            2 => Some(DeviceKind::Mouse),
            3 => Some(DeviceKind::Keyboard),
            5 => Some(DeviceKind::Analog),
            _ => None,
        }
    }
}

/// Digital pad buttons, declared in wire order (`B` = 0 .. `R3` = 15).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoypadButton {
    B,
    Y,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
    A,
    X,
    L,
    R,
    L2,
    R2,
    L3,
    R3,
}

impl JoypadButton {
    pub const ALL: [JoypadButton; 16] = [
        JoypadButton::B,
        JoypadButton::Y,
        JoypadButton::Select,
        JoypadButton::Start,
        JoypadButton::Up,
        JoypadButton::Down,
        JoypadButton::Left,
        JoypadButton::Right,
        JoypadButton::A,
        JoypadButton::X,
        JoypadButton::L,
        JoypadButton::R,
        JoypadButton::L2,
        JoypadButton::R2,
        JoypadButton::L3,
        JoypadButton::R3,
    ];

    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(id).ok()?).copied()
    }
}

/// Analog stick selector (the `index` coordinate of the analog device).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalogStick {
    Left,
    Right,
}

impl AnalogStick {
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Analog axis (the `id` coordinate of the analog device).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalogAxis {
    X,
    Y,
}

impl AnalogAxis {
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Mouse ids in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseId {
    X,
    Y,
    Left,
    Right,
    WheelUp,
    WheelDown,
    Middle,
    HorizWheelUp,
    HorizWheelDown,
}

impl MouseId {
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Host key codes (`retro_key`). Only the codes the keyboard descriptor and
/// the translation table address are listed.
pub mod keys {
    pub const UNKNOWN: u32 = 0;
    pub const BACKSPACE: u32 = 8;
    pub const TAB: u32 = 9;
    pub const CLEAR: u32 = 12;
    pub const RETURN: u32 = 13;
    pub const PAUSE: u32 = 19;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const EXCLAIM: u32 = 33;
    pub const QUOTEDBL: u32 = 34;
    pub const HASH: u32 = 35;
    pub const DOLLAR: u32 = 36;
    pub const AMPERSAND: u32 = 38;
    pub const QUOTE: u32 = 39;
    pub const LEFTPAREN: u32 = 40;
    pub const RIGHTPAREN: u32 = 41;
    pub const ASTERISK: u32 = 42;
    pub const PLUS: u32 = 43;
    pub const COMMA: u32 = 44;
    pub const MINUS: u32 = 45;
    pub const PERIOD: u32 = 46;
    pub const SLASH: u32 = 47;
    pub const NUM_0: u32 = 48;
    pub const NUM_1: u32 = 49;
    pub const NUM_2: u32 = 50;
    pub const NUM_3: u32 = 51;
    pub const NUM_4: u32 = 52;
    pub const NUM_5: u32 = 53;
    pub const NUM_6: u32 = 54;
    pub const NUM_7: u32 = 55;
    pub const NUM_8: u32 = 56;
    pub const NUM_9: u32 = 57;
    pub const COLON: u32 = 58;
    pub const SEMICOLON: u32 = 59;
    pub const LESS: u32 = 60;
    pub const EQUALS: u32 = 61;
    pub const GREATER: u32 = 62;
    pub const QUESTION: u32 = 63;
    pub const AT: u32 = 64;
    pub const LEFTBRACKET: u32 = 91;
    pub const BACKSLASH: u32 = 92;
    pub const RIGHTBRACKET: u32 = 93;
    pub const CARET: u32 = 94;
    pub const UNDERSCORE: u32 = 95;
    pub const BACKQUOTE: u32 = 96;
    pub const LOWER_A: u32 = 97;
    pub const LOWER_Z: u32 = 122;
    pub const DELETE: u32 = 127;

    pub const KP0: u32 = 256;
    pub const KP9: u32 = 265;
    pub const KP_PERIOD: u32 = 266;
    pub const KP_DIVIDE: u32 = 267;
    pub const KP_MULTIPLY: u32 = 268;
    pub const KP_MINUS: u32 = 269;
    pub const KP_PLUS: u32 = 270;
    pub const KP_ENTER: u32 = 271;
    pub const KP_EQUALS: u32 = 272;

    pub const UP: u32 = 273;
    pub const DOWN: u32 = 274;
    pub const RIGHT: u32 = 275;
    pub const LEFT: u32 = 276;
    pub const INSERT: u32 = 277;
    pub const HOME: u32 = 278;
    pub const END: u32 = 279;
    pub const PAGEUP: u32 = 280;
    pub const PAGEDOWN: u32 = 281;

    pub const F1: u32 = 282;
    pub const F15: u32 = 296;

    pub const NUMLOCK: u32 = 300;
    pub const CAPSLOCK: u32 = 301;
    pub const SCROLLOCK: u32 = 302;
    pub const RSHIFT: u32 = 303;
    pub const LSHIFT: u32 = 304;
    pub const RCTRL: u32 = 305;
    pub const LCTRL: u32 = 306;
    pub const RALT: u32 = 307;
    pub const LALT: u32 = 308;
    pub const RMETA: u32 = 309;
    pub const LMETA: u32 = 310;
    pub const LSUPER: u32 = 311;
    pub const RSUPER: u32 = 312;
    pub const MODE: u32 = 313;
    pub const COMPOSE: u32 = 314;

    pub const HELP: u32 = 315;
    pub const PRINT: u32 = 316;
    pub const SYSREQ: u32 = 317;
    pub const BREAK: u32 = 318;
    pub const MENU: u32 = 319;
    pub const POWER: u32 = 320;
    pub const EURO: u32 = 321;
    pub const UNDO: u32 = 322;
}
