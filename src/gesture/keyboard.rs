//! Keyboard translation.
//!
//! Raw host key events arrive out of band (the host invokes a callback,
//! possibly from inside its own poll). They are queued in a [`KeyQueue`] and
//! drained once per frame, then translated through [`KEY_TABLE`] into
//! widget-level keys.

use crate::device::keys;
use bitflags::bitflags;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, trace};

bitflags! {
    /// Host modifier mask as delivered with a key event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyMods: u16 {
        const SHIFT = 0x01;
        const CTRL = 0x02;
        const ALT = 0x04;
        const META = 0x08;
        const NUMLOCK = 0x10;
        const CAPSLOCK = 0x20;
        const SCROLLOCK = 0x40;
    }
}

bitflags! {
    /// Modifiers as the widget layer understands them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WidgetModifiers: u8 {
        const SHIFT = 0x01;
        const CONTROL = 0x02;
        const ALT = 0x04;
        const META = 0x08;
        const KEYPAD = 0x10;
    }
}

impl WidgetModifiers {
    /// Bitwise mapping: every held host modifier contributes its flag, so
    /// combinations such as shift+ctrl survive. Lock keys other than num lock
    /// have no widget counterpart.
    pub fn from_host(mods: KeyMods) -> Self {
        let mut out = WidgetModifiers::empty();
        if mods.contains(KeyMods::SHIFT) {
            out |= WidgetModifiers::SHIFT;
        }
        if mods.contains(KeyMods::CTRL) {
            out |= WidgetModifiers::CONTROL;
        }
        if mods.contains(KeyMods::ALT) {
            out |= WidgetModifiers::ALT;
        }
        if mods.contains(KeyMods::META) {
            out |= WidgetModifiers::META;
        }
        if mods.contains(KeyMods::NUMLOCK) {
            out |= WidgetModifiers::KEYPAD;
        }
        out
    }
}

/// Widget-level key identity. `None` is the neutral key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WidgetKey {
    #[default]
    None,
    Backspace,
    Tab,
    Clear,
    Return,
    Enter,
    Pause,
    Escape,
    Space,
    Exclam,
    QuoteDbl,
    NumberSign,
    Dollar,
    Ampersand,
    Apostrophe,
    ParenLeft,
    ParenRight,
    Asterisk,
    Plus,
    Comma,
    Minus,
    Period,
    Slash,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Colon,
    Semicolon,
    Less,
    Equal,
    Greater,
    Question,
    At,
    BracketLeft,
    Backslash,
    BracketRight,
    AsciiCircum,
    Underscore,
    QuoteLeft,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Delete,
    Multiply,
    Up,
    Down,
    Right,
    Left,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    NumLock,
    CapsLock,
    ScrollLock,
    Shift,
    Control,
    Alt,
    Meta,
    SuperL,
    SuperR,
    ModeSwitch,
    MultiKey,
    Help,
    Print,
    SysReq,
    Menu,
    PowerOff,
    Undo,
}

/// One row of the translation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    pub code: u32,
    pub key: WidgetKey,
}

const fn entry(code: u32, key: WidgetKey) -> KeyEntry {
    KeyEntry { code, key }
}

const fn ascii(c: u8) -> u32 {
    c as u32
}

const fn function(n: u32) -> u32 {
    keys::F1 + n - 1
}

const fn keypad(n: u32) -> u32 {
    keys::KP0 + n
}

/// Host key code to widget key. Codes absent here (the euro sign among them)
/// translate to the neutral key. Keypad keys share the main-row identities;
/// the keypad modifier tells them apart.
pub static KEY_TABLE: &[KeyEntry] = &[
    entry(keys::BACKSPACE, WidgetKey::Backspace),
    entry(keys::TAB, WidgetKey::Tab),
    entry(keys::CLEAR, WidgetKey::Clear),
    entry(keys::RETURN, WidgetKey::Return),
    entry(keys::PAUSE, WidgetKey::Pause),
    entry(keys::ESCAPE, WidgetKey::Escape),
    entry(keys::SPACE, WidgetKey::Space),
    entry(keys::EXCLAIM, WidgetKey::Exclam),
    entry(keys::QUOTEDBL, WidgetKey::QuoteDbl),
    entry(keys::HASH, WidgetKey::NumberSign),
    entry(keys::DOLLAR, WidgetKey::Dollar),
    entry(keys::AMPERSAND, WidgetKey::Ampersand),
    entry(keys::QUOTE, WidgetKey::Apostrophe),
    entry(keys::LEFTPAREN, WidgetKey::ParenLeft),
    entry(keys::RIGHTPAREN, WidgetKey::ParenRight),
    entry(keys::ASTERISK, WidgetKey::Asterisk),
    entry(keys::PLUS, WidgetKey::Plus),
    entry(keys::COMMA, WidgetKey::Comma),
    entry(keys::MINUS, WidgetKey::Minus),
    entry(keys::PERIOD, WidgetKey::Period),
    entry(keys::SLASH, WidgetKey::Slash),
    entry(keys::NUM_0, WidgetKey::Digit0),
    entry(keys::NUM_1, WidgetKey::Digit1),
    entry(keys::NUM_2, WidgetKey::Digit2),
    entry(keys::NUM_3, WidgetKey::Digit3),
    entry(keys::NUM_4, WidgetKey::Digit4),
    entry(keys::NUM_5, WidgetKey::Digit5),
    entry(keys::NUM_6, WidgetKey::Digit6),
    entry(keys::NUM_7, WidgetKey::Digit7),
    entry(keys::NUM_8, WidgetKey::Digit8),
    entry(keys::NUM_9, WidgetKey::Digit9),
    entry(keys::COLON, WidgetKey::Colon),
    entry(keys::SEMICOLON, WidgetKey::Semicolon),
    entry(keys::LESS, WidgetKey::Less),
    entry(keys::EQUALS, WidgetKey::Equal),
    entry(keys::GREATER, WidgetKey::Greater),
    entry(keys::QUESTION, WidgetKey::Question),
    entry(keys::AT, WidgetKey::At),
    entry(keys::LEFTBRACKET, WidgetKey::BracketLeft),
    entry(keys::BACKSLASH, WidgetKey::Backslash),
    entry(keys::RIGHTBRACKET, WidgetKey::BracketRight),
    entry(keys::CARET, WidgetKey::AsciiCircum),
    entry(keys::UNDERSCORE, WidgetKey::Underscore),
    entry(keys::BACKQUOTE, WidgetKey::QuoteLeft),
    entry(keys::LOWER_A, WidgetKey::A),
    entry(ascii(b'b'), WidgetKey::B),
    entry(ascii(b'c'), WidgetKey::C),
    entry(ascii(b'd'), WidgetKey::D),
    entry(ascii(b'e'), WidgetKey::E),
    entry(ascii(b'f'), WidgetKey::F),
    entry(ascii(b'g'), WidgetKey::G),
    entry(ascii(b'h'), WidgetKey::H),
    entry(ascii(b'i'), WidgetKey::I),
    entry(ascii(b'j'), WidgetKey::J),
    entry(ascii(b'k'), WidgetKey::K),
    entry(ascii(b'l'), WidgetKey::L),
    entry(ascii(b'm'), WidgetKey::M),
    entry(ascii(b'n'), WidgetKey::N),
    entry(ascii(b'o'), WidgetKey::O),
    entry(ascii(b'p'), WidgetKey::P),
    entry(ascii(b'q'), WidgetKey::Q),
    entry(ascii(b'r'), WidgetKey::R),
    entry(ascii(b's'), WidgetKey::S),
    entry(ascii(b't'), WidgetKey::T),
    entry(ascii(b'u'), WidgetKey::U),
    entry(ascii(b'v'), WidgetKey::V),
    entry(ascii(b'w'), WidgetKey::W),
    entry(ascii(b'x'), WidgetKey::X),
    entry(ascii(b'y'), WidgetKey::Y),
    entry(keys::LOWER_Z, WidgetKey::Z),
    entry(keys::DELETE, WidgetKey::Delete),
    entry(keys::KP0, WidgetKey::Digit0),
    entry(keypad(1), WidgetKey::Digit1),
    entry(keypad(2), WidgetKey::Digit2),
    entry(keypad(3), WidgetKey::Digit3),
    entry(keypad(4), WidgetKey::Digit4),
    entry(keypad(5), WidgetKey::Digit5),
    entry(keypad(6), WidgetKey::Digit6),
    entry(keypad(7), WidgetKey::Digit7),
    entry(keypad(8), WidgetKey::Digit8),
    entry(keys::KP9, WidgetKey::Digit9),
    entry(keys::KP_PERIOD, WidgetKey::Period),
    entry(keys::KP_DIVIDE, WidgetKey::Slash),
    entry(keys::KP_MULTIPLY, WidgetKey::Multiply),
    entry(keys::KP_MINUS, WidgetKey::Minus),
    entry(keys::KP_PLUS, WidgetKey::Plus),
    entry(keys::KP_ENTER, WidgetKey::Enter),
    entry(keys::KP_EQUALS, WidgetKey::Equal),
    entry(keys::UP, WidgetKey::Up),
    entry(keys::DOWN, WidgetKey::Down),
    entry(keys::RIGHT, WidgetKey::Right),
    entry(keys::LEFT, WidgetKey::Left),
    entry(keys::INSERT, WidgetKey::Insert),
    entry(keys::HOME, WidgetKey::Home),
    entry(keys::END, WidgetKey::End),
    entry(keys::PAGEUP, WidgetKey::PageUp),
    entry(keys::PAGEDOWN, WidgetKey::PageDown),
    entry(function(1), WidgetKey::F1),
    entry(function(2), WidgetKey::F2),
    entry(function(3), WidgetKey::F3),
    entry(function(4), WidgetKey::F4),
    entry(function(5), WidgetKey::F5),
    entry(function(6), WidgetKey::F6),
    entry(function(7), WidgetKey::F7),
    entry(function(8), WidgetKey::F8),
    entry(function(9), WidgetKey::F9),
    entry(function(10), WidgetKey::F10),
    entry(function(11), WidgetKey::F11),
    entry(function(12), WidgetKey::F12),
    entry(function(13), WidgetKey::F13),
    entry(function(14), WidgetKey::F14),
    entry(function(15), WidgetKey::F15),
    entry(keys::NUMLOCK, WidgetKey::NumLock),
    entry(keys::CAPSLOCK, WidgetKey::CapsLock),
    entry(keys::SCROLLOCK, WidgetKey::ScrollLock),
    entry(keys::RSHIFT, WidgetKey::Shift),
    entry(keys::LSHIFT, WidgetKey::Shift),
    entry(keys::RCTRL, WidgetKey::Control),
    entry(keys::LCTRL, WidgetKey::Control),
    entry(keys::RALT, WidgetKey::Alt),
    entry(keys::LALT, WidgetKey::Alt),
    entry(keys::RMETA, WidgetKey::Meta),
    entry(keys::LMETA, WidgetKey::Meta),
    entry(keys::LSUPER, WidgetKey::SuperL),
    entry(keys::RSUPER, WidgetKey::SuperR),
    entry(keys::MODE, WidgetKey::ModeSwitch),
    entry(keys::COMPOSE, WidgetKey::MultiKey),
    entry(keys::HELP, WidgetKey::Help),
    entry(keys::PRINT, WidgetKey::Print),
    entry(keys::SYSREQ, WidgetKey::SysReq),
    entry(keys::BREAK, WidgetKey::Pause),
    entry(keys::MENU, WidgetKey::Menu),
    entry(keys::POWER, WidgetKey::PowerOff),
    entry(keys::UNDO, WidgetKey::Undo),
];

pub fn lookup(code: u32) -> Option<WidgetKey> {
    KEY_TABLE
        .iter()
        .find(|entry| entry.code == code)
        .map(|entry| entry.key)
}

/// Translated key: identity, optional text payload and modifier set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyTranslation {
    pub key: WidgetKey,
    pub character: Option<char>,
    pub modifiers: WidgetModifiers,
}

impl KeyTranslation {
    pub const NEUTRAL: KeyTranslation = KeyTranslation {
        key: WidgetKey::None,
        character: None,
        modifiers: WidgetModifiers::empty(),
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

/// Maps a host key event to a widget key.
///
/// A zero key code means the host only knows the character: ASCII letters of
/// either case pass through as text on the neutral key. Anything else that
/// has no table entry becomes [`KeyTranslation::NEUTRAL`].
pub fn translate(code: u32, character: u32, mods: u16) -> KeyTranslation {
    let character = char::from_u32(character).filter(|c| *c != '\0');
    let modifiers = WidgetModifiers::from_host(KeyMods::from_bits_truncate(mods));

    if code == keys::UNKNOWN {
        return match character {
            Some(c) if c.is_ascii_alphabetic() => KeyTranslation {
                key: WidgetKey::None,
                character: Some(c),
                modifiers,
            },
            _ => KeyTranslation::NEUTRAL,
        };
    }

    match lookup(code) {
        Some(key) => KeyTranslation {
            key,
            character,
            modifiers,
        },
        None => {
            trace!("No widget key for host code {}", code);
            KeyTranslation::NEUTRAL
        }
    }
}

/// Raw key event exactly as the host reported it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub down: bool,
    pub code: u32,
    pub character: u32,
    pub modifiers: u16,
}

/// Keyboard gesture: only key-down produces output; the consumer turns it
/// into a press and release pair. Key-up is dropped.
pub fn on_raw_key(event: RawKeyEvent) -> Option<KeyTranslation> {
    if !event.down {
        return None;
    }
    let translation = translate(event.code, event.character, event.modifiers);
    debug!(
        "Key down: code {} -> {:?} {:?} {:?}",
        event.code, translation.key, translation.character, translation.modifiers
    );
    Some(translation)
}

/// Thread-safe FIFO between the host's key callback and the frame loop.
#[derive(Debug, Default)]
pub struct KeyQueue {
    events: Mutex<VecDeque<RawKeyEvent>>,
}

impl KeyQueue {
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, event: RawKeyEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }

    /// Takes every queued event in arrival order.
    pub fn drain(&self) -> Vec<RawKeyEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
