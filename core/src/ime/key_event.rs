//! Keyboard events as delivered by the host.
//!
//! Events mirror the DOM `KeyboardEvent` shape (`key`, `code`, modifiers) since
//! that is what hosts forward. `Key` is the normalized logical key the engine
//! switches on.
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// `KeyboardEvent.key` -> `KeyboardEvent.code` for non-alphanumeric keys.
///
/// Letters and digits are derived (`KeyA`, `Digit1`).
static KEY_TO_CODE: phf::Map<&'static str, &'static str> = phf_map! {
    "Backspace" => "Backspace",
    "Tab" => "Tab",
    "\t" => "Tab",
    "Enter" => "Enter",
    "Shift" => "ShiftLeft",
    "Control" => "ControlLeft",
    "Alt" => "AltLeft",
    "Pause" => "Pause",
    "CapsLock" => "CapsLock",
    "Escape" => "Escape",
    "Esc" => "Escape",
    " " => "Space",
    "Space" => "Space",
    "PageUp" => "PageUp",
    "PageDown" => "PageDown",
    "End" => "End",
    "Home" => "Home",
    "ArrowLeft" => "ArrowLeft",
    "ArrowUp" => "ArrowUp",
    "ArrowRight" => "ArrowRight",
    "ArrowDown" => "ArrowDown",
    "Left" => "ArrowLeft",
    "Up" => "ArrowUp",
    "Right" => "ArrowRight",
    "Down" => "ArrowDown",
    "Insert" => "Insert",
    "Delete" => "Delete",
    ";" => "Semicolon",
    "=" => "Equal",
    "," => "Comma",
    "-" => "Minus",
    "." => "Period",
    "/" => "Slash",
    "`" => "BackQuote",
    "[" => "BracketLeft",
    "\\" => "Backslash",
    "]" => "BracketRight",
    "'" => "Quote",
};

/// Shifted symbols on a US layout -> the physical key producing them.
static SHIFTED_TO_CODE: phf::Map<&'static str, &'static str> = phf_map! {
    "!" => "Digit1",
    "@" => "Digit2",
    "#" => "Digit3",
    "$" => "Digit4",
    "%" => "Digit5",
    "^" => "Digit6",
    "&" => "Digit7",
    "*" => "Digit8",
    "(" => "Digit9",
    ")" => "Digit0",
    ":" => "Semicolon",
    "+" => "Equal",
    "<" => "Comma",
    "_" => "Minus",
    ">" => "Period",
    "?" => "Slash",
    "~" => "BackQuote",
    "{" => "BracketLeft",
    "|" => "Backslash",
    "}" => "BracketRight",
    "\"" => "Quote",
};

/// `KeyboardEvent.code` -> unshifted key for punctuation codes.
static UNSHIFT_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "Semicolon" => ";",
    "Equal" => "=",
    "Comma" => ",",
    "Minus" => "-",
    "Period" => ".",
    "Slash" => "/",
    "BackQuote" => "`",
    "BracketLeft" => "[",
    "BracketRight" => "]",
    "Backslash" => "\\",
    "Quote" => "'",
};

/// Physical code for a logical key, if known.
pub fn key_to_code(key: &str) -> Option<String> {
    if let Some(code) = KEY_TO_CODE.get(key).or_else(|| SHIFTED_TO_CODE.get(key)) {
        return Some(code.to_string());
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(format!("Key{}", c.to_ascii_uppercase()))
        }
        (Some(c), None) if c.is_ascii_digit() => Some(format!("Digit{}", c)),
        _ => None,
    }
}

/// Unshifted key for a physical code (`KeyA` -> `a`, `Digit1` -> `1`).
pub fn unshift_code(code: &str) -> Option<String> {
    if let Some(k) = UNSHIFT_MAP.get(code) {
        return Some(k.to_string());
    }
    if let Some(rest) = code.strip_prefix("Key") {
        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return Some(c.to_ascii_lowercase().to_string());
            }
        }
    }
    if let Some(rest) = code.strip_prefix("Digit") {
        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_digit() {
                return Some(c.to_string());
            }
        }
    }
    None
}

/// Event type; only key-down events drive composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    KeyDown,
    KeyUp,
    Other,
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: EventKind,
    /// Logical key (`"a"`, `"A"`, `" "`, `"Backspace"`, `"Esc"`, ...).
    pub key: String,
    /// Physical key (`"KeyA"`, `"Space"`, ...).
    pub code: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    /// Key-down event for a logical key; the code is derived from the key.
    ///
    /// Upper-case letters and shifted symbols set `shift`.
    pub fn new(key: &str) -> Self {
        let code = key_to_code(key).unwrap_or_else(|| key.to_string());
        let shift = SHIFTED_TO_CODE.contains_key(key)
            || (key.chars().count() == 1 && key.chars().all(|c| c.is_ascii_uppercase()));
        Self {
            kind: EventKind::KeyDown,
            key: key.to_string(),
            code,
            ctrl: false,
            alt: false,
            shift,
            meta: false,
        }
    }

    /// Key-down event with an explicit physical code.
    pub fn with_code(key: &str, code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Self::new(key)
        }
    }

    pub fn key_up(key: &str) -> Self {
        Self {
            kind: EventKind::KeyUp,
            ..Self::new(key)
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn is_key_down(&self) -> bool {
        self.kind == EventKind::KeyDown
    }

    /// Ctrl, Alt or Meta held (Shift does not count).
    pub fn has_ctrl_alt_meta(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    /// Normalized logical key.
    pub fn logical_key(&self) -> Key {
        Key::from_name(&self.key)
    }

    /// The key as typed without Shift, derived from the physical code.
    pub fn unshifted_key(&self) -> String {
        unshift_code(&self.code).unwrap_or_else(|| self.key.clone())
    }
}

/// Normalized logical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Backspace,
    Delete,
    Escape,
    Enter,
    Tab,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    /// Anything else (function keys, modifiers alone, ...).
    Named(String),
}

impl Key {
    /// Parse a `KeyboardEvent.key` value, folding the ChromeOS spellings
    /// (`Esc`, `Up`, ...) into the W3C ones.
    pub fn from_name(name: &str) -> Self {
        match name {
            " " | "Space" => Key::Space,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Tab" | "\t" => Key::Tab,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Home" => Key::Home,
            "End" => Key::End,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Named(other.to_string()),
                }
            }
        }
    }

    /// Text the key would type, if it is printable (Space types `" "`).
    pub fn text(&self) -> Option<String> {
        match self {
            Key::Char(c) => Some(c.to_string()),
            Key::Space => Some(" ".to_string()),
            _ => None,
        }
    }
}
