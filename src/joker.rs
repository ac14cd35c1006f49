//! Button-combination ("joker") masks for PS2, GameCube, Wii and GBA pads.
//!
//! A mask is four hex digits. Each digit packs up to four buttons, bit 0 first.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;
use crate::statics;

/// Platform named in a `[Joker:<platform>]` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JokerPlatform {
    Ps2,
    GameCube,
    Wii,
    Gba,
    /// Ask the user which platform to use.
    All,
}

impl JokerPlatform {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "PS2" => Some(JokerPlatform::Ps2),
            "GC" | "NGC" | "GAMECUBE" => Some(JokerPlatform::GameCube),
            "WII" => Some(JokerPlatform::Wii),
            "GBA" => Some(JokerPlatform::Gba),
            "ALL" => Some(JokerPlatform::All),
            _ => None,
        }
    }
}

/// Physical controller layout for Wii codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WiiLayout {
    #[default]
    Wiimote,
    Classic,
    GameCube,
}

/// A concrete button layout with its own nibble assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Ps2,
    GameCube,
    /// Wiimote, optionally with a Nunchuk (C/Z).
    Wiimote,
    Classic,
    Gba,
}

type Digits = [[&'static str; 4]; 4];

// Digit 0 is the leftmost (most significant) hex digit.
const PS2_DIGITS: Digits = [
    ["Triangle", "Circle", "Cross", "Square"],
    ["L2", "R2", "L1", "R1"],
    ["Up", "Right", "Down", "Left"],
    ["Select", "L3", "R3", "Start"],
];

const GC_DIGITS: Digits = [
    ["Start", "", "", ""],
    ["A", "B", "X", "Y"],
    ["Z", "R", "L", ""],
    ["Left", "Right", "Down", "Up"],
];

const WIIMOTE_DIGITS: Digits = [
    ["Minus", "Z", "C", "Home"],
    ["Two", "One", "B", "A"],
    ["Plus", "", "", ""],
    ["Left", "Right", "Down", "Up"],
];

const CLASSIC_DIGITS: Digits = [
    ["Minus", "L", "Down", "Right"],
    ["", "R", "Plus", "Home"],
    ["A", "Y", "B", "ZL"],
    ["Up", "Left", "ZR", "X"],
];

const GBA_DIGITS: Digits = [
    ["", "", "", ""],
    ["R", "L", "", ""],
    ["Right", "Left", "Up", "Down"],
    ["A", "B", "Select", "Start"],
];

const PS2_ORDER: &[&str] = &[
    "Select", "L3", "R3", "Start", "Up", "Right", "Down", "Left", "L2", "R2", "L1", "R1",
    "Triangle", "Circle", "Cross", "Square",
];
const GC_ORDER: &[&str] = &[
    "Start", "A", "B", "X", "Y", "Z", "L", "R", "Up", "Down", "Left", "Right",
];
const WIIMOTE_ORDER: &[&str] = &[
    "Home", "Plus", "Minus", "A", "B", "One", "Two", "C", "Z", "Up", "Down", "Left", "Right",
];
const CLASSIC_ORDER: &[&str] = &[
    "Home", "Plus", "Minus", "A", "B", "X", "Y", "L", "R", "ZL", "ZR", "Up", "Down", "Left",
    "Right",
];
const GBA_ORDER: &[&str] = &[
    "Start", "Select", "A", "B", "L", "R", "Up", "Down", "Left", "Right",
];

impl Controller {
    fn digits(self) -> &'static Digits {
        match self {
            Controller::Ps2 => &PS2_DIGITS,
            Controller::GameCube => &GC_DIGITS,
            Controller::Wiimote => &WIIMOTE_DIGITS,
            Controller::Classic => &CLASSIC_DIGITS,
            Controller::Gba => &GBA_DIGITS,
        }
    }

    /// Buttons in the order they are listed in "Press ..." labels.
    pub fn buttons(self) -> &'static [&'static str] {
        match self {
            Controller::Ps2 => PS2_ORDER,
            Controller::GameCube => GC_ORDER,
            Controller::Wiimote => WIIMOTE_ORDER,
            Controller::Classic => CLASSIC_ORDER,
            Controller::Gba => GBA_ORDER,
        }
    }

    /// Whether the platform's codes may ask for an inverted mask.
    pub fn supports_reverse(self) -> bool {
        matches!(
            self,
            Controller::Ps2 | Controller::Wiimote | Controller::Classic
        )
    }

    pub fn for_platform(platform: JokerPlatform, wii: WiiLayout) -> Option<Self> {
        match platform {
            JokerPlatform::Ps2 => Some(Controller::Ps2),
            JokerPlatform::GameCube => Some(Controller::GameCube),
            JokerPlatform::Gba => Some(Controller::Gba),
            JokerPlatform::Wii => Some(match wii {
                WiiLayout::Wiimote => Controller::Wiimote,
                WiiLayout::Classic => Controller::Classic,
                WiiLayout::GameCube => Controller::GameCube,
            }),
            JokerPlatform::All => None,
        }
    }

    /// Map a user-typed name (any case, a few aliases) onto the canonical one.
    pub fn canonical(self, name: &str) -> Option<&'static str> {
        let wanted = name.trim().to_ascii_uppercase();
        let wanted = match (self, wanted.as_str()) {
            (Controller::Ps2, "X") => "CROSS".to_string(),
            (Controller::Ps2, "O") => "CIRCLE".to_string(),
            (Controller::Wiimote, "1") => "ONE".to_string(),
            (Controller::Wiimote, "2") => "TWO".to_string(),
            (Controller::Wiimote | Controller::Classic, "+") => "PLUS".to_string(),
            (Controller::Wiimote | Controller::Classic, "-") => "MINUS".to_string(),
            _ => wanted,
        };
        self.buttons()
            .iter()
            .copied()
            .find(|b| b.eq_ignore_ascii_case(&wanted))
    }

    /// OR together the bits of every pressed button.
    pub fn mask<S: AsRef<str>>(self, pressed: &[S]) -> Result<u16, EncodeError> {
        let mut mask = 0u16;
        for name in pressed {
            let name = name.as_ref();
            let button = self
                .canonical(name)
                .ok_or_else(|| EncodeError::Format(format!("unknown button '{name}'")))?;
            for (digit, bits) in self.digits().iter().enumerate() {
                if let Some(bit) = bits.iter().position(|b| *b == button) {
                    let shift = 4 * (3 - digit) + bit;
                    mask |= 1 << shift;
                }
            }
        }
        Ok(mask)
    }

    /// `Press A+B`, in canonical order.
    pub fn press_label<S: AsRef<str>>(self, pressed: &[S]) -> String {
        let names: Vec<&str> = pressed
            .iter()
            .filter_map(|p| self.canonical(p.as_ref()))
            .collect();
        let combo: Vec<&str> = self
            .buttons()
            .iter()
            .copied()
            .filter(|b| names.contains(b))
            .collect();
        if combo.is_empty() {
            statics::EN_NO_BUTTONS.to_string()
        } else {
            format!("{}{}", statics::EN_PRESS_PREFIX, combo.join("+"))
        }
    }
}

pub fn mask_ps2<S: AsRef<str>>(pressed: &[S]) -> Result<u16, EncodeError> {
    Controller::Ps2.mask(pressed)
}

pub fn mask_gc_be<S: AsRef<str>>(pressed: &[S]) -> Result<u16, EncodeError> {
    Controller::GameCube.mask(pressed)
}

/// GameCube mask with its two bytes swapped.
pub fn mask_gc_le<S: AsRef<str>>(pressed: &[S]) -> Result<u16, EncodeError> {
    Ok(mask_gc_be(pressed)?.swap_bytes())
}

pub fn mask_wiimote<S: AsRef<str>>(pressed: &[S]) -> Result<u16, EncodeError> {
    Controller::Wiimote.mask(pressed)
}

pub fn mask_classic<S: AsRef<str>>(pressed: &[S]) -> Result<u16, EncodeError> {
    Controller::Classic.mask(pressed)
}

pub fn mask_gba<S: AsRef<str>>(pressed: &[S]) -> Result<u16, EncodeError> {
    Controller::Gba.mask(pressed)
}

/// Nibble-wise complement: every digit `v` becomes `0xF - v`.
pub fn reverse_mask(mask: u16) -> u16 {
    (0..4).fold(0, |acc, i| {
        let nibble = (mask >> (4 * i)) & 0xF;
        acc | ((0xF - nibble) << (4 * i))
    })
}

/// `reverse_mask` for a four-digit hex string.
pub fn reverse_mask_str(mask: &str) -> Option<String> {
    if mask.len() != 4 {
        return None;
    }
    let value = u16::from_str_radix(mask, 16).ok()?;
    Some(format_mask(reverse_mask(value)))
}

pub fn format_mask(mask: u16) -> String {
    format!("{mask:04X}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JokerOptions {
    /// Swap the GameCube mask into little-endian byte order.
    pub little_endian: bool,
    pub reverse: bool,
}

/// Final four-digit value for a button combination on `controller`.
pub fn joker_value<S: AsRef<str>>(
    controller: Controller,
    pressed: &[S],
    options: JokerOptions,
) -> Result<String, EncodeError> {
    let mut mask = controller.mask(pressed)?;
    if controller == Controller::GameCube && options.little_endian {
        mask = mask.swap_bytes();
    }
    if options.reverse && controller.supports_reverse() {
        mask = reverse_mask(mask);
    }
    Ok(format_mask(mask))
}
