// Logical key name to tracker key code resolution.
// Invariants: resolution never fails; unknown names degrade to JUNK_KEY.

use std::collections::HashMap;

pub const F1_KEY: u16 = 0x3B00;
pub const F2_KEY: u16 = 0x3C00;
pub const F3_KEY: u16 = 0x3D00;
pub const F4_KEY: u16 = 0x3E00;
pub const F5_KEY: u16 = 0x3F00;
pub const F6_KEY: u16 = 0x4000;
pub const F7_KEY: u16 = 0x4100;
pub const F8_KEY: u16 = 0x4200;
pub const F9_KEY: u16 = 0x4300;
pub const F10_KEY: u16 = 0x4400;
pub const PAGE_UP: u16 = 0x4900;
pub const PAGE_DOWN: u16 = 0x5100;
pub const CURS_UP: u16 = 0x4800;
pub const CURS_DOWN: u16 = 0x5000;
pub const CURS_LEFT: u16 = 0x4B00;
pub const CURS_RIGHT: u16 = 0x4D00;
pub const ENTER_KEY: u16 = 13;
pub const ESC_KEY: u16 = 27;

/// Sentinel returned for names the tracker has no code for.
pub const JUNK_KEY: u16 = 1;

/// Lookup table from logical key name to tracker key code, built once at
/// startup. Merges the legacy lowercase naming convention with the browser
/// `KeyboardEvent.key` convention into one table keyed by the lowercase
/// canonical name.
pub struct KeyMap {
    table: HashMap<String, u16>,
}

impl KeyMap {
    pub fn new() -> Self {
        let legacy: &[(&str, u16)] = &[
            ("f1", F1_KEY),
            ("f2", F2_KEY),
            ("f3", F3_KEY),
            ("f4", F4_KEY),
            ("f5", F5_KEY),
            ("f6", F6_KEY),
            ("f7", F7_KEY),
            ("f8", F8_KEY),
            ("f9", F9_KEY),
            ("f10", F10_KEY),
            ("pageup", PAGE_UP),
            ("pagedown", PAGE_DOWN),
            ("up", CURS_UP),
            ("down", CURS_DOWN),
            ("left", CURS_LEFT),
            ("right", CURS_RIGHT),
            ("return", ENTER_KEY),
            ("escape", ESC_KEY),
            ("num_add", 43),
            ("equal", 43),
            ("num_subtract", 45),
            ("minus", 45),
            ("backspace", 8),
            ("space", 32),
            ("tab", 9),
        ];
        let browser: &[(&str, u16)] = &[
            ("ArrowUp", CURS_UP),
            ("ArrowDown", CURS_DOWN),
            ("ArrowLeft", CURS_LEFT),
            ("ArrowRight", CURS_RIGHT),
            ("PageUp", PAGE_UP),
            ("PageDown", PAGE_DOWN),
            ("Enter", ENTER_KEY),
            ("Escape", ESC_KEY),
            ("NumpadAdd", 43),
            ("Equal", 43),
            ("NumpadSubtract", 45),
            ("Minus", 45),
            ("Backspace", 8),
            (" ", 32),
            ("Tab", 9),
        ];

        let mut table = HashMap::new();
        for (name, code) in legacy.iter().chain(browser.iter()) {
            table.insert(name.to_ascii_lowercase(), *code);
        }
        Self { table }
    }

    /// Resolves a logical key name to a tracker key code. A single ASCII
    /// letter outside the table maps to its character code; anything else
    /// maps to [`JUNK_KEY`].
    pub fn resolve(&self, keycode: &str) -> u16 {
        if let Some(code) = self.table.get(&keycode.to_ascii_lowercase()) {
            return *code;
        }
        let mut chars = keycode.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if letter.is_ascii_alphabetic() => letter as u16,
            _ => JUNK_KEY,
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}
