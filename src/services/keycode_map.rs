use crate::error::{MacroError, Result};
use crate::events::KeyCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Маппинг между именами клавиш и кодами evdev
pub struct KeycodeMap;

// Имена клавиш в нижнем регистре и их коды evdev
const KEY_TABLE: &[(&str, u16)] = &[
    // Буквенные клавиши
    ("a", 30), ("b", 48), ("c", 46), ("d", 32), ("e", 18), ("f", 33), ("g", 34),
    ("h", 35), ("i", 23), ("j", 36), ("k", 37), ("l", 38), ("m", 50), ("n", 49),
    ("o", 24), ("p", 25), ("q", 16), ("r", 19), ("s", 31), ("t", 20), ("u", 22),
    ("v", 47), ("w", 17), ("x", 45), ("y", 21), ("z", 44),
    // Цифровые клавиши (верхний ряд)
    ("1", 2), ("2", 3), ("3", 4), ("4", 5), ("5", 6),
    ("6", 7), ("7", 8), ("8", 9), ("9", 10), ("0", 11),
    // Специальные клавиши
    ("space", 57), ("enter", 28), ("escape", 1), ("backspace", 14), ("tab", 15),
    ("semicolon", 39), ("comma", 51), ("dot", 52), ("slash", 53),
    // Функциональные клавиши
    ("f1", 59), ("f2", 60), ("f3", 61), ("f4", 62), ("f5", 63), ("f6", 64),
    ("f7", 65), ("f8", 66), ("f9", 67), ("f10", 68), ("f11", 87), ("f12", 88),
    // Модификаторы
    ("ctrl", 29), ("alt", 56), ("shift", 42), ("super", 125),
    // Стрелки
    ("up", 103), ("down", 108), ("left", 105), ("right", 106),
];

static KEY_NAME_TO_CODE: Lazy<HashMap<&'static str, u16>> =
    Lazy::new(|| KEY_TABLE.iter().copied().collect());

static CODE_TO_KEY_NAME: Lazy<HashMap<u16, &'static str>> =
    Lazy::new(|| KEY_TABLE.iter().map(|&(name, code)| (code, name)).collect());

impl KeycodeMap {
    /// Получить код клавиши по её имени (регистр не важен)
    pub fn get_keycode(key_name: &str) -> Result<KeyCode> {
        let normalized = key_name.trim().to_lowercase();
        KEY_NAME_TO_CODE
            .get(normalized.as_str())
            .map(|&code| KeyCode(code))
            .ok_or_else(|| MacroError::UnknownKey(key_name.to_string()))
    }

    /// Получить имя клавиши по её коду
    pub fn get_key_name(key_code: KeyCode) -> Option<&'static str> {
        CODE_TO_KEY_NAME.get(&key_code.value()).copied()
    }

    pub fn is_known(key_name: &str) -> bool {
        Self::get_keycode(key_name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_key_mapping() {
        assert_eq!(KeycodeMap::get_keycode("a").unwrap(), KeyCode(30));
        assert_eq!(KeycodeMap::get_keycode("g").unwrap(), KeyCode(34));
        assert_eq!(KeycodeMap::get_keycode("1").unwrap(), KeyCode(2));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(KeycodeMap::get_keycode("S").unwrap(), KeyCode(31));
        assert_eq!(KeycodeMap::get_keycode(" SPACE ").unwrap(), KeyCode(57));
    }

    #[test]
    fn test_reverse_mapping() {
        assert_eq!(KeycodeMap::get_key_name(KeyCode(32)), Some("d"));
        assert_eq!(KeycodeMap::get_key_name(KeyCode(2)), Some("1"));
        assert_eq!(KeycodeMap::get_key_name(KeyCode(0xfff)), None);
    }

    #[test]
    fn test_invalid_key() {
        let err = KeycodeMap::get_keycode("invalid_key").unwrap_err();
        assert!(matches!(err, MacroError::UnknownKey(name) if name == "invalid_key"));
        assert!(!KeycodeMap::is_known("invalid_key"));
    }

    #[test]
    fn test_table_has_no_duplicate_codes() {
        assert_eq!(CODE_TO_KEY_NAME.len(), KEY_TABLE.len());
        assert_eq!(KEY_NAME_TO_CODE.len(), KEY_TABLE.len());
    }
}
