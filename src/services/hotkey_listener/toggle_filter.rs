use crate::error::Result;
use crate::events::{KeyCode, KeyEvent, KeyState};
use crate::services::keycode_map::KeycodeMap;

/// Решает, является ли событие нажатием клавиши переключения.
///
/// Повторы и отпускания игнорируются, как и коды без имени в таблице клавиш.
#[derive(Debug, Clone)]
pub struct ToggleFilter {
    toggle_name: &'static str,
    toggle_code: KeyCode,
}

impl ToggleFilter {
    pub fn new(toggle_key: &str) -> Result<Self> {
        let toggle_code = KeycodeMap::get_keycode(toggle_key)?;
        // Имя из таблицы, а не из конфигурации: так сравнение не зависит от регистра
        let toggle_name = KeycodeMap::get_key_name(toggle_code).unwrap_or("?");
        Ok(Self {
            toggle_name,
            toggle_code,
        })
    }

    pub fn toggle_name(&self) -> &'static str {
        self.toggle_name
    }

    pub fn toggle_code(&self) -> KeyCode {
        self.toggle_code
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.state != KeyState::Pressed {
            return false;
        }
        match KeycodeMap::get_key_name(event.key_code) {
            Some(_) => event.key_code == self.toggle_code,
            None => false,
        }
    }

    /// Строка из stdin в сухом режиме
    pub fn matches_line(&self, line: &str) -> bool {
        KeycodeMap::get_keycode(line).is_ok_and(|code| code == self.toggle_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(code: u16, state: KeyState) -> KeyEvent {
        KeyEvent::new(KeyCode(code), state, "test".to_string())
    }

    #[test]
    fn test_matches_toggle_press_only() {
        let filter = ToggleFilter::new("1").unwrap();
        assert_eq!(filter.toggle_code(), KeyCode(2));
        assert!(filter.matches(&event(2, KeyState::Pressed)));
        assert!(!filter.matches(&event(2, KeyState::Released)));
        assert!(!filter.matches(&event(2, KeyState::Repeat)));
    }

    #[test]
    fn test_ignores_other_and_unknown_keys() {
        let filter = ToggleFilter::new("1").unwrap();
        assert!(!filter.matches(&event(30, KeyState::Pressed)));
        assert!(!filter.matches(&event(0x2ff, KeyState::Pressed)));
    }

    #[test]
    fn test_matches_line() {
        let filter = ToggleFilter::new("F8").unwrap();
        assert_eq!(filter.toggle_name(), "f8");
        assert!(filter.matches_line("f8"));
        assert!(filter.matches_line(" F8 "));
        assert!(!filter.matches_line("1"));
        assert!(!filter.matches_line(""));
    }

    #[test]
    fn test_unknown_toggle_key() {
        assert!(ToggleFilter::new("hyper").is_err());
    }
}
