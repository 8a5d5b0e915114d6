use crate::error::{MacroError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти клавиатуру для прослушивания горячей клавиши
    pub fn find_keyboard_device(device_path: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                MacroError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        info!("Начинаем автопоиск клавиатурного устройства...");

        if let Some(device) = Self::find_by_id()? {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        if let Some(device) = Self::find_by_event_devices()? {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        MacroError::device_not_found(
            "Не удалось найти клавиатурное устройство. \
             Убедитесь, что пользователь добавлен в группу 'input'",
        )
    }

    fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir)
            .map_err(|e| MacroError::Permission(format!("Нет доступа к {:?}: {}", dir, e)))?;

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();
        Ok(paths)
    }

    fn file_name(path: &Path) -> &str {
        path.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }

    /// Приоритет имени в /dev/input/by-id; `None` для не-клавиатур
    fn by_id_priority(name: &str) -> Option<u8> {
        if !name.contains("event") || name.to_lowercase().contains("mouse") {
            return None;
        }
        if name.ends_with("event-kbd") {
            Some(100)
        } else if name.to_lowercase().contains("keyboard") {
            Some(50)
        } else if name.contains("kbd") {
            Some(10)
        } else {
            None
        }
    }

    fn find_by_id() -> Result<Option<PathBuf>> {
        let by_id_dir = Path::new("/dev/input/by-id");
        if !by_id_dir.exists() {
            debug!("Директория /dev/input/by-id не существует");
            return Ok(None);
        }

        let mut candidates: Vec<(PathBuf, u8)> = Self::list_dir(by_id_dir)?
            .into_iter()
            .filter_map(|path| Self::by_id_priority(Self::file_name(&path)).map(|p| (path, p)))
            .filter(|(path, _)| Self::is_keyboard_device(path))
            .collect();

        candidates.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(candidates.into_iter().next().map(|(path, _)| path))
    }

    fn find_by_event_devices() -> Result<Option<PathBuf>> {
        let device = Self::list_dir(Path::new("/dev/input"))?
            .into_iter()
            .filter(|path| Self::file_name(path).starts_with("event"))
            .find(|path| Self::is_keyboard_device(path));
        Ok(device)
    }

    fn is_keyboard_device(device_path: &Path) -> bool {
        let device = match evdev::Device::open(device_path) {
            Ok(device) => device,
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                return false;
            }
        };

        let device_name = device.name().unwrap_or("Unknown").to_lowercase();
        if ["mouse", "touchpad", "trackpoint"].iter().any(|n| device_name.contains(n)) {
            debug!("Исключаем устройство как мышь/тачпад: {:?} ({})", device_path, device_name);
            return false;
        }

        // У настоящей клавиатуры много клавиш, включая буквы и цифры
        let has_keys = device.supported_keys().is_some_and(|keys| {
            keys.contains(evdev::KeyCode::KEY_A)
                && keys.contains(evdev::KeyCode::KEY_1)
                && keys.contains(evdev::KeyCode::KEY_ENTER)
                && keys.iter().count() > 20
        });

        debug!("Устройство {:?} ({}): клавиатура = {}", device_path, device_name, has_keys);
        has_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keyboard_device_with_specific_path() {
        let result = DeviceFinder::find_keyboard_device("/non/existent/path");
        assert!(matches!(result, Err(MacroError::DeviceNotFound(_))));
    }

    #[test]
    fn test_by_id_priority() {
        assert_eq!(DeviceFinder::by_id_priority("usb-Logitech_K120-event-kbd"), Some(100));
        assert_eq!(DeviceFinder::by_id_priority("usb-Some_Keyboard-if01-event-joystick"), Some(50));
        assert_eq!(DeviceFinder::by_id_priority("usb-Razer_DeathAdder-event-mouse"), None);
        assert_eq!(DeviceFinder::by_id_priority("usb-Logitech_K120-kbd"), None);
    }
}
