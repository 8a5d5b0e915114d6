use thiserror::Error;

#[derive(Error, Debug)]
pub enum MacroError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    /// Кадр не получен в этой итерации, итерация пропускается
    #[error("Ошибка захвата экрана: {0}")]
    Capture(String),

    #[error("Не удалось измерить масштаб дисплея: {0}")]
    ScaleProbe(String),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Неизвестная клавиша: {0}")]
    UnknownKey(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl MacroError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(MacroError::DeviceNotFound(msg.into()))
    }

    pub fn capture(msg: impl std::fmt::Display) -> Self {
        MacroError::Capture(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MacroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_message() {
        let err = MacroError::capture("монитор не найден");
        assert_eq!(err.to_string(), "Ошибка захвата экрана: монитор не найден");
    }

    #[test]
    fn test_device_not_found_helper() {
        let result: Result<()> = MacroError::device_not_found("/dev/input/event99");
        assert!(matches!(result, Err(MacroError::DeviceNotFound(path)) if path == "/dev/input/event99"));
    }
}
