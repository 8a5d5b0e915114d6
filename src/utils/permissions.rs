use crate::error::{MacroError, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::{info, warn};

const INPUT_DIR: &str = "/dev/input";
const UINPUT_DEVICE: &str = "/dev/uinput";

/// Проверить доступ к клавиатуре (чтение) и к uinput (запись)
pub fn check_permissions() -> Result<()> {
    info!("Проверка прав доступа...");

    check_input_devices_access()?;
    check_uinput_access()?;
    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_input_devices_access() -> Result<()> {
    if !Path::new(INPUT_DIR).exists() {
        return Err(MacroError::Permission(format!("Директория {} не существует", INPUT_DIR)));
    }

    fs::read_dir(INPUT_DIR).map_err(|e| {
        MacroError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            INPUT_DIR, e
        ))
    })?;

    info!("Доступ к {} подтвержден", INPUT_DIR);
    Ok(())
}

/// Пробное открытие на запись: учитывает и группы, и ACL сеанса
fn open_for_write(path: &Path) -> std::io::Result<()> {
    OpenOptions::new().write(true).open(path).map(|_| ())
}

fn check_uinput_access() -> Result<()> {
    let uinput = Path::new(UINPUT_DEVICE);
    if !uinput.exists() {
        return Err(MacroError::Permission(format!(
            "{} не существует, загрузите модуль: sudo modprobe uinput",
            UINPUT_DEVICE
        )));
    }

    open_for_write(uinput).map_err(|e| {
        MacroError::Permission(format!(
            "Нет прав записи в {}: {}. Добавьте пользователя в группу 'uinput' или 'input'",
            UINPUT_DEVICE, e
        ))
    })?;

    info!("Доступ к {} подтвержден", UINPUT_DEVICE);
    Ok(())
}

fn is_root() -> bool {
    std::env::var("USER").is_ok_and(|user| user == "root")
}

fn check_not_root() {
    if is_root() {
        warn!("⚠️  Приложение запущено от имени root!");
        warn!("   Рекомендуется: sudo usermod -a -G input,uinput $USER");
        warn!("   и запуск от имени обычного пользователя");
    }
}
