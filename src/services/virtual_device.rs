use crate::error::{MacroError, Result};
use crate::events::{KeyCode, KeyState, VirtualKeyEvent};
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

/// Получатель синтетических нажатий.
///
/// `release` для неудержанной клавиши не является ошибкой.
pub trait KeySink: Send + Sync {
    fn press(&self, key: KeyCode) -> Result<()>;
    fn release(&self, key: KeyCode) -> Result<()>;
}

pub struct VirtualDevice {
    device: Option<Mutex<uinput::Device>>,
    device_name: String,
    dry_run: bool,
    // Клавиши, для которых было отправлено нажатие без отпускания
    pressed: Mutex<SmallVec<[KeyCode; 8]>>,
}

impl VirtualDevice {
    pub fn new(device_name: &str, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Mutex::new(Self::create_virtual_device(device_name)?))
        };

        Ok(Self {
            device,
            device_name: device_name.to_string(),
            dry_run,
            pressed: Mutex::new(SmallVec::new()),
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для инъекции клавиш", device_name);

        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .create()
            .map_err(|e| {
                MacroError::Internal(format!(
                    "Не удалось создать виртуальное устройство '{}': {}",
                    device_name, e
                ))
            })?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    pub fn send_event(&self, event: VirtualKeyEvent) -> Result<()> {
        {
            let mut pressed = self.pressed.lock();
            match event.state {
                KeyState::Pressed => {
                    if !pressed.contains(&event.key_code) {
                        pressed.push(event.key_code);
                    }
                }
                KeyState::Released => pressed.retain(|key| *key != event.key_code),
                KeyState::Repeat => {}
            }
        }

        if self.dry_run {
            info!("[DRY RUN] Виртуальное событие: {} {:?}", event.key_code, event.state);
            return Ok(());
        }

        let device = self
            .device
            .as_ref()
            .ok_or_else(|| MacroError::Internal("Виртуальное устройство недоступно".to_string()))?;
        let mut device = device.lock();

        let keycode = i32::from(event.key_code.value());
        device.write(1, keycode, event.state.evdev_value()).map_err(|e| {
            MacroError::Internal(format!("Не удалось отправить событие клавиши {}: {}", keycode, e))
        })?;
        device
            .synchronize()
            .map_err(|e| MacroError::Internal(format!("Не удалось синхронизировать события: {}", e)))?;

        debug!("Виртуальное событие {} {:?} отправлено", event.key_code, event.state);
        Ok(())
    }

    #[cfg(test)]
    pub fn pressed_keys(&self) -> Vec<KeyCode> {
        self.pressed.lock().to_vec()
    }

    /// Отпустить всё, что могло остаться нажатым
    pub fn release_all_keys(&self) -> Result<()> {
        let keys: SmallVec<[KeyCode; 8]> = std::mem::take(&mut *self.pressed.lock());
        if keys.is_empty() {
            return Ok(());
        }

        info!("Отпускание {} оставшихся клавиш на '{}'", keys.len(), self.device_name);
        let mut last_error = None;
        for key in keys {
            if let Err(e) = self.send_event(VirtualKeyEvent::release(key)) {
                warn!("Не удалось отпустить {}: {}", key, e);
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl KeySink for VirtualDevice {
    fn press(&self, key: KeyCode) -> Result<()> {
        self.send_event(VirtualKeyEvent::press(key))
    }

    fn release(&self, key: KeyCode) -> Result<()> {
        self.send_event(VirtualKeyEvent::release(key))
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}
