use crate::config::Config;
use crate::control::ControlSurface;
use crate::debug_if_enabled;
use crate::error::{MacroError, Result};
use crate::events::{KeyCode, KeyEvent, KeyState};
use crate::utils::DeviceFinder;
use evdev::{Device, EventType};
use std::sync::Arc;
use tracing::{debug, info};

use super::r#trait::HotkeyListenerTrait;
use super::toggle_filter::ToggleFilter;

/// Слушает клавиатуру через evdev без эксклюзивного захвата:
/// пользовательский ввод проходит к остальным приложениям как обычно.
pub struct RealHotkeyListener {
    control: Arc<ControlSurface>,
    filter: ToggleFilter,
    device: Device,
    device_name: String,
}

impl RealHotkeyListener {
    pub fn new(config: Arc<Config>, control: Arc<ControlSurface>) -> Result<Self> {
        info!("Инициализация RealHotkeyListener");

        let filter = ToggleFilter::new(&config.input.toggle_key)?;
        let device_path = DeviceFinder::find_keyboard_device(&config.input.device_path)?;

        let device = Device::open(&device_path).map_err(|e| {
            MacroError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;
        let device_name = device.name().unwrap_or("Unknown").to_string();

        info!("Устройство: {} ({:?})", device_name, device_path);
        info!("Клавиша переключения: {} ({})", filter.toggle_name(), filter.toggle_code());

        Ok(Self {
            control,
            filter,
            device,
            device_name,
        })
    }

    async fn run_impl(self) -> Result<()> {
        let Self {
            control,
            filter,
            device,
            device_name,
        } = self;

        let mut events = device.into_event_stream()?;
        info!("RealHotkeyListener запущен, начинаем чтение событий");

        loop {
            let event = events.next_event().await?;
            if event.event_type() != EventType::KEY {
                continue;
            }

            let Some(state) = KeyState::from_evdev_value(event.value()) else {
                debug!("Неизвестное значение события: {}", event.value());
                continue;
            };

            let key_event = KeyEvent::new(KeyCode(event.code()), state, device_name.clone());
            debug_if_enabled!("Событие клавиши: {}", key_event);

            if filter.matches(&key_event) {
                let state = control.toggle();
                info!("Клавиша '{}': переключение в {:?}", filter.toggle_name(), state);
            }
        }
    }
}

#[async_trait::async_trait]
impl HotkeyListenerTrait for RealHotkeyListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
