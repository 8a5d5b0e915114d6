use crate::config::Config;
use crate::control::ControlSurface;
use crate::error::Result;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::r#trait::HotkeyListenerTrait;
use super::toggle_filter::ToggleFilter;

/// Сухой режим: вместо клавиатуры читаются строки из stdin
pub struct DryRunHotkeyListener {
    control: Arc<ControlSurface>,
    filter: ToggleFilter,
}

impl DryRunHotkeyListener {
    pub fn new(config: Arc<Config>, control: Arc<ControlSurface>) -> Result<Self> {
        info!("Инициализация DryRunHotkeyListener");
        Ok(Self {
            control,
            filter: ToggleFilter::new(&config.input.toggle_key)?,
        })
    }

    async fn run_impl(self) -> Result<()> {
        info!(
            "Dry-run режим - введите '{}' и Enter для переключения",
            self.filter.toggle_name()
        );

        // Блокирующее чтение stdin идёт в отдельном потоке вне runtime
        let (tx, mut lines) = mpsc::unbounded_channel::<String>();
        std::thread::Builder::new()
            .name("dry-run-stdin".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        while let Some(line) = lines.recv().await {
            if self.filter.matches_line(&line) {
                let state = self.control.toggle();
                info!("Dry-run: переключение в {:?}", state);
            } else {
                debug!("Dry-run: строка '{}' проигнорирована", line.trim());
            }
        }

        info!("stdin закрыт, DryRunHotkeyListener завершает работу");
        Ok(())
    }
}

#[async_trait::async_trait]
impl HotkeyListenerTrait for DryRunHotkeyListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
