use super::actuator::{Actuator, KeyCommand};
use super::frame::BrightnessFrame;
use super::geometry::{CaptureRegion, Layout, PixelRect};
use super::lane::{Detection, LaneDetector};
use crate::control::{ControlSurface, RunState, StatusBoard, StatusKind};
use crate::debug_if_enabled;
use crate::events::KeyCode;
use crate::services::capture::FrameSource;
use crate::services::virtual_device::KeySink;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Одна отслеживаемая зона экрана и её клавиша
#[derive(Debug)]
pub struct Lane {
    pub key_name: String,
    pub key_code: KeyCode,
    pub pixels: PixelRect,
    detector: LaneDetector,
    actuator: Actuator,
}

impl Lane {
    pub fn new(key_name: impl Into<String>, key_code: KeyCode, pixels: PixelRect) -> Self {
        Self {
            key_name: key_name.into(),
            key_code,
            pixels,
            detector: LaneDetector::new(),
            actuator: Actuator::new(),
        }
    }

    #[cfg(test)]
    pub fn is_held(&self) -> bool {
        self.actuator.is_held()
    }

    #[cfg(test)]
    pub fn baseline(&self) -> Option<&BrightnessFrame> {
        self.detector.previous()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub threshold: f64,
    pub cooldown: Duration,
    pub idle_sleep: Duration,
}

/// Итог одной итерации цикла
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Пауза: удержанные клавиши отпущены, цикл должен подождать
    Idle,
    CaptureFailed,
    Baselined,
    Detected { commands: usize },
    Shutdown,
}

pub struct DetectionEngine<S: FrameSource> {
    source: S,
    sink: Arc<dyn KeySink>,
    control: Arc<ControlSurface>,
    status: Arc<StatusBoard>,
    region: CaptureRegion,
    lanes: Vec<Lane>,
    settings: EngineSettings,
}

impl<S: FrameSource> DetectionEngine<S> {
    /// `keys` идут в том же порядке, что и прямоугольники в `layout.lanes`
    pub fn new(
        source: S,
        sink: Arc<dyn KeySink>,
        control: Arc<ControlSurface>,
        status: Arc<StatusBoard>,
        layout: &Layout,
        keys: Vec<(String, KeyCode)>,
        settings: EngineSettings,
    ) -> Self {
        let lanes = keys
            .into_iter()
            .zip(layout.lanes.iter().copied())
            .map(|((name, code), pixels)| Lane::new(name, code, pixels))
            .collect();

        Self {
            source,
            sink,
            control,
            status,
            region: layout.region,
            lanes,
            settings,
        }
    }

    #[cfg(test)]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Крутить итерации до запроса завершения
    pub fn run(&mut self) {
        info!("Цикл детекции запущен: {} дорожек, область {:?}", self.lanes.len(), self.region);

        let mut last_state = None;
        loop {
            let state = self.control.run_state();
            if last_state != Some(state) {
                info!("Состояние: {:?}", state);
                last_state = Some(state);
            }

            match self.tick(Instant::now()) {
                TickOutcome::Shutdown => break,
                TickOutcome::Idle => std::thread::sleep(self.settings.idle_sleep),
                _ => {}
            }
        }

        info!("Цикл детекции остановлен");
    }

    /// Одна итерация: захват → детекция → нажатия, строго в этом порядке
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.control.shutdown_requested() {
            self.release_held("завершение работы");
            return TickOutcome::Shutdown;
        }

        let state = self.control.run_state();
        self.status.set(StatusKind::from(state));

        if state == RunState::Paused {
            self.release_held("пауза");
            return TickOutcome::Idle;
        }

        // Запрос забирается до захвата: повторный вход в `Running` во время
        // этой итерации выставит новый запрос для следующей
        let reset = self.control.take_reset();

        let brightness = match self
            .source
            .capture(&self.region)
            .and_then(|frame| BrightnessFrame::from_raw(&frame))
        {
            Ok(brightness) => brightness,
            Err(e) => {
                if reset {
                    self.control.restore_reset();
                }
                warn!("Ошибка захвата, итерация пропущена: {}", e);
                return TickOutcome::CaptureFailed;
            }
        };

        if reset {
            for lane in &mut self.lanes {
                lane.detector.rebaseline(brightness.slice(&lane.pixels));
            }
            info!("Базовые кадры обновлены для {} дорожек", self.lanes.len());
            return TickOutcome::Baselined;
        }

        let mut commands = 0;
        for lane in &mut self.lanes {
            let current = brightness.slice(&lane.pixels);
            let detection = lane.detector.observe(current, self.settings.threshold);

            match detection {
                Detection::NoSignal => {
                    debug!("Дорожка '{}': нет опорного кадра нужной формы, новая база", lane.key_name);
                }
                Detection::Measured { diff, active } => {
                    debug_if_enabled!("Дорожка '{}': diff={:.2} active={}", lane.key_name, diff, active);
                }
            }

            if let Some(command) = lane.actuator.step(detection, now, self.settings.cooldown) {
                Self::dispatch(self.sink.as_ref(), lane, command);
                commands += 1;
            }
        }

        TickOutcome::Detected { commands }
    }

    /// Отпустить все удержанные клавиши без учёта таймера
    pub fn release_held(&mut self, reason: &str) {
        for lane in &mut self.lanes {
            if let Some(command) = lane.actuator.force_release() {
                info!("Принудительное отпускание '{}' ({})", lane.key_name, reason);
                Self::dispatch(self.sink.as_ref(), lane, command);
            }
        }
    }

    fn dispatch(sink: &dyn KeySink, lane: &Lane, command: KeyCommand) {
        let result = match command {
            KeyCommand::Press => {
                info!("Нажатие '{}'", lane.key_name);
                sink.press(lane.key_code)
            }
            KeyCommand::Release => {
                info!("Отпускание '{}'", lane.key_name);
                sink.release(lane.key_code)
            }
        };

        if let Err(e) = result {
            error!("Не удалось отправить {:?} для '{}': {}", command, lane.key_name, e);
        }
    }
}
