//! Общее состояние между слушателем горячих клавиш, циклом детекции и индикатором.
//!
//! Слушатель единственный пишет `RunState`, цикл единственный пишет статус.
//! Всё хранится в атомиках, цикл перечитывает их на каждой итерации.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
}

#[derive(Debug, Default)]
pub struct ControlSurface {
    running: AtomicBool,
    reset_requested: AtomicBool,
    shutdown_requested: AtomicBool,
}

impl ControlSurface {
    /// Начальное состояние: пауза
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_state(&self) -> RunState {
        if self.running.load(Ordering::Acquire) {
            RunState::Running
        } else {
            RunState::Paused
        }
    }

    /// Переключить паузу/работу. Вход в `Running` всегда запрашивает новую базу.
    ///
    /// Флаг сброса выставляется раньше флага работы, поэтому цикл не увидит
    /// `Running` без ожидающего сброса.
    pub fn toggle(&self) -> RunState {
        let next_running = !self.running.load(Ordering::Acquire);
        if next_running {
            self.reset_requested.store(true, Ordering::Release);
        }
        self.running.store(next_running, Ordering::Release);

        if next_running {
            RunState::Running
        } else {
            RunState::Paused
        }
    }

    #[cfg(test)]
    pub fn reset_pending(&self) -> bool {
        self.reset_requested.load(Ordering::Acquire)
    }

    /// Забрать запрос сброса. Повторный вход в `Running` после этого
    /// выставит флаг заново и не потеряется.
    pub fn take_reset(&self) -> bool {
        self.reset_requested.swap(false, Ordering::AcqRel)
    }

    /// Вернуть забранный запрос, если сброс так и не был выполнен
    pub fn restore_reset(&self) {
        self.reset_requested.store(true, Ordering::Release);
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }
}

/// Что показывает индикатор
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusKind {
    Initializing = 0,
    Running = 1,
    Paused = 2,
}

impl From<RunState> for StatusKind {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Running => StatusKind::Running,
            RunState::Paused => StatusKind::Paused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    White,
    BrightGreen,
    Red,
}

impl StatusColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusColor::White => "white",
            StatusColor::BrightGreen => "#00ff00",
            StatusColor::Red => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub label: String,
    pub color: StatusColor,
}

impl StatusKind {
    pub fn view(&self, toggle_key: &str) -> StatusView {
        match self {
            StatusKind::Initializing => StatusView {
                label: "INITIALIZING".to_string(),
                color: StatusColor::White,
            },
            StatusKind::Running => StatusView {
                label: "RUNNING".to_string(),
                color: StatusColor::BrightGreen,
            },
            StatusKind::Paused => StatusView {
                label: format!("PAUSED (Press {})", toggle_key),
                color: StatusColor::Red,
            },
        }
    }
}

#[derive(Debug)]
pub struct StatusBoard {
    kind: AtomicU8,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self {
            kind: AtomicU8::new(StatusKind::Initializing as u8),
        }
    }

    pub fn set(&self, kind: StatusKind) {
        self.kind.store(kind as u8, Ordering::Release);
    }

    pub fn get(&self) -> StatusKind {
        match self.kind.load(Ordering::Acquire) {
            1 => StatusKind::Running,
            2 => StatusKind::Paused,
            _ => StatusKind::Initializing,
        }
    }
}
