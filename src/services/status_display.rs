use crate::control::{StatusBoard, StatusView};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Поверхность, на которой отображается статус
pub trait StatusSurface: Send {
    fn render(&mut self, view: &StatusView);
}

/// Пишет статус в лог, только когда он меняется
#[derive(Debug, Default)]
pub struct ConsoleStatusSurface {
    last: Option<StatusView>,
    renders: usize,
}

impl ConsoleStatusSurface {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl StatusSurface for ConsoleStatusSurface {
    fn render(&mut self, view: &StatusView) {
        if self.last.as_ref() == Some(view) {
            return;
        }
        info!(status = %view.label, color = view.color.as_str(), "Статус");
        self.last = Some(view.clone());
        self.renders += 1;
    }
}

/// Опрос `StatusBoard` по таймеру. Ничего не пишет в общее состояние.
pub async fn run_status_display<T: StatusSurface>(
    board: Arc<StatusBoard>,
    mut surface: T,
    refresh: Duration,
    toggle_key: String,
) {
    let mut ticker = interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        surface.render(&board.get().view(&toggle_key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::StatusKind;

    #[test]
    fn test_console_surface_renders_changes_only() {
        let mut surface = ConsoleStatusSurface::new();
        surface.render(&StatusKind::Initializing.view("1"));
        surface.render(&StatusKind::Initializing.view("1"));
        surface.render(&StatusKind::Paused.view("1"));
        surface.render(&StatusKind::Running.view("1"));
        surface.render(&StatusKind::Running.view("1"));
        assert_eq!(surface.renders(), 3);
    }

    #[derive(Clone, Default)]
    struct SharedSurface(Arc<parking_lot::Mutex<Vec<String>>>);

    impl StatusSurface for SharedSurface {
        fn render(&mut self, view: &StatusView) {
            self.0.lock().push(view.label.clone());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_polls_board() {
        let board = Arc::new(StatusBoard::new());
        let surface = SharedSurface::default();
        let seen = surface.0.clone();

        let task = tokio::spawn(run_status_display(
            board.clone(),
            surface,
            Duration::from_millis(100),
            "1".to_string(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        board.set(StatusKind::Paused);
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        let seen = seen.lock().clone();
        assert_eq!(seen.first().map(String::as_str), Some("INITIALIZING"));
        assert_eq!(seen.last().map(String::as_str), Some("PAUSED (Press 1)"));
    }
}
