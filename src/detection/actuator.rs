use super::lane::Detection;
use std::time::{Duration, Instant};

/// Команда для провайдера ввода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Press,
    Release,
}

/// Состояние клавиши одной дорожки: отпущена или удерживается, с защитой по времени.
///
/// Переход возможен только если с последнего перехода прошло строго больше `cooldown`.
/// Дорожка, которая ещё ни разу не переключалась, считается остывшей.
#[derive(Debug, Default)]
pub struct Actuator {
    held: bool,
    last_transition: Option<Instant>,
}

impl Actuator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_held(&self) -> bool {
        self.held
    }

    #[cfg(test)]
    pub fn last_transition(&self) -> Option<Instant> {
        self.last_transition
    }

    fn cooldown_elapsed(&self, now: Instant, cooldown: Duration) -> bool {
        match self.last_transition {
            Some(at) => now.saturating_duration_since(at) > cooldown,
            None => true,
        }
    }

    /// Не более одной команды за вызов. `NoSignal` ничего не меняет.
    pub fn step(&mut self, detection: Detection, now: Instant, cooldown: Duration) -> Option<KeyCommand> {
        let active = match detection {
            Detection::NoSignal => return None,
            Detection::Measured { active, .. } => active,
        };

        if active == self.held || !self.cooldown_elapsed(now, cooldown) {
            return None;
        }

        self.held = active;
        self.last_transition = Some(now);
        Some(if active { KeyCommand::Press } else { KeyCommand::Release })
    }

    /// Безусловное отпускание при паузе и завершении; таймер не трогается.
    pub fn force_release(&mut self) -> Option<KeyCommand> {
        if self.held {
            self.held = false;
            Some(KeyCommand::Release)
        } else {
            None
        }
    }
}
