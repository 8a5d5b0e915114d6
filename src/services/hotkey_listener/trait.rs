use crate::config::Config;
use crate::control::ControlSurface;
use crate::error::Result;
use std::sync::Arc;

/// Trait for hotkey listeners that can run in different modes
#[async_trait::async_trait]
pub trait HotkeyListenerTrait: Send {
    /// Run the hotkey listener until the task is aborted or the input ends
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate hotkey listener based on the dry_run flag
pub fn create_hotkey_listener(
    config: Arc<Config>,
    control: Arc<ControlSurface>,
    dry_run: bool,
) -> Result<Box<dyn HotkeyListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_hotkey_listener::DryRunHotkeyListener::new(
            config, control,
        )?))
    } else {
        Ok(Box::new(super::hotkey_listener::RealHotkeyListener::new(
            config, control,
        )?))
    }
}
