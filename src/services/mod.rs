pub mod capture;
pub mod hotkey_listener;
pub mod keycode_map;
pub mod status_display;
pub mod virtual_device;

pub use hotkey_listener::create_hotkey_listener;
pub use status_display::{run_status_display, ConsoleStatusSurface};
pub use virtual_device::{KeySink, VirtualDevice};
