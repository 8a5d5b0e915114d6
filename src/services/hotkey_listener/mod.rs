mod dry_hotkey_listener;
mod hotkey_listener;
mod toggle_filter;
mod r#trait;

pub use self::r#trait::create_hotkey_listener;
