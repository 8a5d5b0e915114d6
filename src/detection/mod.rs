//! Detection pipeline: geometry, brightness frames, per-lane differencing,
//! the press/release state machine and the loop that drives them.
//!
//! Everything here runs on the dedicated detection thread. Lane state never
//! leaves it; only `ControlSurface` and `StatusBoard` are shared.

pub mod actuator;
pub mod engine;
pub mod frame;
pub mod geometry;
pub mod lane;

use crate::config::Config;
use crate::control::{ControlSurface, StatusBoard};
use crate::error::Result;
use crate::events::KeyCode;
use crate::services::capture::create_frame_source;
use crate::services::keycode_map::KeycodeMap;
use crate::services::virtual_device::KeySink;
use engine::{DetectionEngine, EngineSettings};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::info;

/// Resolve lane key names to evdev codes, in configuration order.
pub fn lane_keys(config: &Config) -> Result<Vec<(String, KeyCode)>> {
    config
        .lanes
        .iter()
        .map(|lane| {
            let name = lane.key.to_lowercase();
            KeycodeMap::get_keycode(&name).map(|code| (name, code))
        })
        .collect()
}

/// Start the detection loop on its own OS thread.
///
/// The frame source is created inside the thread, the scale probe and layout
/// resolution happen there once before the first iteration.
pub fn spawn_detection_loop(
    config: Arc<Config>,
    control: Arc<ControlSurface>,
    status: Arc<StatusBoard>,
    sink: Arc<dyn KeySink>,
    dry_run: bool,
) -> Result<JoinHandle<()>> {
    let keys = lane_keys(&config)?;

    let handle = std::thread::Builder::new()
        .name("detection".to_string())
        .spawn(move || {
            let mut source = create_frame_source(dry_run);

            let scale = geometry::probe_scale(
                &mut source,
                config.detection.probe_size,
                config.detection.default_scale,
            );
            let rects: Vec<_> = config.lanes.iter().map(|lane| lane.screen_rect()).collect();
            let layout = geometry::resolve(&rects, scale);

            info!("Область захвата: {:?} (масштаб {:.2})", layout.region, layout.scale);
            for ((name, _), pixels) in keys.iter().zip(&layout.lanes) {
                info!("Дорожка '{}': пиксели {:?}", name, pixels);
            }

            let settings = EngineSettings {
                threshold: config.threshold(),
                cooldown: config.cooldown(),
                idle_sleep: config.idle_sleep(),
            };

            let mut engine = DetectionEngine::new(source, sink, control, status, &layout, keys, settings);
            engine.run();
        })?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_keys_follow_config_order() {
        let config = Config::default();
        let keys = lane_keys(&config).unwrap();
        let names: Vec<_> = keys.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["a", "s", "d", "f", "g"]);
        assert_eq!(keys[0].1, KeyCode(30));
    }

    #[test]
    fn test_lane_keys_are_lowercased() {
        let mut config = Config::default();
        config.lanes[0].key = "A".to_string();
        let keys = lane_keys(&config).unwrap();
        assert_eq!(keys[0], ("a".to_string(), KeyCode(30)));
    }
}
