use crate::debug_if_enabled;
use crate::detection::frame::RawFrame;
use crate::detection::geometry::CaptureRegion;
use crate::error::{MacroError, Result};
use tracing::info;
use xcap::Monitor;

use super::r#trait::FrameSource;

/// Захват через xcap: снимок монитора, содержащего левый верхний угол области, и обрезка.
pub struct XcapFrameSource {
    monitor: Option<Monitor>,
}

impl XcapFrameSource {
    pub fn new() -> Self {
        info!("Инициализация XcapFrameSource");
        Self { monitor: None }
    }

    fn contains(monitor: &Monitor, x: i32, y: i32) -> bool {
        match (monitor.x(), monitor.y(), monitor.width(), monitor.height()) {
            (Ok(mx), Ok(my), Ok(w), Ok(h)) => {
                x >= mx && y >= my && x < mx + w as i32 && y < my + h as i32
            }
            _ => false,
        }
    }

    fn monitor_for(&mut self, x: i32, y: i32) -> Result<&Monitor> {
        let cached = self
            .monitor
            .as_ref()
            .is_some_and(|monitor| Self::contains(monitor, x, y));

        if !cached {
            let monitor = Monitor::from_point(x, y).map_err(MacroError::capture)?;
            info!(
                "Монитор для точки ({}, {}): {}",
                x,
                y,
                monitor.name().unwrap_or_else(|_| "Unknown".to_string())
            );
            self.monitor = Some(monitor);
        }

        self.monitor
            .as_ref()
            .ok_or_else(|| MacroError::Internal("Монитор не выбран".to_string()))
    }
}

impl FrameSource for XcapFrameSource {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RawFrame> {
        let monitor = self.monitor_for(region.left, region.top)?;

        let origin_x = monitor.x().map_err(MacroError::capture)?;
        let origin_y = monitor.y().map_err(MacroError::capture)?;
        let logical_width = monitor.width().map_err(MacroError::capture)?;

        let image = monitor.capture_image().map_err(MacroError::capture)?;
        if logical_width == 0 {
            return Err(MacroError::capture("монитор нулевой ширины"));
        }

        // Буфер монитора может быть в физических пикселях
        let scale = f64::from(image.width()) / f64::from(logical_width);
        let to_pixels = |v: f64| (v * scale).round().max(0.0) as u32;

        let x = to_pixels(f64::from(region.left - origin_x));
        let y = to_pixels(f64::from(region.top - origin_y));
        let width = to_pixels(f64::from(region.width)).min(image.width().saturating_sub(x));
        let height = to_pixels(f64::from(region.height)).min(image.height().saturating_sub(y));

        if width == 0 || height == 0 {
            return Err(MacroError::capture(format!(
                "область {:?} вне монитора {}x{}",
                region,
                image.width(),
                image.height()
            )));
        }

        debug_if_enabled!("Захват {}x{} в ({}, {}), масштаб {:.2}", width, height, x, y, scale);

        let cropped = image::imageops::crop_imm(&image, x, y, width, height).to_image();
        Ok(RawFrame::from(cropped))
    }
}
