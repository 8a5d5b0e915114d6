//! Перевод логических прямоугольников дорожек в пиксели буфера захвата.
//!
//! На экранах высокой плотности захваченный буфер крупнее запрошенной
//! логической области, поэтому координаты умножаются на масштаб,
//! измеренный один раз при старте.

use crate::error::{MacroError, Result};
use crate::services::capture::FrameSource;
use tracing::{info, warn};

/// Прямоугольник в логических координатах экрана
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }
}

/// Общая область захвата в логических координатах
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self { left, top, width, height }
    }
}

/// Прямоугольник в пикселях буфера захвата, полуинтервалы `[x0, x1) × [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelRect {
    pub fn new(x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[cfg(test)]
    pub fn width(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }
}

/// Результат разрешения геометрии: область захвата и прямоугольники дорожек
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub region: CaptureRegion,
    pub lanes: Vec<PixelRect>,
    pub scale: f64,
}

pub fn resolve(rects: &[ScreenRect], scale: f64) -> Layout {
    let min_x = rects.iter().map(|r| r.left).min().unwrap_or(0);
    let min_y = rects.iter().map(|r| r.top).min().unwrap_or(0);
    let max_x = rects.iter().map(|r| r.right).max().unwrap_or(min_x);
    let max_y = rects.iter().map(|r| r.bottom).max().unwrap_or(min_y);

    let region = CaptureRegion::new(
        min_x,
        min_y,
        (max_x - min_x).max(0) as u32,
        (max_y - min_y).max(0) as u32,
    );

    let to_pixels = |coord: i32, origin: i32| -> usize {
        (f64::from(coord - origin) * scale).round().max(0.0) as usize
    };

    let lanes = rects
        .iter()
        .map(|r| {
            PixelRect::new(
                to_pixels(r.left, min_x),
                to_pixels(r.top, min_y),
                to_pixels(r.right, min_x),
                to_pixels(r.bottom, min_y),
            )
        })
        .collect();

    Layout { region, lanes, scale }
}

/// Отношение ширины буфера к логической ширине пробного квадрата в углу экрана
pub fn measure_scale<S: FrameSource + ?Sized>(source: &mut S, probe_size: u32) -> Result<f64> {
    if probe_size == 0 {
        return Err(MacroError::ScaleProbe("нулевой размер пробы".to_string()));
    }

    let probe = CaptureRegion::new(0, 0, probe_size, probe_size);
    let frame = source
        .capture(&probe)
        .map_err(|e| MacroError::ScaleProbe(e.to_string()))?;

    let scale = f64::from(frame.width) / f64::from(probe_size);
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(MacroError::ScaleProbe(format!("буфер шириной {}px", frame.width)))
    }
}

/// Любая ошибка пробы заменяется масштабом по умолчанию, старт не прерывается.
pub fn probe_scale<S: FrameSource + ?Sized>(source: &mut S, probe_size: u32, default_scale: f64) -> f64 {
    match measure_scale(source, probe_size) {
        Ok(scale) => {
            info!("Масштаб дисплея: {:.2}", scale);
            scale
        }
        Err(e) => {
            warn!("{}, используем масштаб {}", e, default_scale);
            default_scale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::frame::RawFrame;

    struct FixedWidthSource(Option<u32>);

    impl FrameSource for FixedWidthSource {
        fn capture(&mut self, region: &CaptureRegion) -> Result<RawFrame> {
            match self.0 {
                Some(width) => Ok(RawFrame::filled(width, region.height, 4, 0)),
                None => Err(MacroError::capture("нет дисплея")),
            }
        }
    }

    fn legacy_rects() -> Vec<ScreenRect> {
        vec![
            ScreenRect::new(750, 882, 785, 911),
            ScreenRect::new(842, 888, 880, 916),
            ScreenRect::new(937, 885, 980, 913),
            ScreenRect::new(1035, 884, 1075, 912),
            ScreenRect::new(1128, 887, 1171, 918),
        ]
    }

    #[test]
    fn test_bounding_region() {
        let layout = resolve(&legacy_rects(), 1.0);
        assert_eq!(layout.region, CaptureRegion::new(750, 882, 421, 36));
    }

    #[test]
    fn test_lane_rects_scaled() {
        let layout = resolve(&legacy_rects(), 2.0);
        assert_eq!(layout.lanes[0], PixelRect::new(0, 0, 70, 58));
        assert_eq!(layout.lanes[1], PixelRect::new(184, 12, 260, 68));
        assert_eq!(layout.lanes[4], PixelRect::new(756, 10, 842, 72));
    }

    #[test]
    fn test_lane_rects_rounded() {
        let rects = [ScreenRect::new(0, 0, 3, 3), ScreenRect::new(5, 1, 7, 2)];
        let layout = resolve(&rects, 1.5);
        // 4.5 -> 5, 3 * 1.5 = 4.5 -> 5, 7.5 -> 8
        assert_eq!(layout.lanes[0], PixelRect::new(0, 0, 5, 5));
        assert_eq!(layout.lanes[1], PixelRect::new(8, 2, 11, 3));
    }

    #[test]
    fn test_pixel_rect_dimensions() {
        let rect = PixelRect::new(4, 2, 10, 5);
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 3);
    }

    #[test]
    fn test_empty_rects() {
        let layout = resolve(&[], 2.0);
        assert_eq!(layout.region, CaptureRegion::default());
        assert!(layout.lanes.is_empty());
    }

    #[test]
    fn test_probe_scale_measures_ratio() {
        let mut source = FixedWidthSource(Some(200));
        assert_eq!(probe_scale(&mut source, 100, 2.0), 2.0);

        let mut source = FixedWidthSource(Some(125));
        assert_eq!(probe_scale(&mut source, 100, 2.0), 1.25);
    }

    #[test]
    fn test_measure_scale_reports_probe_failure() {
        let mut source = FixedWidthSource(None);
        assert!(matches!(measure_scale(&mut source, 100), Err(MacroError::ScaleProbe(_))));
        assert!(matches!(measure_scale(&mut source, 0), Err(MacroError::ScaleProbe(_))));
    }

    #[test]
    fn test_probe_scale_falls_back_on_failure() {
        let mut source = FixedWidthSource(None);
        assert_eq!(probe_scale(&mut source, 100, 2.0), 2.0);

        let mut source = FixedWidthSource(Some(0));
        assert_eq!(probe_scale(&mut source, 100, 3.0), 3.0);
    }
}
