use crate::detection::frame::RawFrame;
use crate::detection::geometry::CaptureRegion;
use crate::error::Result;
use std::time::Duration;
use tracing::info;

use super::r#trait::FrameSource;

const STRIPE_WIDTH: u32 = 45;
const DARK: u8 = 20;
const BRIGHT: u8 = 220;

/// Источник кадров для сухого запуска: вертикальные полосы, которые
/// инвертируются каждые `period` кадров. Масштаб всегда 1.0.
pub struct SyntheticFrameSource {
    frame_index: u64,
    period: u64,
    frame_interval: Duration,
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        info!("Dry-run режим - кадры генерируются синтетически");
        Self::with_timing(30, Duration::from_millis(16))
    }

    pub fn with_timing(period: u64, frame_interval: Duration) -> Self {
        Self {
            frame_index: 0,
            period: period.max(1),
            frame_interval,
        }
    }

    fn pixel_value(&self, x: u32) -> u8 {
        if (u64::from(x / STRIPE_WIDTH) + self.frame_index / self.period) % 2 == 0 {
            DARK
        } else {
            BRIGHT
        }
    }
}

impl FrameSource for SyntheticFrameSource {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RawFrame> {
        // Имитация задержки настоящего захвата
        if !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }

        let row: Vec<u8> = (0..region.width)
            .flat_map(|x| {
                let v = self.pixel_value(x);
                [v, v, v, 255]
            })
            .collect();
        let data = row.repeat(region.height as usize);

        self.frame_index += 1;
        Ok(RawFrame::new(region.width, region.height, 4, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_matches_region() {
        let mut source = SyntheticFrameSource::with_timing(2, Duration::ZERO);
        let frame = source.capture(&CaptureRegion::new(10, 10, 100, 3)).unwrap();
        assert_eq!((frame.width, frame.height, frame.channels), (100, 3, 4));
        assert_eq!(frame.data.len(), 100 * 3 * 4);
    }

    #[test]
    fn test_pattern_inverts_each_period() {
        let mut source = SyntheticFrameSource::with_timing(2, Duration::ZERO);
        let region = CaptureRegion::new(0, 0, 1, 1);
        let first = source.capture(&region).unwrap();
        let second = source.capture(&region).unwrap();
        let third = source.capture(&region).unwrap();
        assert_eq!(first, second);
        assert_ne!(second, third);
        assert_eq!(first.data[0], DARK);
        assert_eq!(third.data[0], BRIGHT);
    }
}
