use super::geometry::PixelRect;
use crate::error::{MacroError, Result};

/// Многоканальный буфер, полученный от источника кадров (строки сверху вниз)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Длина буфера не проверяется здесь, её проверяет `BrightnessFrame::from_raw`
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        Self { width, height, channels, data }
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * usize::from(self.channels)
    }

    /// Кадр, у которого каждый канал каждого пикселя равен `value`
    #[cfg(test)]
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self::new(width, height, channels, vec![value; len])
    }
}

impl From<image::RgbaImage> for RawFrame {
    fn from(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, 4, image.into_raw())
    }
}

/// Одноканальная яркость, `width × height` значений в диапазоне 0–255
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessFrame {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl BrightnessFrame {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self { width, height, data }
    }

    #[cfg(test)]
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    /// Яркость пикселя = невзвешенное среднее всех каналов буфера, включая альфу.
    ///
    /// Буфер, длина которого не сходится с размерами, отвергается как ошибка захвата.
    pub fn from_raw(frame: &RawFrame) -> Result<Self> {
        if frame.channels == 0 {
            return Err(MacroError::capture("буфер без каналов"));
        }
        if frame.data.len() != frame.expected_len() {
            return Err(MacroError::capture(format!(
                "буфер {}x{}x{} длиной {} байт, ожидалось {}",
                frame.width,
                frame.height,
                frame.channels,
                frame.data.len(),
                frame.expected_len()
            )));
        }

        let channels = usize::from(frame.channels);
        let data = frame
            .data
            .chunks_exact(channels)
            .map(|pixel| pixel.iter().map(|&c| f64::from(c)).sum::<f64>() / channels as f64)
            .collect();

        Ok(Self::new(frame.width as usize, frame.height as usize, data))
    }

    #[cfg(test)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Форма в порядке (строки, столбцы)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Вырезать прямоугольник; выходящая за границы часть отбрасывается
    pub fn slice(&self, rect: &PixelRect) -> BrightnessFrame {
        let x0 = rect.x0.min(self.width);
        let x1 = rect.x1.min(self.width).max(x0);
        let y0 = rect.y0.min(self.height);
        let y1 = rect.y1.min(self.height).max(y0);

        let mut data = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for row in y0..y1 {
            let start = row * self.width;
            data.extend_from_slice(&self.data[start + x0..start + x1]);
        }

        BrightnessFrame::new(x1 - x0, y1 - y0, data)
    }

    /// Среднее `|self - other|` по всем пикселям. Формы должны совпадать.
    pub fn mean_abs_diff(&self, other: &BrightnessFrame) -> f64 {
        debug_assert_eq!(self.shape(), other.shape());
        if self.data.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .sum();
        total / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_average_includes_every_channel() {
        let frame = RawFrame::new(2, 1, 4, vec![0, 30, 60, 255, 10, 10, 10, 10]);
        let gray = BrightnessFrame::from_raw(&frame).unwrap();
        assert_eq!(gray.shape(), (1, 2));
        assert_eq!(gray.get(0, 0), Some(86.25));
        assert_eq!(gray.get(1, 0), Some(10.0));
    }

    #[test]
    fn test_three_channel_average() {
        let frame = RawFrame::new(1, 1, 3, vec![255, 0, 0]);
        assert_eq!(BrightnessFrame::from_raw(&frame).unwrap().get(0, 0), Some(85.0));
    }

    #[test]
    fn test_malformed_buffer_is_capture_error() {
        let short = RawFrame::new(4, 4, 4, vec![0; 10]);
        let err = BrightnessFrame::from_raw(&short).unwrap_err();
        assert!(matches!(err, MacroError::Capture(_)));

        let long = RawFrame::new(1, 1, 3, vec![0; 4]);
        assert!(BrightnessFrame::from_raw(&long).is_err());

        let no_channels = RawFrame::new(2, 2, 0, vec![]);
        assert!(BrightnessFrame::from_raw(&no_channels).is_err());
    }

    #[test]
    fn test_from_rgba_image() {
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([40, 40, 40, 40]));
        let frame = RawFrame::from(image);
        assert_eq!((frame.width, frame.height, frame.channels), (3, 2, 4));
        assert_eq!(frame.data.len(), 24);
    }

    #[test]
    fn test_slice_inside_bounds() {
        let data = (0..20).map(f64::from).collect();
        let gray = BrightnessFrame::new(5, 4, data);
        let slice = gray.slice(&PixelRect::new(1, 1, 3, 3));
        assert_eq!(slice.shape(), (2, 2));
        assert_eq!(slice.get(0, 0), Some(6.0));
        assert_eq!(slice.get(1, 1), Some(12.0));
    }

    #[test]
    fn test_slice_clamped_to_buffer() {
        let gray = BrightnessFrame::filled(4, 4, 1.0);
        let slice = gray.slice(&PixelRect::new(2, 3, 10, 10));
        assert_eq!(slice.shape(), (1, 2));

        let empty = gray.slice(&PixelRect::new(8, 8, 12, 12));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_mean_abs_diff() {
        let zeros = BrightnessFrame::filled(10, 10, 0.0);
        let thirty = BrightnessFrame::filled(10, 10, 30.0);
        assert_eq!(thirty.mean_abs_diff(&zeros), 30.0);
        assert_eq!(zeros.mean_abs_diff(&thirty), 30.0);

        let mixed = BrightnessFrame::new(2, 1, vec![10.0, 50.0]);
        let base = BrightnessFrame::new(2, 1, vec![20.0, 20.0]);
        assert_eq!(mixed.mean_abs_diff(&base), 20.0);
    }
}
