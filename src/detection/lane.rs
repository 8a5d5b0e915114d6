use super::frame::BrightnessFrame;

/// Результат анализа одной дорожки за итерацию
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    /// Нет опорного кадра подходящей формы, дорожка только что перезаписала базу
    NoSignal,
    Measured { diff: f64, active: bool },
}

impl Detection {
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        matches!(self, Detection::Measured { active: true, .. })
    }
}

/// Скользящее сравнение кадров одной дорожки
#[derive(Debug, Default)]
pub struct LaneDetector {
    previous: Option<BrightnessFrame>,
}

impl LaneDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сравнить текущий срез с предыдущим и сдвинуть окно.
    ///
    /// Отсутствие предыдущего среза или несовпадение формы дают `NoSignal`;
    /// в обоих случаях текущий срез становится новой базой только этой дорожки.
    pub fn observe(&mut self, current: BrightnessFrame, threshold: f64) -> Detection {
        let diff = match self.previous.as_ref() {
            Some(previous) if previous.shape() == current.shape() && !current.is_empty() => {
                Some(current.mean_abs_diff(previous))
            }
            _ => None,
        };

        self.previous = Some(current);

        match diff {
            Some(diff) => Detection::Measured {
                diff,
                active: diff > threshold,
            },
            None => Detection::NoSignal,
        }
    }

    pub fn rebaseline(&mut self, current: BrightnessFrame) {
        self.previous = Some(current);
    }

    #[cfg(test)]
    pub fn previous(&self) -> Option<&BrightnessFrame> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 18.0;

    #[test]
    fn test_first_observation_is_no_signal() {
        let mut detector = LaneDetector::new();
        let detection = detector.observe(BrightnessFrame::filled(10, 10, 30.0), THRESHOLD);
        assert_eq!(detection, Detection::NoSignal);
        assert_eq!(detector.previous(), Some(&BrightnessFrame::filled(10, 10, 30.0)));
    }

    #[test]
    fn test_active_above_threshold() {
        let mut detector = LaneDetector::new();
        detector.rebaseline(BrightnessFrame::filled(10, 10, 0.0));
        let detection = detector.observe(BrightnessFrame::filled(10, 10, 30.0), THRESHOLD);
        assert_eq!(detection, Detection::Measured { diff: 30.0, active: true });
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut detector = LaneDetector::new();
        detector.rebaseline(BrightnessFrame::filled(4, 4, 100.0));
        let detection = detector.observe(BrightnessFrame::filled(4, 4, 118.0), THRESHOLD);
        assert_eq!(detection, Detection::Measured { diff: 18.0, active: false });
        assert!(!detection.is_active());
    }

    #[test]
    fn test_window_slides_every_observation() {
        let mut detector = LaneDetector::new();
        detector.rebaseline(BrightnessFrame::filled(10, 10, 0.0));
        detector.observe(BrightnessFrame::filled(10, 10, 30.0), THRESHOLD);
        assert_eq!(detector.previous(), Some(&BrightnessFrame::filled(10, 10, 30.0)));

        // Возврат к нулю сравнивается с 30, а не с исходной базой
        let detection = detector.observe(BrightnessFrame::filled(10, 10, 0.0), THRESHOLD);
        assert_eq!(detection, Detection::Measured { diff: 30.0, active: true });

        let detection = detector.observe(BrightnessFrame::filled(10, 10, 0.0), THRESHOLD);
        assert_eq!(detection, Detection::Measured { diff: 0.0, active: false });
    }

    #[test]
    fn test_shape_mismatch_rebaselines() {
        let mut detector = LaneDetector::new();
        detector.rebaseline(BrightnessFrame::filled(10, 10, 0.0));

        let detection = detector.observe(BrightnessFrame::filled(20, 20, 200.0), THRESHOLD);
        assert_eq!(detection, Detection::NoSignal);
        assert_eq!(detector.previous().map(|p| p.shape()), Some((20, 20)));

        let detection = detector.observe(BrightnessFrame::filled(20, 20, 0.0), THRESHOLD);
        assert_eq!(detection, Detection::Measured { diff: 200.0, active: true });
    }

    #[test]
    fn test_empty_slice_is_no_signal() {
        let mut detector = LaneDetector::new();
        detector.rebaseline(BrightnessFrame::filled(0, 0, 0.0));
        let detection = detector.observe(BrightnessFrame::filled(0, 0, 0.0), THRESHOLD);
        assert_eq!(detection, Detection::NoSignal);
    }
}
