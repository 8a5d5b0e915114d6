use crate::detection::geometry::ScreenRect;
use crate::services::keycode_map::KeycodeMap;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub detection: DetectionConfig,
    pub input: InputConfig,
    pub display: DisplayConfig,
    #[serde(default)]
    pub lanes: Vec<LaneConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    /// Порог средней абсолютной разницы яркости (шкала 0–255)
    pub threshold: f64,
    pub cooldown_ms: u64,
    pub idle_sleep_ms: u64,
    /// Масштаб, если пробный захват не удался
    pub default_scale: f64,
    /// Сторона пробного квадрата в логических координатах
    pub probe_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
    pub toggle_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub refresh_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LaneConfig {
    pub key: String,
    pub top_left: [i32; 2],
    pub bottom_right: [i32; 2],
}

impl LaneConfig {
    fn new(key: &str, top_left: [i32; 2], bottom_right: [i32; 2]) -> Self {
        Self {
            key: key.to_string(),
            top_left,
            bottom_right,
        }
    }

    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect::new(
            self.top_left[0],
            self.top_left[1],
            self.bottom_right[0],
            self.bottom_right[1],
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            detection: DetectionConfig {
                threshold: 18.0,
                cooldown_ms: 200,
                idle_sleep_ms: 100,
                default_scale: 2.0,
                probe_size: 100,
            },
            input: InputConfig {
                device_path: "auto".to_string(),
                toggle_key: "1".to_string(),
            },
            display: DisplayConfig { refresh_ms: 100 },
            lanes: vec![
                LaneConfig::new("a", [750, 882], [785, 911]),
                LaneConfig::new("s", [842, 888], [880, 916]),
                LaneConfig::new("d", [937, 885], [980, 913]),
                LaneConfig::new("f", [1035, 884], [1075, 912]),
                LaneConfig::new("g", [1128, 887], [1171, 918]),
            ],
        }
    }
}

impl Config {
    /// Встроенные значения по умолчанию, затем TOML (если файл есть), затем переменные `LANE_*`
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("LANE_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        let detection = &self.detection;
        if !detection.threshold.is_finite() || detection.threshold < 0.0 {
            anyhow::bail!("threshold должен быть неотрицательным числом: {}", detection.threshold);
        }
        if !detection.default_scale.is_finite() || detection.default_scale <= 0.0 {
            anyhow::bail!("default_scale должен быть больше 0: {}", detection.default_scale);
        }
        if detection.probe_size == 0 {
            anyhow::bail!("probe_size должно быть больше 0");
        }
        if self.display.refresh_ms == 0 {
            anyhow::bail!("refresh_ms должно быть больше 0");
        }

        if !KeycodeMap::is_known(&self.input.toggle_key) {
            anyhow::bail!("Неизвестная клавиша переключения: '{}'", self.input.toggle_key);
        }

        if self.lanes.is_empty() {
            anyhow::bail!("Не задано ни одной дорожки");
        }

        let toggle = self.input.toggle_key.to_lowercase();
        let mut seen = HashSet::new();
        for (i, lane) in self.lanes.iter().enumerate() {
            let key = lane.key.to_lowercase();
            if !KeycodeMap::is_known(&key) {
                anyhow::bail!("Неизвестная клавиша '{}' в дорожке #{}", lane.key, i + 1);
            }
            if key == toggle {
                anyhow::bail!("Клавиша дорожки #{} совпадает с клавишей переключения", i + 1);
            }
            if !seen.insert(key) {
                anyhow::bail!("Клавиша '{}' используется в нескольких дорожках", lane.key);
            }
            let rect = lane.screen_rect();
            if rect.right <= rect.left || rect.bottom <= rect.top {
                anyhow::bail!("Вырожденный прямоугольник в дорожке #{}: {:?}", i + 1, rect);
            }
        }

        Ok(())
    }

    pub fn threshold(&self) -> f64 {
        self.detection.threshold
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.detection.cooldown_ms)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.detection.idle_sleep_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.display.refresh_ms)
    }
}
