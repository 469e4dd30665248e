use crate::error::{RegionError, Result as RegionResult};
use crate::scene::Selector;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub region: RegionSettings,
    pub scheduler: SchedulerConfig,
    pub scene: SceneConfig,
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            filter: "overlay_input_region=info".to_string(),
        }
    }
}

/// Верхняя граница размера тайла в пикселях устройства
pub const MAX_TILE_SIZE: u32 = 4096;

/// Неизменяемые на время сессии параметры синхронизации области
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegionSettings {
    /// Пустая строка означает «все элементы»
    pub selector: String,
    pub tile_size: u32,
    pub min_interval_ms: u64,
    /// 0 означает «взять device pixel ratio из сцены»
    pub pixel_ratio: f64,
    pub max_rects: usize,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            selector: String::new(),
            tile_size: 12,
            min_interval_ms: 16,
            pixel_ratio: 0.0,
            max_rects: 800,
        }
    }
}

impl RegionSettings {
    pub fn validate(&self) -> RegionResult<()> {
        if self.tile_size == 0 {
            return RegionError::config("tile_size должно быть больше 0");
        }
        if self.tile_size > MAX_TILE_SIZE {
            return RegionError::config(format!(
                "tile_size {} больше допустимого {}",
                self.tile_size, MAX_TILE_SIZE
            ));
        }
        if !self.pixel_ratio.is_finite() || self.pixel_ratio < 0.0 {
            return RegionError::config(format!("Неверный pixel_ratio: {}", self.pixel_ratio));
        }
        if self.max_rects == 0 {
            return RegionError::config("max_rects должно быть больше 0");
        }
        self.parsed_selector()?;
        Ok(())
    }

    pub fn parsed_selector(&self) -> RegionResult<Option<Selector>> {
        let selector = self.selector.trim();
        if selector.is_empty() {
            return Ok(None);
        }
        Selector::parse(selector).map(Some)
    }

    /// Явный `pixel_ratio` из конфигурации или значение хоста
    pub fn effective_pixel_ratio(&self, host_ratio: f64) -> f64 {
        if self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else if host_ratio.is_finite() && host_ratio > 0.0 {
            host_ratio
        } else {
            1.0
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Период «кадра», на границе которого схлопываются уведомления; 0 отключает кадры
    pub frame_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { frame_interval_ms: 16 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub path: PathBuf,
    pub polling_interval_ms: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scene.json"),
            polling_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    DryRun,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub path: PathBuf,
    /// 0 означает PID текущего процесса
    pub target_pid: u32,
    pub restore_on_exit: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::DryRun,
            path: PathBuf::new(),
            target_pid: 0,
            restore_on_exit: true,
        }
    }
}

impl SinkConfig {
    pub fn effective_pid(&self) -> u32 {
        if self.target_pid == 0 {
            std::process::id()
        } else {
            self.target_pid
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("OIR_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        self.region.validate()?;

        if self.scene.polling_interval_ms < 10 {
            anyhow::bail!("polling_interval_ms должно быть минимум 10");
        }

        if self.sink.kind == SinkKind::Json && self.sink.path.as_os_str().is_empty() {
            anyhow::bail!("Для приёмника json нужно указать sink.path");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region.tile_size, 12);
        assert_eq!(config.region.min_interval_ms, 16);
        assert_eq!(config.region.max_rects, 800);
    }

    #[test]
    fn test_region_settings_validation() {
        let mut settings = RegionSettings::default();
        settings.tile_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = RegionSettings::default();
        settings.tile_size = MAX_TILE_SIZE;
        assert!(settings.validate().is_ok());
        settings.tile_size = MAX_TILE_SIZE + 1;
        assert!(matches!(settings.validate(), Err(RegionError::Config(_))));
        settings.tile_size = u32::MAX;
        assert!(matches!(settings.validate(), Err(RegionError::Config(_))));

        let mut settings = RegionSettings::default();
        settings.max_rects = 0;
        assert!(settings.validate().is_err());

        let mut settings = RegionSettings::default();
        settings.pixel_ratio = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = RegionSettings::default();
        settings.selector = "div > a".to_string();
        assert!(matches!(settings.validate(), Err(RegionError::Config(_))));
    }

    #[test]
    fn test_effective_pixel_ratio() {
        let mut settings = RegionSettings::default();
        assert_eq!(settings.effective_pixel_ratio(2.0), 2.0);
        assert_eq!(settings.effective_pixel_ratio(0.0), 1.0);

        settings.pixel_ratio = 1.5;
        assert_eq!(settings.effective_pixel_ratio(2.0), 1.5);
    }

    #[test]
    fn test_empty_selector_means_all_elements() {
        let settings = RegionSettings::default();
        assert!(settings.parsed_selector().unwrap().is_none());

        let settings = RegionSettings {
            selector: " .hit ".to_string(),
            ..RegionSettings::default()
        };
        assert_eq!(settings.parsed_selector().unwrap().unwrap().as_str(), ".hit");
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[region]
selector = "button, .hit"
tile_size = 16
max_rects = 64

[sink]
kind = "json"
path = "/tmp/region.jsonl"
target_pid = 1234
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.region.tile_size, 16);
        assert_eq!(config.region.max_rects, 64);
        assert_eq!(config.region.min_interval_ms, 16);
        assert_eq!(config.sink.kind, SinkKind::Json);
        assert_eq!(config.sink.effective_pid(), 1234);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_sink_requires_path() {
        let mut config = Config::default();
        config.sink.kind = SinkKind::Json;
        assert!(config.validate().is_err());
    }
}
