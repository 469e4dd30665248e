use crate::scene::ElementId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    #[error("Элемент {0} исчез из сцены во время опроса")]
    ElementStale(ElementId),

    #[error("Приёмник области ввода отклонил публикацию: {0}")]
    SinkPublish(String),

    #[error("Ошибка разбора сцены: {0}")]
    Scene(#[from] serde_json::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),
}

impl RegionError {
    pub fn config<T>(msg: impl Into<String>) -> Result<T> {
        Err(RegionError::Config(msg.into()))
    }

    /// Ошибки, после которых цикл пересчёта продолжает работу
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RegionError::ElementStale(_) | RegionError::SinkPublish(_))
    }
}

pub type Result<T> = std::result::Result<T, RegionError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! region_error {
    (config, $($arg:tt)*) => {
        $crate::error::RegionError::Config(format!($($arg)*))
    };
    (sink_publish, $($arg:tt)*) => {
        $crate::error::RegionError::SinkPublish(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(RegionError::ElementStale(ElementId(3)).is_recoverable());
        assert!(region_error!(sink_publish, "окно {} не найдено", 42).is_recoverable());
        assert!(!region_error!(config, "tile_size = {}", 0).is_recoverable());
    }

    #[test]
    fn test_config_helper_returns_err() {
        let result: Result<()> = RegionError::config("нет приёмника");
        match result {
            Err(RegionError::Config(msg)) => assert_eq!(msg, "нет приёмника"),
            other => panic!("неожиданный результат: {:?}", other),
        }
    }
}
