use serde::{Deserialize, Serialize};
use std::fmt;

/// Причина уведомления об изменении сцены
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeReason {
    /// Первичный пересчёт при запуске
    Initial,
    /// Вставка/удаление элементов, смена class/style
    Structure,
    /// Изменился размер наблюдаемого элемента
    ElementResize,
    Scroll,
    ViewportResize,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeReason::Initial => "initial",
            ChangeReason::Structure => "structure",
            ChangeReason::ElementResize => "element-resize",
            ChangeReason::Scroll => "scroll",
            ChangeReason::ViewportResize => "viewport-resize",
        };
        f.write_str(name)
    }
}

/// Изменение, обнаруженное источником, с моментом обнаружения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub reason: ChangeReason,
    pub timestamp: std::time::Instant,
}

impl ChangeEvent {
    pub fn new(reason: ChangeReason) -> Self {
        Self {
            reason,
            timestamp: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}ms ago)", self.reason, self.timestamp.elapsed().as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display() {
        assert_eq!(ChangeReason::ViewportResize.to_string(), "viewport-resize");
        assert_eq!(ChangeReason::Structure.to_string(), "structure");
    }

    #[test]
    fn test_change_event_creation() {
        let event = ChangeEvent::new(ChangeReason::Scroll);
        assert_eq!(event.reason, ChangeReason::Scroll);
        assert!(event.to_string().starts_with("scroll ("));
    }
}
