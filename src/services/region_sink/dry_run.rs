use crate::error::Result;
use crate::geometry::Rect;
use tracing::info;

use super::r#trait::NativeRegionSink;

/// Приёмник для сухого запуска: только пишет в лог
#[derive(Debug, Default)]
pub struct DryRunSink {
    pid: Option<u32>,
    publishes: u64,
}

impl DryRunSink {
    pub fn new() -> Self {
        info!("Инициализация DryRunSink");
        Self::default()
    }
}

impl NativeRegionSink for DryRunSink {
    fn set_pid(&mut self, pid: u32) -> Result<()> {
        info!("[DRY RUN] Целевой PID: {}", pid);
        self.pid = Some(pid);
        Ok(())
    }

    fn set_input_region(&mut self, rects: &[Rect]) -> Result<()> {
        self.publishes += 1;
        if rects.is_empty() {
            info!("[DRY RUN] Окно PID {:?} полностью прозрачно для ввода", self.pid);
        } else {
            let area: u64 = rects.iter().map(Rect::area).sum();
            info!(
                "[DRY RUN] Публикация #{} для PID {:?}: {} прямоугольников, площадь {} px",
                self.publishes,
                self.pid,
                rects.len(),
                area
            );
        }
        Ok(())
    }

    fn clear_input_region(&mut self) -> Result<()> {
        info!("[DRY RUN] Ограничение области ввода снято для PID {:?}", self.pid);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry_run"
    }
}
