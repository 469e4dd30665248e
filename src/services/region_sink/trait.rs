use crate::config::{SinkConfig, SinkKind};
use crate::error::Result;
use crate::geometry::Rect;

use super::dry_run::DryRunSink;
use super::json_lines::JsonLinesSink;

/// Внешний приёмник области ввода (нативная часть оконной системы).
///
/// Ядро не заглядывает внутрь приёмника. От него требуется только:
/// - `set_input_region` принимает в том числе пустой список и применяет его к окну;
/// - `clear_input_region` полностью снимает ограничение области ввода.
pub trait NativeRegionSink: Send {
    fn set_pid(&mut self, pid: u32) -> Result<()>;

    fn set_input_region(&mut self, rects: &[Rect]) -> Result<()>;

    fn clear_input_region(&mut self) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Factory function to create an appropriate region sink based on the dry_run flag
pub fn create_region_sink(config: &SinkConfig, dry_run: bool) -> Result<Box<dyn NativeRegionSink>> {
    let mut sink: Box<dyn NativeRegionSink> = if dry_run {
        Box::new(DryRunSink::new())
    } else {
        match config.kind {
            SinkKind::DryRun => Box::new(DryRunSink::new()),
            SinkKind::Json => Box::new(JsonLinesSink::open(&config.path)?),
        }
    };

    let pid = config.effective_pid();
    sink.set_pid(pid)?;
    Ok(sink)
}
