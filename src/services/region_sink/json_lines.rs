use crate::error::{RegionError, Result};
use crate::geometry::Rect;
use crate::region_error;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use super::r#trait::NativeRegionSink;

/// Команда для нативного помощника, одна JSON-строка на команду
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum SinkCommand<'a> {
    SetPid { pid: u32 },
    SetInputRegion { pid: u32, rects: &'a [Rect] },
    ClearInputRegion { pid: u32 },
}

/// Приёмник, который дописывает команды в обычный файл построчно в JSON.
/// Применением формы окна занимается внешний помощник, читающий этот файл.
///
/// Запись синхронная и идёт прямо из цикла пересчёта, поэтому FIFO, сокеты и
/// устройства отвергаются при открытии.
pub struct JsonLinesSink<W: Write + Send = BufWriter<File>> {
    writer: W,
    pid: Option<u32>,
}

impl JsonLinesSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return RegionError::config("для приёмника json не задан sink.path");
        }

        // metadata, а не open: открытие FIFO на запись ждёт читателя
        if let Ok(metadata) = std::fs::metadata(path) {
            if !metadata.is_file() {
                return RegionError::config(format!(
                    "sink.path {:?} должен быть обычным файлом, а не FIFO или устройством",
                    path
                ));
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| region_error!(config, "Не удалось открыть {:?}: {}", path, e))?;

        info!("JsonLinesSink пишет команды в {:?}", path);
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pid: None }
    }

    fn require_pid(&self) -> Result<u32> {
        self.pid
            .ok_or_else(|| region_error!(sink_publish, "PID не задан, сначала вызовите set_pid"))
    }

    fn write_command(&mut self, command: &SinkCommand<'_>) -> Result<()> {
        let line = serde_json::to_string(command)?;
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|e| region_error!(sink_publish, "Не удалось записать команду: {}", e))?;
        debug!("JsonLinesSink: {}", line);
        Ok(())
    }
}

impl<W: Write + Send> NativeRegionSink for JsonLinesSink<W> {
    fn set_pid(&mut self, pid: u32) -> Result<()> {
        self.pid = Some(pid);
        self.write_command(&SinkCommand::SetPid { pid })
    }

    fn set_input_region(&mut self, rects: &[Rect]) -> Result<()> {
        let pid = self.require_pid()?;
        self.write_command(&SinkCommand::SetInputRegion { pid, rects })
    }

    fn clear_input_region(&mut self) -> Result<()> {
        let pid = self.require_pid()?;
        self.write_command(&SinkCommand::ClearInputRegion { pid })
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
