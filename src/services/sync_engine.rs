use super::scheduler::RecomputeTarget;
use super::{rasterize, HitTargetClassifier, NativeRegionSink, RegionCollector, RegionSignature};
use crate::config::RegionSettings;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::geometry::{bounding_union, Rect};
use crate::scene::ElementTree;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Итог одного цикла пересчёта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeOutcome {
    Published { rects: usize, collapsed: bool },
    Unchanged,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub cycles: u64,
    pub publishes: u64,
    pub unchanged: u64,
    pub failures: u64,
    pub collapses: u64,
}

/// Последняя успешно опубликованная область
#[derive(Debug, Clone)]
struct PublishedRegion {
    rects: Vec<Rect>,
    signature: RegionSignature,
}

/// Движок синхронизации: сбор рамок → растеризация → сравнение → публикация.
///
/// Опубликованная область принадлежит экземпляру движка, поэтому несколько
/// оверлеев могут работать независимо. До первой публикации область считается
/// неопубликованной, и первый цикл публикует результат всегда, даже пустой.
pub struct SyncEngine {
    settings: RegionSettings,
    collector: RegionCollector,
    tree: Arc<dyn ElementTree>,
    sink: Box<dyn NativeRegionSink>,
    published: Option<PublishedRegion>,
    stats: SyncStats,
}

impl SyncEngine {
    pub fn new(
        settings: RegionSettings,
        tree: Arc<dyn ElementTree>,
        sink: Box<dyn NativeRegionSink>,
    ) -> Result<Self> {
        settings.validate()?;
        let classifier = HitTargetClassifier::new(settings.parsed_selector()?);

        info!(
            "Инициализация SyncEngine (приёмник: {}, селектор: {}, tile_size: {}, max_rects: {})",
            sink.name(),
            classifier.selector().map_or("<все элементы>", |s| s.as_str()),
            settings.tile_size,
            settings.max_rects
        );

        Ok(Self {
            settings,
            collector: RegionCollector::new(classifier),
            tree,
            sink,
            published: None,
            stats: SyncStats::default(),
        })
    }

    /// Опубликованная область (пустая до первой публикации)
    pub fn published(&self) -> &[Rect] {
        self.published.as_ref().map(|p| p.rects.as_slice()).unwrap_or(&[])
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Размер поверхности в пикселях устройства
    fn surface_size(&self, pixel_ratio: f64) -> (u32, u32) {
        let viewport = self.tree.viewport();
        let to_px = |v: f64| (v * pixel_ratio).ceil().clamp(0.0, u32::MAX as f64) as u32;
        (to_px(viewport.width), to_px(viewport.height))
    }

    /// Кандидат на публикацию и признак схлопывания в одну рамку
    fn build_region(&self) -> (Vec<Rect>, bool) {
        let pixel_ratio = self
            .settings
            .effective_pixel_ratio(self.tree.device_pixel_ratio());
        let boxes = self.collector.collect(self.tree.as_ref(), pixel_ratio);
        if boxes.is_empty() {
            return (Vec::new(), false);
        }

        let (surface_w, surface_h) = self.surface_size(pixel_ratio);
        let rects = rasterize(&boxes, self.settings.tile_size, surface_w, surface_h);

        if rects.len() > self.settings.max_rects {
            debug_if_enabled!(
                "{} прямоугольников больше max_rects = {}, схлопываем в одну рамку",
                rects.len(),
                self.settings.max_rects
            );
            return (bounding_union(&rects).into_iter().collect(), true);
        }

        (rects, false)
    }

    pub fn recompute(&mut self) -> RecomputeOutcome {
        self.stats.cycles += 1;

        let (rects, collapsed) = self.build_region();
        if collapsed {
            self.stats.collapses += 1;
        }

        let signature = RegionSignature::of(&rects);
        if self
            .published
            .as_ref()
            .is_some_and(|p| p.signature == signature)
        {
            self.stats.unchanged += 1;
            debug_if_enabled!("Область не изменилась: {}", signature);
            return RecomputeOutcome::Unchanged;
        }

        match self.sink.set_input_region(&rects) {
            Ok(()) => {
                if signature.is_empty_region() {
                    debug_if_enabled!("Опубликована пустая область: окно прозрачно для ввода");
                } else {
                    debug_if_enabled!("Опубликована область: {}", signature);
                }
                self.stats.publishes += 1;
                let count = rects.len();
                self.published = Some(PublishedRegion { rects, signature });
                RecomputeOutcome::Published { rects: count, collapsed }
            }
            Err(e) => {
                // Подпись не трогаем: следующий отличающийся цикл повторит попытку
                self.stats.failures += 1;
                if e.is_recoverable() {
                    warn!("Не удалось опубликовать область ввода: {}", e);
                } else {
                    error!("Ошибка приёмника области ввода: {}", e);
                }
                RecomputeOutcome::Failed
            }
        }
    }

    /// Снять ограничение области ввода и забыть опубликованное состояние
    pub fn restore(&mut self) -> Result<()> {
        info!(
            "Восстановление полной области ввода окна (было прямоугольников: {})",
            self.published().len()
        );
        self.published = None;
        self.sink.clear_input_region()
    }
}

impl RecomputeTarget for SyncEngine {
    fn recompute(&mut self) {
        if let RecomputeOutcome::Published { rects, collapsed: true } = SyncEngine::recompute(self) {
            info!(
                "Область схлопнута в {} рамку: больше {} прямоугольников",
                rects, self.settings.max_rects
            );
        }
    }
}
