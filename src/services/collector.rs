use super::HitTargetClassifier;
use crate::debug_if_enabled;
use crate::geometry::Rect;
use crate::scene::{ElementTree, LogicalRect};

/// Перевод логической рамки в пиксели устройства.
///
/// Начало округляется вниз, размер вверх: область ввода может только
/// расшириться наружу, но никогда не срезать элемент.
pub fn to_device_box(bounds: &LogicalRect, pixel_ratio: f64) -> Option<Rect> {
    let x = (bounds.left * pixel_ratio).floor();
    let y = (bounds.top * pixel_ratio).floor();
    let w = (bounds.width * pixel_ratio).ceil();
    let h = (bounds.height * pixel_ratio).ceil();

    if !(w > 0.0 && h > 0.0) {
        return None;
    }

    Rect::new(
        x.clamp(i32::MIN as f64, i32::MAX as f64) as i32,
        y.clamp(i32::MIN as f64, i32::MAX as f64) as i32,
        w.min(u32::MAX as f64) as u32,
        h.min(u32::MAX as f64) as u32,
    )
}

/// Сборщик рамок интерактивных элементов
#[derive(Debug, Clone, Default)]
pub struct RegionCollector {
    classifier: HitTargetClassifier,
}

impl RegionCollector {
    pub fn new(classifier: HitTargetClassifier) -> Self {
        Self { classifier }
    }

    /// Обойти кандидатов, отобрать интерактивные и вернуть их рамки в пикселях устройства.
    ///
    /// Кандидаты: совпадения с селектором, если он задан, иначе все потомки корня.
    /// Элемент, исчезнувший между перечислением и чтением, пропускается.
    pub fn collect(&self, tree: &dyn ElementTree, pixel_ratio: f64) -> Vec<Rect> {
        let candidates = match self.classifier.selector() {
            Some(selector) => tree.select(selector),
            None => tree.descendants(tree.root()),
        };

        let mut boxes = Vec::with_capacity(candidates.len());
        let mut stale = 0usize;

        for id in candidates {
            let element = match tree.snapshot(id) {
                Ok(element) => element,
                Err(e) => {
                    stale += 1;
                    debug_if_enabled!("Элемент {} пропущен: {}", id, e);
                    continue;
                }
            };

            if !self.classifier.classify(&element) {
                continue;
            }

            if let Some(device_box) = to_device_box(&element.bounds, pixel_ratio) {
                boxes.push(device_box);
            }
        }

        debug_if_enabled!("Собрано {} рамок, пропущено исчезнувших элементов: {}", boxes.len(), stale);
        boxes
    }
}
