use crate::scene::{ElementSnapshot, PointerEvents, Selector};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Теги, которые считаются интерактивными независимо от оформления
static INTERACTIVE_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["button", "a", "input", "textarea", "select", "video", "canvas"]
        .into_iter()
        .collect()
});

/// Эвристика «принимает ли элемент указатель».
///
/// Порядок правил важен, срабатывает первое подходящее:
/// 1. невидимый элемент: нет;
/// 2. `pointer-events: none`: нет;
/// 3. совпадение с настроенным селектором: да;
/// 4. интерактивный тег: да;
/// 5. нулевая площадь: нет;
/// 6. видимый фон, картинка или рамка: да;
/// 7. иначе: нет.
#[derive(Debug, Clone, Default)]
pub struct HitTargetClassifier {
    selector: Option<Selector>,
}

impl HitTargetClassifier {
    pub fn new(selector: Option<Selector>) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub fn classify(&self, element: &ElementSnapshot) -> bool {
        let style = &element.style;

        if !style.is_visible() {
            return false;
        }

        if style.pointer_events == PointerEvents::None {
            return false;
        }

        if self.selector.as_ref().is_some_and(|sel| sel.matches(element)) {
            return true;
        }

        if INTERACTIVE_TAGS.contains(element.tag.as_str()) {
            return true;
        }

        if !element.bounds.has_area() {
            return false;
        }

        style.has_visible_background()
    }
}
