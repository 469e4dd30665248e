use crate::error::Result;
use crate::events::{ChangeEvent, ChangeReason};
use crate::scene::{ElementId, ElementSnapshot, ElementTree, LogicalRect, SharedScene};
use crate::services::scheduler::ChangeNotifier;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use super::r#trait::ChangeSource;

/// Источник для сухого запуска: двигает по сцене фиктивную кнопку и шлёт уведомления
pub struct DryRunChangeSource {
    scene: SharedScene,
    period: Duration,
}

impl DryRunChangeSource {
    pub fn new(scene: SharedScene, period: Duration) -> Self {
        Self { scene, period }
    }

    /// Вставить фиктивную кнопку в корень сцены
    fn ensure_button(&self) -> Result<ElementId> {
        self.scene.modify(|tree| {
            let mut button = ElementSnapshot::new(ElementId(0), "button");
            button.classes.push("dry-run".to_string());
            button.bounds = LogicalRect { left: 0.0, top: 0.0, width: 48.0, height: 24.0 };
            let root = tree.root();
            tree.insert(root, button)
        })
    }

    /// Сдвинуть кнопку на шаг вправо, по кругу в пределах окна
    fn step(&self, id: ElementId, index: usize) -> Result<()> {
        let width = self.scene.viewport().width.max(48.0);
        self.scene.modify(|tree| {
            tree.update(id, |el| {
                el.bounds.left = (index as f64 * 40.0) % (width - 48.0).max(1.0);
            })
        })
    }

    async fn run_impl(self, notifier: ChangeNotifier) -> Result<()> {
        info!("Dry-run режим - ChangeSource работает в режиме эмуляции");

        let reasons = [
            ChangeReason::Structure,
            ChangeReason::Scroll,
            ChangeReason::ElementResize,
            ChangeReason::ViewportResize,
        ];

        let mut button = self.ensure_button()?;
        let mut index = 0;
        let mut ticker = interval(self.period);

        loop {
            ticker.tick().await;
            if notifier.is_stopped() {
                break;
            }

            // Раз в полный круг причин пересоздаём кнопку, как при перестройке сцены
            if index > 0 && index % reasons.len() == 0 {
                if let Err(e) = self.scene.modify(|tree| tree.remove(button)) {
                    debug!("Dry-run: кнопка {} уже удалена: {}", button, e);
                }
                button = self.ensure_button()?;
            }

            if let Err(e) = self.step(button, index) {
                // Сцену могли подменить целиком, вставляем кнопку заново
                warn!("Dry-run: фиктивная кнопка пропала ({}), создаём снова", e);
                button = self.ensure_button()?;
            }

            let event = ChangeEvent::new(reasons[index % reasons.len()]);
            info!("Dry-run: эмулируем изменение сцены: {}", event);
            notifier.notify_because(event.reason);

            index += 1;
        }

        info!("Dry-run ChangeSource остановлен");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChangeSource for DryRunChangeSource {
    async fn run(self: Box<Self>, notifier: ChangeNotifier) -> Result<()> {
        (*self).run_impl(notifier).await
    }

    fn name(&self) -> &'static str {
        "dry_run"
    }
}
