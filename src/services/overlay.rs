use crate::config::RegionSettings;
use crate::error::Result;
use crate::events::ChangeReason;
use crate::scene::ElementTree;
use crate::services::change_source::ChangeSource;
use crate::services::region_sink::NativeRegionSink;
use crate::services::scheduler::{ChangeNotifier, ChangeScheduler, FrameClock};
use crate::services::sync_engine::SyncEngine;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Запустить синхронизацию области ввода.
///
/// Ошибки конфигурации всплывают сразу, до запуска каких-либо задач.
/// Нужен работающий рантайм tokio; пересчёты выполняются в одной задаче,
/// которая владеет `SyncEngine` и никогда не пересекается сама с собой.
pub fn start(
    settings: RegionSettings,
    tree: Arc<dyn ElementTree>,
    sink: Box<dyn NativeRegionSink>,
    sources: Vec<Box<dyn ChangeSource>>,
    frame_clock: Box<dyn FrameClock>,
) -> Result<RegionHandle> {
    let min_interval = settings.min_interval();
    let engine = SyncEngine::new(settings, tree, sink)?;
    let (scheduler, notifier) = ChangeScheduler::new(min_interval, frame_clock);

    let scheduler_task = tokio::spawn(scheduler.run(engine));

    let source_tasks: Vec<JoinHandle<()>> = sources
        .into_iter()
        .map(|source| {
            let name = source.name();
            let notifier = notifier.clone();
            info!("Запуск источника изменений: {}", name);
            tokio::spawn(async move {
                if let Err(e) = source.run(notifier).await {
                    error!("Ошибка в источнике изменений {}: {}", name, e);
                }
            })
        })
        .collect();

    // Первичный пересчёт, как при первом срабатывании наблюдателей
    notifier.notify_because(ChangeReason::Initial);

    Ok(RegionHandle {
        notifier,
        scheduler: Mutex::new(Some(scheduler_task)),
        sources: Mutex::new(source_tasks),
    })
}

/// Ручка запущенной синхронизации
pub struct RegionHandle {
    notifier: ChangeNotifier,
    scheduler: Mutex<Option<JoinHandle<SyncEngine>>>,
    sources: Mutex<Vec<JoinHandle<()>>>,
}

impl RegionHandle {
    #[cfg(test)]
    pub fn notifier(&self) -> ChangeNotifier {
        self.notifier.clone()
    }

    /// Отключить все источники и остановить планировщик.
    /// Взведённый таймер троттлинга отменяется; повторный вызов ничего не делает.
    pub fn stop(&self) {
        if !self.notifier.stop() {
            debug!("RegionHandle уже остановлен");
            return;
        }

        let sources: Vec<_> = self.sources.lock().drain(..).collect();
        info!(
            "Остановка синхронизации области ввода ({} источников, планировщик: {:?})",
            sources.len(),
            self.notifier.state()
        );
        for task in sources {
            task.abort();
        }
    }

    /// Остановить и дождаться задачи планировщика; возвращает движок
    /// (например, чтобы восстановить окно). `None`, если движок уже забрали.
    pub async fn finish(&self) -> Option<SyncEngine> {
        self.stop();

        let task = self.scheduler.lock().take()?;
        match task.await {
            Ok(engine) => {
                let stats = engine.stats();
                info!(
                    "Синхронизация завершена: уведомлений {}, циклов {}, публикаций {}, без изменений {}, ошибок {}, схлопываний {}",
                    self.notifier.notifications(),
                    stats.cycles,
                    stats.publishes,
                    stats.unchanged,
                    stats.failures,
                    stats.collapses
                );
                Some(engine)
            }
            Err(e) => {
                warn!("Задача планировщика завершилась аварийно: {}", e);
                None
            }
        }
    }
}

impl Drop for RegionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegionError;
    use crate::geometry::Rect;
    use crate::scene::{SceneTree, SharedScene, Viewport};
    use crate::services::scheduler::ImmediateFrameClock;
    use crate::services::sync_engine::tests::{button, RecordingSink};
    use tokio::time::{sleep, Duration};

    /// Источник, который уведомляет каждые 10мс
    struct Ticker;

    #[async_trait::async_trait]
    impl ChangeSource for Ticker {
        async fn run(self: Box<Self>, notifier: ChangeNotifier) -> Result<()> {
            loop {
                sleep(Duration::from_millis(10)).await;
                notifier.notify_because(ChangeReason::Scroll);
            }
        }

        fn name(&self) -> &'static str {
            "ticker"
        }
    }

    fn scene() -> SharedScene {
        SharedScene::new(SceneTree::new(Viewport { width: 120.0, height: 120.0 }, 1.0))
    }

    #[tokio::test(start_paused = true)]
    async fn start_publishes_and_follows_changes() {
        let scene = scene();
        let sink = RecordingSink::default();
        let handle = start(
            RegionSettings::default(),
            Arc::new(scene.clone()),
            Box::new(sink.clone()),
            Vec::new(),
            Box::new(ImmediateFrameClock),
        )
        .unwrap();

        sleep(Duration::from_millis(5)).await;
        assert_eq!(sink.calls.lock().as_slice(), &[Vec::<Rect>::new()]);

        scene.modify(|tree| {
            let root = tree.root();
            tree.insert(root, button(0.0, 0.0, 10.0, 10.0))
        })
        .unwrap();
        handle.notifier().notify_because(ChangeReason::Structure);
        sleep(Duration::from_millis(50)).await;

        assert_eq!(sink.calls.lock().len(), 2);
        assert_eq!(sink.calls.lock()[1], vec![Rect::new(0, 0, 12, 12).unwrap()]);

        let engine = handle.finish().await.unwrap();
        assert_eq!(engine.stats().publishes, 2);
        assert!(handle.finish().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_settings_fail_before_start() {
        let settings = RegionSettings { max_rects: 0, ..RegionSettings::default() };
        let result = start(
            settings,
            Arc::new(scene()),
            Box::new(RecordingSink::default()),
            vec![Box::new(Ticker)],
            Box::new(ImmediateFrameClock),
        );
        assert!(matches!(result, Err(RegionError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_detaches_sources_and_is_idempotent() {
        let handle = start(
            RegionSettings::default(),
            Arc::new(scene()),
            Box::new(RecordingSink::default()),
            vec![Box::new(Ticker)],
            Box::new(ImmediateFrameClock),
        )
        .unwrap();

        sleep(Duration::from_millis(35)).await;
        let notifier = handle.notifier();
        // Первичное уведомление и три тика источника
        assert_eq!(notifier.notifications(), 4);

        handle.stop();
        handle.stop();
        assert!(handle.notifier().is_stopped());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(notifier.notifications(), 4);

        let engine = handle.finish().await.unwrap();
        assert!(engine.stats().cycles >= 1);
    }
}
