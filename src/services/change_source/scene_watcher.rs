use crate::error::Result;
use crate::events::{ChangeEvent, ChangeReason};
use crate::scene::{ElementTree, SceneDocument, SharedScene};
use crate::services::scheduler::ChangeNotifier;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::r#trait::ChangeSource;

/// Отпечаток содержимого файла сцены: размер и хеш байтов.
/// mtime не участвует: перезапись той же длины в пределах его разрешения иначе теряется.
type Fingerprint = (u64, u64);

/// Опрашивает файл сцены, перечитывает его при изменении и подменяет сцену
pub struct SceneFileWatcher {
    path: PathBuf,
    polling_interval: Duration,
    scene: SharedScene,
    last_fingerprint: Option<Fingerprint>,
}

impl SceneFileWatcher {
    pub fn new(path: PathBuf, polling_interval: Duration, scene: SharedScene) -> Self {
        let last_fingerprint = std::fs::read(&path).ok().map(|bytes| Self::fingerprint(&bytes));
        Self {
            path,
            polling_interval,
            scene,
            last_fingerprint,
        }
    }

    fn fingerprint(bytes: &[u8]) -> Fingerprint {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        (bytes.len() as u64, hasher.finish())
    }

    /// Перечитать сцену, если файл изменился. Возвращает причину изменения.
    fn poll_once(&mut self) -> Option<ChangeReason> {
        let content = std::fs::read(&self.path).ok();
        let fingerprint = content.as_deref().map(Self::fingerprint);
        if fingerprint == self.last_fingerprint {
            return None;
        }
        self.last_fingerprint = fingerprint;

        let Some(content) = content else {
            debug!("Файл сцены {:?} пропал, оставляем прежнюю сцену", self.path);
            return None;
        };

        let tree = match SceneDocument::from_slice(&content).and_then(SceneDocument::into_tree) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Не удалось перечитать сцену {:?}: {}", self.path, e);
                return None;
            }
        };

        let new_viewport = tree.viewport();
        let old = self.scene.replace(tree);
        let reason = if old.viewport() != new_viewport {
            ChangeReason::ViewportResize
        } else {
            ChangeReason::Structure
        };
        Some(reason)
    }

    async fn run_impl(mut self, notifier: ChangeNotifier) -> Result<()> {
        info!(
            "SceneFileWatcher следит за {:?} (интервал: {:?})",
            self.path, self.polling_interval
        );

        let mut ticker = interval(self.polling_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if notifier.is_stopped() {
                break;
            }

            if let Some(reason) = self.poll_once() {
                let event = ChangeEvent::new(reason);
                debug!("Сцена перечитана: {}", event);
                notifier.notify_because(event.reason);
            }
        }

        info!("SceneFileWatcher остановлен");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChangeSource for SceneFileWatcher {
    async fn run(self: Box<Self>, notifier: ChangeNotifier) -> Result<()> {
        (*self).run_impl(notifier).await
    }

    fn name(&self) -> &'static str {
        "scene_watcher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneTree, Viewport};
    use crate::services::scheduler::{ChangeScheduler, ImmediateFrameClock};

    fn notifier() -> ChangeNotifier {
        let (_scheduler, notifier) = ChangeScheduler::new(Duration::ZERO, Box::new(ImmediateFrameClock));
        notifier
    }

    fn scene_json(buttons: usize, width: u32) -> String {
        let children: Vec<String> = (0..buttons)
            .map(|i| format!(r#"{{"tag": "button", "bounds": {{"left": {}, "top": 0, "width": 10, "height": 10}}}}"#, i * 20))
            .collect();
        format!(
            r#"{{"viewport": {{"width": {}, "height": 100}}, "children": [{}]}}"#,
            width,
            children.join(",")
        )
    }

    #[test]
    fn test_poll_detects_structure_and_viewport_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, scene_json(1, 100)).unwrap();

        let scene = SharedScene::new(SceneTree::new(Viewport { width: 100.0, height: 100.0 }, 1.0));
        let mut watcher = SceneFileWatcher::new(path.clone(), Duration::from_millis(10), scene.clone());
        assert_eq!(watcher.poll_once(), None);

        std::fs::write(&path, scene_json(3, 100)).unwrap();
        assert_eq!(watcher.poll_once(), Some(ChangeReason::Structure));
        assert_eq!(scene.descendants(scene.root()).len(), 3);

        std::fs::write(&path, scene_json(3, 1000)).unwrap();
        assert_eq!(watcher.poll_once(), Some(ChangeReason::ViewportResize));
        assert_eq!(watcher.poll_once(), None);
    }

    #[test]
    fn test_same_length_rewrite_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, scene_json(2, 100)).unwrap();

        let scene = SharedScene::new(SceneTree::new(Viewport { width: 100.0, height: 100.0 }, 1.0));
        let mut watcher = SceneFileWatcher::new(path.clone(), Duration::from_millis(10), scene.clone());

        // Та же длина файла, другая ширина вьюпорта
        let rewritten = scene_json(2, 200);
        assert_eq!(rewritten.len(), scene_json(2, 100).len());
        std::fs::write(&path, rewritten).unwrap();

        assert_eq!(watcher.poll_once(), Some(ChangeReason::ViewportResize));
        assert_eq!(scene.viewport().width, 200.0);
        assert_eq!(watcher.poll_once(), None);
    }

    #[test]
    fn test_invalid_scene_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, scene_json(2, 100)).unwrap();

        let scene = SharedScene::new(SceneTree::new(Viewport::default(), 1.0));
        let mut watcher = SceneFileWatcher::new(path.clone(), Duration::from_millis(10), scene.clone());
        watcher.last_fingerprint = None;
        assert_eq!(watcher.poll_once(), Some(ChangeReason::ViewportResize));

        std::fs::write(&path, "{ broken").unwrap();
        assert_eq!(watcher.poll_once(), None);
        assert_eq!(scene.descendants(scene.root()).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_notifies_on_file_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, scene_json(1, 100)).unwrap();

        let scene = SharedScene::new(SceneTree::new(Viewport::default(), 1.0));
        let watcher = Box::new(SceneFileWatcher::new(path.clone(), Duration::from_millis(20), scene.clone()));
        let notifier = notifier();
        let task = tokio::spawn(watcher.run(notifier.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(notifier.notifications(), 0);

        std::fs::write(&path, scene_json(4, 100)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(notifier.notifications(), 1);
        assert_eq!(scene.descendants(scene.root()).len(), 4);

        task.abort();
    }
}
