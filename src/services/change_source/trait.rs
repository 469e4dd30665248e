use crate::config::Config;
use crate::error::Result;
use crate::scene::SharedScene;
use crate::services::scheduler::ChangeNotifier;
use std::time::Duration;

use super::dry_run::DryRunChangeSource;
use super::scene_watcher::SceneFileWatcher;

/// Источник изменений: наблюдает за сценой и зовёт `notifier.notify()` на каждое событие.
///
/// Ядру всё равно, как именно источник узнаёт об изменениях.
#[async_trait::async_trait]
pub trait ChangeSource: Send {
    /// Run the change source until it is aborted
    async fn run(self: Box<Self>, notifier: ChangeNotifier) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Factory function to create appropriate change sources based on the dry_run flag
pub fn create_change_sources(
    config: &Config,
    scene: SharedScene,
    dry_run: bool,
) -> Vec<Box<dyn ChangeSource>> {
    if dry_run {
        vec![Box::new(DryRunChangeSource::new(scene, Duration::from_secs(2)))]
    } else {
        vec![Box::new(SceneFileWatcher::new(
            config.scene.path.clone(),
            Duration::from_millis(config.scene.polling_interval_ms),
            scene,
        ))]
    }
}
