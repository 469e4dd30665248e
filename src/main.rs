use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod geometry;
mod scene;
mod services;
mod utils;

use config::{Config, LoggingConfig};
use scene::{SceneDocument, SceneTree, SharedScene, Viewport};
use services::{create_change_sources, create_frame_clock, create_region_sink};

#[derive(Parser, Debug)]
#[command(name = "overlay-input-region")]
#[command(about = "Синхронизация области ввода прозрачного оверлея с интерактивными элементами")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "overlay.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает настройку из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    init_tracing(&config.logging, args.log_level.as_deref())?;

    info!("Запуск overlay-input-region v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Инициализация компонентов
    let scene = SharedScene::new(load_scene(&config.scene.path, args.dry_run)?);
    let sink = create_region_sink(&config.sink, args.dry_run)?;
    let sources = create_change_sources(&config, scene.clone(), args.dry_run);
    let frame_clock = create_frame_clock(&config.scheduler);

    info!("Все компоненты инициализированы");

    let handle = services::start(config.region.clone(), Arc::new(scene), sink, sources, frame_clock)
        .context("Не удалось запустить синхронизацию области ввода")?;

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Отключаем источники и отменяем взведённый таймер
    handle.stop();

    // Ожидаем завершения планировщика (с таймаутом)
    let shutdown_timeout = Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, handle.finish()).await {
        Ok(Some(mut engine)) => {
            if config.sink.restore_on_exit {
                // Возвращаем окну обычную обработку ввода
                if let Err(e) = engine.restore() {
                    warn!("Не удалось восстановить область ввода: {}", e);
                }
            }
            info!("Все сервисы завершили работу корректно");
        }
        Ok(None) => warn!("Движок синхронизации недоступен, восстановление пропущено"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("overlay-input-region завершил работу");
    Ok(())
}

/// Прочитать стартовую сцену. Отсутствующий файл даёт пустую сцену:
/// наблюдатель подхватит его, когда он появится.
fn load_scene(path: &Path, dry_run: bool) -> Result<SceneTree> {
    if !path.exists() {
        if !dry_run {
            warn!("Файл сцены {:?} не найден, начинаем с пустой сцены", path);
        }
        return Ok(SceneTree::new(Viewport::default(), 1.0));
    }

    let tree = SceneDocument::load(path)
        .and_then(SceneDocument::into_tree)
        .with_context(|| format!("Не удалось прочитать сцену из {:?}", path))?;
    info!("Сцена загружена из {:?}: {} элементов", path, tree.len());
    Ok(tree)
}

fn init_tracing(logging: &LoggingConfig, cli_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| match cli_level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_new(format!("{},{}", logging.level, logging.filter)),
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
