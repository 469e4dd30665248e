use crate::config::SchedulerConfig;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::info;

/// Источник границ кадра: все уведомления до границы схлопываются в один пересчёт
#[async_trait::async_trait]
pub trait FrameClock: Send {
    /// Дождаться следующей границы кадра
    async fn next_frame(&mut self);
}

/// Кадры с фиксированным периодом, как у обновления экрана
pub struct IntervalFrameClock {
    interval: Interval,
}

impl IntervalFrameClock {
    pub fn new(period: Duration) -> Self {
        // Первый тик tokio-интервала мгновенный, поэтому стартуем через период
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait::async_trait]
impl FrameClock for IntervalFrameClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

/// Граница кадра на следующем шаге планировщика tokio
#[derive(Debug, Default)]
pub struct ImmediateFrameClock;

#[async_trait::async_trait]
impl FrameClock for ImmediateFrameClock {
    async fn next_frame(&mut self) {
        tokio::task::yield_now().await;
    }
}

/// Factory function to create a frame clock: `frame_interval_ms = 0` means no frame pacing
pub fn create_frame_clock(config: &SchedulerConfig) -> Box<dyn FrameClock> {
    if config.frame_interval_ms == 0 {
        info!("Кадровая синхронизация отключена, пересчёт на следующем шаге рантайма");
        Box::new(ImmediateFrameClock)
    } else {
        Box::new(IntervalFrameClock::new(Duration::from_millis(config.frame_interval_ms)))
    }
}
