use super::frame_clock::FrameClock;
use crate::events::ChangeReason;
use crate::trace_if_enabled;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info};

/// Работа, выполняемая на каждом тике планировщика
pub trait RecomputeTarget: Send {
    fn recompute(&mut self);
}

/// Состояние конечного автомата планировщика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    Idle = 0,
    FramePending = 1,
    ThrottleWait = 2,
    Running = 3,
    Stopped = 4,
}

impl SchedulerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SchedulerState::Idle,
            1 => SchedulerState::FramePending,
            2 => SchedulerState::ThrottleWait,
            3 => SchedulerState::Running,
            _ => SchedulerState::Stopped,
        }
    }
}

struct Shared {
    /// Пересчёт уже запланирован (FramePending/ThrottleWait)
    pending: AtomicBool,
    stopped: AtomicBool,
    state: AtomicU8,
    notifications: AtomicU64,
    wake: Notify,
    shutdown: Notify,
}

/// Дешёвая клонируемая ручка для источников изменений
#[derive(Clone)]
pub struct ChangeNotifier {
    shared: Arc<Shared>,
}

impl ChangeNotifier {
    /// Сообщить об изменении. Повторные вызовы до начала пересчёта ничего не делают;
    /// вызов во время пересчёта планирует ровно один следующий цикл.
    pub fn notify(&self) {
        if self.shared.stopped.load(Ordering::Acquire) {
            return;
        }
        self.shared.notifications.fetch_add(1, Ordering::Relaxed);

        if self.shared.pending.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.wake.notify_one();
    }

    pub fn notify_because(&self, reason: ChangeReason) {
        trace_if_enabled!("Уведомление об изменении: {}", reason);
        self.notify();
    }

    /// Остановить планировщик. Возвращает `false`, если он уже остановлен.
    pub fn stop(&self) -> bool {
        if self.shared.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shared.shutdown.notify_one();
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    pub fn notifications(&self) -> u64 {
        self.shared.notifications.load(Ordering::Relaxed)
    }
}

/// Схлопывает всплески уведомлений в пересчёты не чаще одного за кадр
/// и не чаще одного за `min_interval`.
pub struct ChangeScheduler {
    shared: Arc<Shared>,
    frame_clock: Box<dyn FrameClock>,
    min_interval: Duration,
    last_run: Option<Instant>,
}

impl ChangeScheduler {
    pub fn new(min_interval: Duration, frame_clock: Box<dyn FrameClock>) -> (Self, ChangeNotifier) {
        let shared = Arc::new(Shared {
            pending: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            state: AtomicU8::new(SchedulerState::Idle as u8),
            notifications: AtomicU64::new(0),
            wake: Notify::new(),
            shutdown: Notify::new(),
        });

        let scheduler = Self {
            shared: Arc::clone(&shared),
            frame_clock,
            min_interval,
            last_run: None,
        };
        (scheduler, ChangeNotifier { shared })
    }

    fn set_state(&self, state: SchedulerState) {
        self.shared.state.store(state as u8, Ordering::Release);
    }

    fn throttle_remaining(&self) -> Option<Duration> {
        let elapsed = self.last_run?.elapsed();
        self.min_interval.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Главный цикл. Возвращает цель пересчёта после остановки.
    pub async fn run<R: RecomputeTarget>(mut self, mut target: R) -> R {
        info!("ChangeScheduler запущен (min_interval: {:?})", self.min_interval);
        let shared = Arc::clone(&self.shared);

        loop {
            self.set_state(SchedulerState::Idle);
            tokio::select! {
                biased;
                _ = shared.shutdown.notified() => break,
                _ = shared.wake.notified() => {}
            }
            if shared.stopped.load(Ordering::Acquire) {
                break;
            }

            self.set_state(SchedulerState::FramePending);
            tokio::select! {
                biased;
                _ = shared.shutdown.notified() => break,
                _ = self.frame_clock.next_frame() => {}
            }

            if let Some(remaining) = self.throttle_remaining() {
                trace_if_enabled!("Троттлинг: ждём ещё {:?}", remaining);
                self.set_state(SchedulerState::ThrottleWait);
                // Остановка во время ожидания отменяет таймер вместе с future
                tokio::select! {
                    biased;
                    _ = shared.shutdown.notified() => break,
                    _ = sleep(remaining) => {}
                }
            }

            if shared.stopped.load(Ordering::Acquire) {
                break;
            }

            self.set_state(SchedulerState::Running);
            shared.pending.store(false, Ordering::Release);
            target.recompute();
            self.last_run = Some(Instant::now());
        }

        self.set_state(SchedulerState::Stopped);
        debug!(
            "ChangeScheduler остановлен, всего уведомлений: {}",
            shared.notifications.load(Ordering::Relaxed)
        );
        target
    }
}
