//! ChangeScheduler: responsibility and boundaries
//!
//! This module ONLY turns bursts of change notifications into rate-limited recompute
//! ticks. It knows nothing about elements, tiles or sinks: the work of a tick is
//! whatever the `RecomputeTarget` does.

mod change_scheduler;
mod frame_clock;

pub use self::change_scheduler::{ChangeNotifier, ChangeScheduler, RecomputeTarget};
pub use self::frame_clock::{create_frame_clock, FrameClock};
#[cfg(test)]
pub use self::frame_clock::{ImmediateFrameClock, IntervalFrameClock};
