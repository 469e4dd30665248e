pub mod change;

pub use change::{ChangeEvent, ChangeReason};
