//! Change sources: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for noticing that the observed
//! scene changed (structure, element sizes, scroll, viewport) and calling
//! `ChangeNotifier::notify()`. They MUST NOT compute regions or talk to sinks.

mod dry_run;
mod scene_watcher;
mod r#trait;

pub use self::r#trait::{create_change_sources, ChangeSource};
