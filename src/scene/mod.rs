//! Модель наблюдаемой иерархии элементов.
//!
//! Ядро синхронизации работает только через трейт [`ElementTree`]; [`SceneTree`]
//! реализует его поверх JSON-документа сцены, [`SharedScene`] позволяет
//! подменять сцену на лету из наблюдателя файла.

pub mod document;
pub mod element;
pub mod selector;
pub mod tree;

pub use document::SceneDocument;
pub use element::{ComputedStyle, ElementId, ElementSnapshot, LogicalRect, PointerEvents, Viewport};
pub use selector::Selector;
pub use tree::{ElementTree, SceneTree, SharedScene};
