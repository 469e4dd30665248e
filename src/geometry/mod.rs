pub mod merge;
pub mod rect;

pub use merge::{bounding_union, merge_horizontal, merge_vertical};
pub use rect::Rect;
