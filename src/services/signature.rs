use crate::geometry::Rect;
use std::fmt;

/// Каноническая запись области: `x,y,w,h|x,y,w,h|...` в порядке вывода,
/// `EMPTY` для пустой области. Используется только для сравнения.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionSignature(String);

impl RegionSignature {
    const EMPTY: &'static str = "EMPTY";

    pub fn of(rects: &[Rect]) -> Self {
        if rects.is_empty() {
            return Self(Self::EMPTY.to_string());
        }

        let parts: Vec<String> = rects.iter().map(Rect::to_string).collect();
        Self(parts.join("|"))
    }

    pub fn is_empty_region(&self) -> bool {
        self.0 == Self::EMPTY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
