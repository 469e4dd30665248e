use serde::{Deserialize, Serialize};
use std::fmt;

/// Прямоугольник в пикселях устройства.
///
/// Ширина и высота всегда больше нуля: `Rect::new` отказывается создавать
/// вырожденный прямоугольник.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Option<Self> {
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self { x, y, w, h })
    }

    /// Правая граница (не включительно)
    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    /// Нижняя граница (не включительно)
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    #[cfg(test)]
    pub fn contains_point(&self, px: i64, py: i64) -> bool {
        px >= self.x as i64 && px < self.right() && py >= self.y as i64 && py < self.bottom()
    }

    /// Обрезать прямоугольник по поверхности `surface_w × surface_h`.
    /// Возвращает `None`, если от прямоугольника ничего не осталось.
    pub fn clip_to(&self, surface_w: u32, surface_h: u32) -> Option<Rect> {
        let x0 = (self.x as i64).max(0);
        let y0 = (self.y as i64).max(0);
        let x1 = self.right().min(surface_w as i64);
        let y1 = self.bottom().min(surface_h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Rect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_rect_is_rejected() {
        assert!(Rect::new(0, 0, 0, 5).is_none());
        assert!(Rect::new(0, 0, 5, 0).is_none());
        assert!(Rect::new(-3, 4, 1, 1).is_some());
    }

    #[test]
    fn test_contains_point() {
        let outer = Rect::new(0, 0, 24, 12).unwrap();
        assert!(outer.contains_point(0, 0));
        assert!(outer.contains_point(23, 11));
        assert!(!outer.contains_point(24, 0));
    }

    #[test]
    fn test_clip_to_surface() {
        let r = Rect::new(-5, 10, 20, 20).unwrap();
        assert_eq!(r.clip_to(12, 25), Rect::new(0, 10, 12, 15));
        assert_eq!(r.clip_to(100, 10), None);
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(Rect::new(1, 2, 3, 4).unwrap().to_string(), "1,2,3,4");
    }
}
