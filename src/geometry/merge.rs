//! Слияние соседних прямоугольников.
//!
//! Это дешёвое приближение, а не минимальное покрытие: объединяются только
//! прямоугольники, совпадающие по одной оси и касающиеся/перекрывающиеся по другой.

use super::Rect;

/// Проход A: сортировка по `(y, x)` и склейка прямоугольников одной строки
/// (равные `y` и `h`), касающихся или перекрывающихся по `x`.
pub fn merge_horizontal(rects: &[Rect]) -> Vec<Rect> {
    let mut sorted = rects.to_vec();
    sorted.sort_by_key(|r| (r.y, r.x));

    let mut out: Vec<Rect> = Vec::with_capacity(sorted.len());
    for r in sorted {
        match out.last_mut() {
            Some(last) if last.y == r.y && last.h == r.h && r.x as i64 <= last.right() => {
                last.w = (last.right().max(r.right()) - last.x as i64) as u32;
            }
            _ => out.push(r),
        }
    }
    out
}

/// Проход B: сортировка по `(x, w, y)` и склейка столбцов (равные `x` и `w`),
/// касающихся или перекрывающихся по `y`. Результат упорядочен по `(y, x)`.
pub fn merge_vertical(rects: &[Rect]) -> Vec<Rect> {
    let mut sorted = rects.to_vec();
    sorted.sort_by_key(|r| (r.x, r.w, r.y));

    let mut out: Vec<Rect> = Vec::with_capacity(sorted.len());
    for r in sorted {
        match out.last_mut() {
            Some(last) if last.x == r.x && last.w == r.w && r.y as i64 <= last.bottom() => {
                last.h = (last.bottom().max(r.bottom()) - last.y as i64) as u32;
            }
            _ => out.push(r),
        }
    }
    out.sort_by_key(|r| (r.y, r.x));
    out
}

/// Ограничивающий прямоугольник для всего набора
pub fn bounding_union(rects: &[Rect]) -> Option<Rect> {
    let first = rects.first()?;
    let (mut x0, mut y0) = (first.x as i64, first.y as i64);
    let (mut x1, mut y1) = (first.right(), first.bottom());
    for r in &rects[1..] {
        x0 = x0.min(r.x as i64);
        y0 = y0.min(r.y as i64);
        x1 = x1.max(r.right());
        y1 = y1.max(r.bottom());
    }
    Rect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rect {
        Rect::new(x, y, w, h).unwrap()
    }

    #[test]
    fn test_horizontal_merges_touching_and_overlapping() {
        let merged = merge_horizontal(&[rect(24, 0, 12, 12), rect(0, 0, 12, 12), rect(10, 0, 14, 12)]);
        assert_eq!(merged, vec![rect(0, 0, 36, 12)]);
    }

    #[test]
    fn test_horizontal_keeps_gaps_and_different_heights() {
        let merged = merge_horizontal(&[rect(0, 0, 12, 12), rect(13, 0, 12, 12), rect(25, 0, 12, 24)]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_vertical_merges_columns_in_any_order() {
        // Две колонки, перемешанные по строкам: проход B сортирует сам
        let input = [
            rect(0, 0, 12, 12),
            rect(36, 0, 12, 12),
            rect(0, 12, 12, 12),
            rect(36, 12, 12, 12),
        ];
        let merged = merge_vertical(&input);
        assert_eq!(merged, vec![rect(0, 0, 12, 24), rect(36, 0, 12, 24)]);
    }

    #[test]
    fn test_vertical_does_not_merge_different_widths() {
        let merged = merge_vertical(&[rect(0, 0, 12, 12), rect(0, 12, 24, 12)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_bounding_union() {
        assert_eq!(bounding_union(&[]), None);
        let u = bounding_union(&[rect(10, 10, 5, 5), rect(0, 20, 2, 2), rect(30, 0, 1, 1)]);
        assert_eq!(u, Some(rect(0, 0, 31, 22)));
    }
}
