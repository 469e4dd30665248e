use crate::geometry::{merge_horizontal, merge_vertical, Rect};

/// Сетка покрытия `cols × rows`; живёт ровно один вызов растеризации
#[derive(Debug)]
struct TileGrid {
    cols: usize,
    rows: usize,
    tile_size: u32,
    surface_w: u32,
    surface_h: u32,
    cells: Vec<bool>,
}

impl TileGrid {
    fn new(tile_size: u32, surface_w: u32, surface_h: u32) -> Self {
        let cols = surface_w.div_ceil(tile_size) as usize;
        let rows = surface_h.div_ceil(tile_size) as usize;
        Self {
            cols,
            rows,
            tile_size,
            surface_w,
            surface_h,
            cells: vec![false; cols * rows],
        }
    }

    /// Пометить все тайлы, которые задевает рамка (с обрезкой по сетке)
    fn mark(&mut self, b: &Rect) {
        let ts = self.tile_size as i64;
        let x0 = (b.x as i64).div_euclid(ts).max(0);
        let y0 = (b.y as i64).div_euclid(ts).max(0);
        let x1 = (b.right() - 1).div_euclid(ts).min(self.cols as i64 - 1);
        let y1 = (b.bottom() - 1).div_euclid(ts).min(self.rows as i64 - 1);

        if x1 < x0 || y1 < y0 {
            return;
        }

        for row in y0 as usize..=y1 as usize {
            let base = row * self.cols;
            self.cells[base + x0 as usize..=base + x1 as usize].fill(true);
        }
    }

    /// Прямоугольник серии тайлов, обрезанный по поверхности.
    /// Считается в i64; серия, не представимая в `Rect`, отбрасывается.
    fn run_rect(&self, row: usize, start: usize, end: usize) -> Option<Rect> {
        let ts = self.tile_size as i64;
        let x0 = start as i64 * ts;
        let y0 = row as i64 * ts;
        let x1 = (end as i64 * ts).min(self.surface_w as i64);
        let y1 = (y0 + ts).min(self.surface_h as i64);

        Rect::new(
            i32::try_from(x0).ok()?,
            i32::try_from(y0).ok()?,
            u32::try_from(x1 - x0).ok()?,
            u32::try_from(y1 - y0).ok()?,
        )
    }

    /// Каждая максимальная серия помеченных тайлов в строке становится прямоугольником
    fn row_runs(&self) -> Vec<Rect> {
        let mut rects = Vec::new();

        for row in 0..self.rows {
            let cells = &self.cells[row * self.cols..(row + 1) * self.cols];
            let mut start: Option<usize> = None;

            for (col, marked) in cells.iter().copied().chain(std::iter::once(false)).enumerate() {
                match (marked, start) {
                    (true, None) => start = Some(col),
                    (false, Some(s)) => {
                        rects.extend(self.run_rect(row, s, col));
                        start = None;
                    }
                    _ => {}
                }
            }
        }

        rects
    }
}

/// Квантовать рамки по тайлам и вернуть сокращённый список прямоугольников.
///
/// Это приближение, а не оптимальное покрытие: стоимость линейна по числу тайлов.
/// Выход детерминирован (порядок `(y, x)`) и обрезан по поверхности.
pub fn rasterize(boxes: &[Rect], tile_size: u32, surface_w: u32, surface_h: u32) -> Vec<Rect> {
    if boxes.is_empty() || tile_size == 0 || surface_w == 0 || surface_h == 0 {
        return Vec::new();
    }

    let mut grid = TileGrid::new(tile_size, surface_w, surface_h);
    for b in boxes {
        grid.mark(b);
    }

    let runs = grid.row_runs();
    let merged = merge_vertical(&merge_horizontal(&runs));

    merged
        .iter()
        .filter_map(|r| r.clip_to(surface_w, surface_h))
        .collect()
}
