use crate::foundation::core::ScreenRect;

/// Grid dimensions `(columns, rows)` used for `count` tiles.
///
/// Rows are the largest power of two not above `sqrt(count)`; columns take the rest. When
/// `count` is not a multiple of the row count, fewer than `count` tiles are produced.
pub fn tile_grid(count: usize) -> (usize, usize) {
    let count = count.max(1);
    let rows = 1usize << (count.ilog2() / 2);
    (count / rows, rows)
}

/// Split `rect` into an as-square-as-possible grid of about `count` disjoint tiles.
///
/// Tiles are produced column by column, top to bottom inside a column. The last column and row
/// absorb the remainder of the integer division, so the tiles cover `rect` exactly. `0` is
/// treated as `1`.
pub fn split_tiles(rect: ScreenRect, count: usize) -> Vec<ScreenRect> {
    let (columns, rows) = tile_grid(count);
    let dx = rect.width.max(0) / columns as i32;
    let dy = rect.height.max(0) / rows as i32;

    let mut tiles = Vec::with_capacity(columns * rows);
    let mut x = rect.x;
    for i in 0..columns {
        let w = if i + 1 == columns {
            rect.x1() - x
        } else {
            dx
        };
        let mut y = rect.y;
        for j in 0..rows {
            let h = if j + 1 == rows {
                rect.y1() - y
            } else {
                dy
            };
            tiles.push(ScreenRect::new(x, y, w, h));
            y += dy;
        }
        x += dx;
    }
    tiles
}

#[cfg(test)]
#[path = "../../tests/unit/render/tiles.rs"]
mod tests;
