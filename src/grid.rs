use std::{fmt, num::NonZeroU32};

/// Number of rows and columns to cut an image into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: NonZeroU32,
    pub cols: NonZeroU32,
}

impl GridSpec {
    pub const fn new(rows: NonZeroU32, cols: NonZeroU32) -> Self {
        Self { rows, cols }
    }
}

/// A single grid cell, spanning `[x0, x1) x [y0, y1)` of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub row: u32,
    pub col: u32,
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRect {
    pub const fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub const fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// `R{row}C{col}.{extension}` with 1-based row and column.
    pub fn file_name(&self, extension: &str) -> String {
        format!("R{}C{}.{extension}", self.row + 1, self.col + 1)
    }
}

impl fmt::Display for CellRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{}C{} ({}, {})-({}, {})",
            self.row + 1,
            self.col + 1,
            self.x0,
            self.y0,
            self.x1,
            self.y1
        )
    }
}

/// Uniform grid over a `width x height` image.
///
/// Every cell uses the floored size `dimension / count`, except the last
/// column and row which stretch to the image edge and absorb the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
    cell_width: u32,
    cell_height: u32,
}

impl Grid {
    pub const fn new(width: u32, height: u32, spec: GridSpec) -> Self {
        let rows = spec.rows.get();
        let cols = spec.cols.get();

        Self {
            width,
            height,
            rows,
            cols,
            cell_width: width / cols,
            cell_height: height / rows,
        }
    }

    pub const fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Total number of cells, `rows * cols`.
    pub const fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub const fn cell(&self, row: u32, col: u32) -> CellRect {
        let (x0, x1) = span(col, self.cols, self.cell_width, self.width);
        let (y0, y1) = span(row, self.rows, self.cell_height, self.height);

        CellRect {
            row,
            col,
            x0,
            y0,
            x1,
            y1,
        }
    }

    /// Lazily yields every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = CellRect> {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| self.cell(row, col)))
    }
}

const fn span(idx: u32, count: u32, size: u32, limit: u32) -> (u32, u32) {
    let start = idx * size;

    if idx + 1 == count {
        (start, limit)
    } else {
        (start, start + size)
    }
}
