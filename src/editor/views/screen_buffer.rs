//! # Screen Buffer
//!
//! The terminal contents as the renderer believes them to be: one byte per
//! cell, `rows × columns`. Formatted rows are compared against it to find the
//! smallest span that needs rewriting.

/// Byte that never appears in formatted output; marks cells as unknown
const UNKNOWN: u8 = 0;

/// Believed terminal contents
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    /// Grid of cells [row][col]
    cells: Vec<Vec<u8>>,
    width: usize,
    height: usize,
}

impl ScreenBuffer {
    /// Create a grid whose every cell is unknown, so the first diff rewrites everything
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![UNKNOWN; width]; height],
            width,
            height,
        }
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Rebuild for a new terminal size; contents become unknown
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    /// Forget what is on screen
    pub fn invalidate(&mut self) {
        for row in &mut self.cells {
            row.fill(UNKNOWN);
        }
    }

    pub fn row(&self, row: usize) -> Option<&[u8]> {
        self.cells.get(row).map(Vec::as_slice)
    }

    /// Smallest inclusive column span where `line` differs from `row`
    ///
    /// Scans forward from column 0 and backward from the last column.
    /// `line` is compared over the grid width; missing bytes count as blanks.
    pub fn changed_span(&self, row: usize, line: &[u8]) -> Option<(usize, usize)> {
        let current = self.cells.get(row)?;
        let wanted = |col: usize| line.get(col).copied().unwrap_or(b' ');

        let first = (0..self.width).find(|&col| current[col] != wanted(col))?;
        let last = (first..self.width)
            .rev()
            .find(|&col| current[col] != wanted(col))
            .unwrap_or(first);
        Some((first, last))
    }

    /// Store `bytes` at `row` starting at `col`, clipped to the grid
    pub fn write(&mut self, row: usize, col: usize, bytes: &[u8]) {
        let Some(cells) = self.cells.get_mut(row) else {
            return;
        };
        if col >= self.width {
            return;
        }
        let count = bytes.len().min(self.width - col);
        cells[col..col + count].copy_from_slice(&bytes[..count]);
    }

    /// Store `bytes` as the whole row, padding with blanks
    pub fn set_row(&mut self, row: usize, bytes: &[u8]) {
        let width = self.width;
        let Some(cells) = self.cells.get_mut(row) else {
            return;
        };
        for (col, cell) in cells.iter_mut().enumerate().take(width) {
            *cell = bytes.get(col).copied().unwrap_or(b' ');
        }
    }

    /// Whether every cell of `row` is known
    pub fn is_row_known(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|cells| !cells.contains(&UNKNOWN))
    }
}
