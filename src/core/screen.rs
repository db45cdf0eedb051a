//! Screen buffer implementation
//!
//! A `ScreenBuffer` is one screen's worth of state: the grid of cells, the
//! cursor and the scroll margins. The terminal owns two of them (main and
//! alternate) and only one is active at a time. The buffer does no I/O.
//!
//! Direct indexing outside the grid is a bug in the caller and panics.
//! Cursor placement never fails: out-of-range positions are clamped.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// Largest grid, in cells, a host may request
pub const MAX_SCREEN_CELLS: usize = 1 << 20;

/// One grid row. `None` is an unwritten, default-styled blank.
pub type Row = Vec<Option<Cell>>;

/// The grid, cursor and scroll margins of one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBuffer {
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
    /// Row-major cell storage
    grid: Vec<Row>,
    /// Cursor column (0-indexed)
    cursor_col: usize,
    /// Cursor row (0-indexed)
    cursor_row: usize,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    /// Rows touched since the last `mark_clean`
    #[serde(skip)]
    dirty_lines: Vec<bool>,
}

fn blank_row(cols: usize) -> Row {
    vec![None; cols]
}

impl ScreenBuffer {
    /// Create an empty buffer. Both dimensions must be non-zero.
    pub fn new(cols: usize, rows: usize) -> Self {
        assert!(cols > 0 && rows > 0, "screen size {}x{} is empty", cols, rows);

        Self {
            cols,
            rows,
            grid: (0..rows).map(|_| blank_row(cols)).collect(),
            cursor_col: 0,
            cursor_row: 0,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            dirty_lines: vec![true; rows],
        }
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// `(cols, rows)`
    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Whether `(col, row)` addresses a cell of the grid
    pub fn is_in_range(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as u64) < self.cols as u64 && (row as u64) < self.rows as u64
    }

    fn assert_in_range(&self, col: usize, row: usize) {
        assert!(
            col < self.cols && row < self.rows,
            "position ({}, {}) out of bounds for {}x{} screen",
            col,
            row,
            self.cols,
            self.rows
        );
    }

    // ------------------------------------------------------------------
    // Cell access
    // ------------------------------------------------------------------

    /// Get the cell at `(col, row)`. `None` means blank.
    pub fn get_cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.assert_in_range(col, row);
        self.grid[row][col].as_ref()
    }

    /// Replace the cell at `(col, row)`
    pub fn set_cell(&mut self, cell: Option<Cell>, col: usize, row: usize) {
        self.assert_in_range(col, row);
        self.grid[row][col] = cell;
        self.mark_line_dirty(row);
    }

    /// Borrow a whole row
    pub fn row(&self, row: usize) -> &[Option<Cell>] {
        self.assert_in_range(0, row);
        &self.grid[row]
    }

    /// Text of a row with blanks as spaces and trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        let text: String = self
            .row(row)
            .iter()
            .map(|cell| cell.as_ref().map_or(' ', Cell::display_char))
            .collect();
        text.trim_end().to_string()
    }

    /// Glyphs of a row, one entry per column
    pub fn row_chars(&self, row: usize) -> Vec<Option<char>> {
        self.row(row)
            .iter()
            .map(|cell| cell.as_ref().and_then(|c| c.ch))
            .collect()
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// `(col, row)` of the cursor
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    /// Move the cursor, clamping each axis into the grid
    pub fn set_cursor(&mut self, col: i64, row: i64) {
        self.cursor_col = clamp_axis(col, self.cols);
        self.cursor_row = clamp_axis(row, self.rows);
    }

    /// Move the cursor relative to its current position, clamped
    pub fn move_cursor_by(&mut self, dcol: i64, drow: i64) {
        let col = (self.cursor_col as i64).saturating_add(dcol);
        let row = (self.cursor_row as i64).saturating_add(drow);
        self.set_cursor(col, row);
    }

    // ------------------------------------------------------------------
    // Scroll margins
    // ------------------------------------------------------------------

    /// Get scroll region top
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Get scroll region bottom
    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    /// Set the scroll region (0-indexed, inclusive). Callers validate first.
    pub fn set_scroll_margins(&mut self, top: usize, bottom: usize) {
        assert!(
            top < bottom && bottom < self.rows,
            "invalid scroll margins {}..={} for {} rows",
            top,
            bottom,
            self.rows
        );
        self.scroll_top = top;
        self.scroll_bottom = bottom;
    }

    /// Reset the scroll region to the full screen
    pub fn reset_scroll_margins(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    /// Scroll within the current margins. Positive `n` moves content up.
    pub fn scroll(&mut self, n: i64) {
        self.scroll_region(n, self.scroll_top, self.scroll_bottom);
    }

    /// Scroll rows `top..=bottom` by `n`.
    ///
    /// Positive `n` moves content toward row 0 and blanks appear at `bottom`;
    /// negative `n` moves content down and blanks appear at `top`. `|n|` is
    /// clamped to the window height. Rows outside the window are untouched.
    pub fn scroll_region(&mut self, n: i64, top: usize, bottom: usize) {
        assert!(
            top <= bottom && bottom < self.rows,
            "invalid scroll window {}..={} for {} rows",
            top,
            bottom,
            self.rows
        );
        if n == 0 {
            return;
        }

        let height = bottom - top + 1;
        let count = (n.unsigned_abs() as usize).min(height);
        let window = &mut self.grid[top..=bottom];

        if n > 0 {
            window.rotate_left(count);
            for row in &mut window[height - count..] {
                row.fill(None);
            }
        } else {
            window.rotate_right(count);
            for row in &mut window[..count] {
                row.fill(None);
            }
        }

        for row in top..=bottom {
            self.mark_line_dirty(row);
        }
    }

    /// Line feed: cursor to column 0 of the next row, scrolling the margins
    /// when the cursor sits on the bottom margin
    pub fn linefeed(&mut self) {
        let row = self.cursor_row;

        if row == self.scroll_bottom {
            self.scroll(1);
            self.set_cursor(0, row as i64);
        } else {
            self.set_cursor(0, row as i64 + 1);
        }
    }

    /// Reverse index: cursor up one row, scrolling down at the top margin
    pub fn reverse_index(&mut self) {
        if self.cursor_row == self.scroll_top {
            self.scroll(-1);
        } else {
            self.move_cursor_by(0, -1);
        }
    }

    // ------------------------------------------------------------------
    // Printing
    // ------------------------------------------------------------------

    /// Write `cell` at the cursor and advance. Running off the right edge
    /// performs a line feed.
    pub fn print(&mut self, cell: Cell) {
        let (col, row) = self.cursor();
        self.set_cell(Some(cell), col, row);

        if col + 1 >= self.cols {
            self.linefeed();
        } else {
            self.cursor_col = col + 1;
        }
    }

    // ------------------------------------------------------------------
    // Erasing
    // ------------------------------------------------------------------

    /// Blank `from..=to` in `row`; `to` is clamped to the last column
    pub fn erase_in_row(&mut self, row: usize, from: usize, to: usize) {
        let to = to.min(self.cols - 1);
        if from > to {
            return;
        }
        self.assert_in_range(from, row);
        self.grid[row][from..=to].fill(None);
        self.mark_line_dirty(row);
    }

    /// Blank every cell from `(from_col, from_row)` through
    /// `(to_col, to_row)` in row-major order, both ends inclusive
    pub fn erase_span(&mut self, from_col: usize, from_row: usize, to_col: usize, to_row: usize) {
        self.assert_in_range(from_col, from_row);
        self.assert_in_range(to_col, to_row);

        let start = from_row * self.cols + from_col;
        let end = to_row * self.cols + to_col;

        for index in start..=end {
            let (row, col) = (index / self.cols, index % self.cols);
            self.grid[row][col] = None;
        }
        for row in from_row..=to_row.max(from_row) {
            self.mark_line_dirty(row);
        }
    }

    /// Erase in line. 0: cursor to end, 1: start to cursor, 2: whole row.
    /// Other modes are ignored. The cursor does not move.
    pub fn erase_in_line(&mut self, mode: u32) {
        let (col, row) = self.cursor();
        match mode {
            0 => self.erase_in_row(row, col, self.cols - 1),
            1 => self.erase_in_row(row, 0, col),
            2 => self.erase_in_row(row, 0, self.cols - 1),
            _ => tracing::debug!("erase in line: unsupported mode {}", mode),
        }
    }

    /// Erase in display. 0: cursor to end of screen, 1: start of screen to
    /// cursor, 2: everything. Other modes are ignored.
    pub fn erase_in_display(&mut self, mode: u32) {
        let (col, row) = self.cursor();
        let (last_col, last_row) = (self.cols - 1, self.rows - 1);
        match mode {
            0 => self.erase_span(col, row, last_col, last_row),
            1 => self.erase_span(0, 0, col, row),
            2 => self.erase_span(0, 0, last_col, last_row),
            _ => tracing::debug!("erase in display: unsupported mode {}", mode),
        }
    }

    /// Blank `n` cells starting at the cursor
    pub fn erase_chars(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (col, row) = self.cursor();
        self.erase_in_row(row, col, col.saturating_add(n - 1));
    }

    // ------------------------------------------------------------------
    // Insert / delete
    // ------------------------------------------------------------------

    /// Shift cells from the cursor rightward by `n`, discarding what falls
    /// off the edge and leaving blanks behind
    pub fn insert_chars(&mut self, n: usize) {
        let (col, row) = self.cursor();
        let line = &mut self.grid[row];

        for i in (col..self.cols).rev() {
            line[i] = if i < col.saturating_add(n) {
                None
            } else {
                line[i - n].take()
            };
        }
        self.mark_line_dirty(row);
    }

    /// Shift cells after the cursor leftward by `n`, blanking the tail
    pub fn delete_chars(&mut self, n: usize) {
        let (col, row) = self.cursor();
        let line = &mut self.grid[row];

        for i in col..self.cols {
            line[i] = match i.checked_add(n) {
                Some(src) if src < self.cols => line[src].take(),
                _ => None,
            };
        }
        self.mark_line_dirty(row);
    }

    /// Insert `n` blank lines at the cursor row, pushing rows down to the
    /// bottom margin. Ignored when the cursor is below the margin.
    pub fn insert_lines(&mut self, n: usize) {
        self.shift_lines(-(n.min(self.rows) as i64));
    }

    /// Delete `n` lines at the cursor row, pulling rows up from the bottom
    /// margin. Ignored when the cursor is below the margin.
    pub fn delete_lines(&mut self, n: usize) {
        self.shift_lines(n.min(self.rows) as i64);
    }

    fn shift_lines(&mut self, n: i64) {
        let row = self.cursor_row;
        if row > self.scroll_bottom {
            tracing::debug!(
                "line insert/delete at row {} below scroll margin {}",
                row,
                self.scroll_bottom
            );
            return;
        }
        self.scroll_region(n, row, self.scroll_bottom);
    }

    // ------------------------------------------------------------------
    // Resize
    // ------------------------------------------------------------------

    /// Resize in place, keeping the overlapping rectangle. The cursor is
    /// clamped and the scroll margins reset to the full screen.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        assert!(
            new_cols > 0 && new_rows > 0,
            "screen size {}x{} is empty",
            new_cols,
            new_rows
        );
        if (new_cols, new_rows) == (self.cols, self.rows) {
            self.reset_scroll_margins();
            return;
        }

        for line in self.grid.iter_mut() {
            line.resize(new_cols, None);
        }
        self.grid.resize_with(new_rows, || blank_row(new_cols));

        self.cols = new_cols;
        self.rows = new_rows;
        self.cursor_col = self.cursor_col.min(new_cols - 1);
        self.cursor_row = self.cursor_row.min(new_rows - 1);
        self.reset_scroll_margins();

        self.dirty_lines = vec![true; new_rows];
    }

    // ------------------------------------------------------------------
    // Damage tracking
    // ------------------------------------------------------------------

    /// Check if any row changed since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty_lines.iter().any(|d| *d)
    }

    /// Rows changed since the last `mark_clean`, in ascending order
    pub fn dirty_rows(&self) -> Vec<usize> {
        self.dirty_lines
            .iter()
            .enumerate()
            .filter_map(|(row, dirty)| dirty.then_some(row))
            .collect()
    }

    /// Forget recorded damage
    pub fn mark_clean(&mut self) {
        self.dirty_lines.fill(false);
    }

    /// Mark every row as changed
    pub fn mark_all_dirty(&mut self) {
        self.dirty_lines = vec![true; self.rows];
    }

    fn mark_line_dirty(&mut self, row: usize) {
        if row >= self.dirty_lines.len() {
            // Deserialized buffers start without damage state
            self.dirty_lines.resize(self.rows, true);
        }
        self.dirty_lines[row] = true;
    }
}

fn clamp_axis(value: i64, len: usize) -> usize {
    value.clamp(0, len as i64 - 1) as usize
}
