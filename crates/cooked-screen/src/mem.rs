//! In-memory reference implementation of [`ScreenBuffer`].
//!
//! Backs the test suites and doubles as a worked example for embedders
//! wiring the contract to a real text buffer. The viewport always covers
//! the whole grid; scrolling shifts rows up and reports the shift through
//! `write_text` so cursor unwinding stays exact.

use anyhow::{bail, Result};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::{Cell, CellAttrs, Coord, Point, Rect, ScreenBuffer, Size};

const DEFAULT_ATTRS: CellAttrs = CellAttrs::new(0x0007);
const POPUP_ATTRS: CellAttrs = CellAttrs::new(0x00f5);
const TAB_STOP: Coord = 8;

#[derive(Debug, Clone)]
pub struct MemoryScreen {
    width: Coord,
    height: Coord,
    cells: Vec<Cell>,
    cursor: Point,
    popup_shown: bool,
    overtype: bool,
}

impl MemoryScreen {
    pub fn new(width: Coord, height: Coord) -> Self {
        assert!(width > 0 && height > 0, "screen must not be degenerate");
        Self {
            width,
            height,
            cells: vec![Cell::blank(DEFAULT_ATTRS); (width * height) as usize],
            cursor: Point::default(),
            popup_shown: false,
            overtype: false,
        }
    }

    pub fn cell(&self, x: Coord, y: Coord) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// The characters of one row, as a string (padding cells included).
    pub fn row_string(&self, y: Coord) -> String {
        (0..self.width).map(|x| self.cell(x, y).ch).collect()
    }

    pub fn popup_shown(&self) -> bool {
        self.popup_shown
    }

    pub fn overtype(&self) -> bool {
        self.overtype
    }

    fn index(&self, x: Coord, y: Coord) -> usize {
        debug_assert!(x >= 0 && x < self.width && y >= 0 && y < self.height);
        (y * self.width + x) as usize
    }

    fn scroll_up(&mut self) {
        let w = self.width as usize;
        self.cells.copy_within(w.., 0);
        let len = self.cells.len();
        self.cells[len - w..].fill(Cell::blank(DEFAULT_ATTRS));
    }

    /// Advance to the next row, scrolling the grid when the cursor would
    /// fall off the bottom. Returns 1 if a scroll happened.
    fn line_feed(&mut self, y: &mut Coord) -> Coord {
        *y += 1;
        if *y >= self.height {
            self.scroll_up();
            *y = self.height - 1;
            1
        } else {
            0
        }
    }

    fn put_cell(&mut self, x: &mut Coord, y: &mut Coord, ch: char, attrs: CellAttrs) -> Coord {
        let mut scrolled = 0;
        let idx = self.index(*x, *y);
        self.cells[idx] = Cell::new(ch, attrs);
        *x += 1;
        if *x >= self.width {
            *x = 0;
            scrolled += self.line_feed(y);
        }
        scrolled
    }
}

fn control_repr(ch: char) -> char {
    if ch == '\u{7f}' {
        '?'
    } else {
        char::from(ch as u8 + 0x40)
    }
}

impl ScreenBuffer for MemoryScreen {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn viewport(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn cursor(&self) -> Point {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Point) -> Result<()> {
        if pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height {
            bail!("cursor position {pos:?} outside {}x{} grid", self.width, self.height);
        }
        self.cursor = pos;
        Ok(())
    }

    fn make_cursor_visible(&mut self, _pos: Point) {
        // The viewport covers the whole grid.
    }

    fn write_text(&mut self, text: &str, attrs: CellAttrs) -> Result<Coord> {
        let mut x = self.cursor.x;
        let mut y = self.cursor.y;
        let mut scrolled = 0;

        for g in text.graphemes(true) {
            let mut chars = g.chars();
            let first = chars.next().unwrap_or(' ');
            if chars.next().is_none() && first.is_ascii_control() {
                match first {
                    '\r' => x = 0,
                    '\n' => scrolled += self.line_feed(&mut y),
                    '\t' => {
                        let target = ((x / TAB_STOP) + 1) * TAB_STOP;
                        let target = target.min(self.width);
                        while x < target {
                            scrolled += self.put_cell(&mut x, &mut y, ' ', attrs);
                            if x == 0 {
                                break;
                            }
                        }
                    }
                    c => {
                        // Interactive writes visualize control codes as ^X.
                        scrolled += self.put_cell(&mut x, &mut y, '^', attrs);
                        scrolled += self.put_cell(&mut x, &mut y, control_repr(c), attrs);
                    }
                }
                continue;
            }

            let w = g.width().clamp(1, 2) as Coord;
            if w == 2 && x == self.width - 1 {
                // No room for the trailing half; pad and wrap first.
                scrolled += self.put_cell(&mut x, &mut y, ' ', attrs);
            }
            scrolled += self.put_cell(&mut x, &mut y, first, attrs);
            if w == 2 {
                scrolled += self.put_cell(&mut x, &mut y, ' ', attrs);
            }
        }

        self.cursor = Point::new(x, y);
        Ok(scrolled)
    }

    fn write_row(
        &mut self,
        row: Coord,
        col_begin: Coord,
        col_limit: Coord,
        text: &str,
        attrs: CellAttrs,
    ) -> Result<()> {
        if row < 0 || row >= self.height {
            bail!("row {row} outside {}-row grid", self.height);
        }
        let mut col = col_begin.max(0);
        let limit = col_limit.min(self.width);
        for g in text.graphemes(true) {
            let w = g.width().clamp(1, 2) as Coord;
            if col + w > limit {
                break;
            }
            let first = g.chars().next().unwrap_or(' ');
            let idx = self.index(col, row);
            self.cells[idx] = Cell::new(first, attrs);
            if w == 2 {
                let idx = self.index(col + 1, row);
                self.cells[idx] = Cell::blank(attrs);
            }
            col += w;
        }
        Ok(())
    }

    fn read_rect(&self, rect: Rect) -> Result<Vec<Cell>> {
        if rect.left < 0 || rect.top < 0 || rect.right > self.width || rect.bottom > self.height {
            bail!("rect {rect:?} outside {}x{} grid", self.width, self.height);
        }
        let mut out = Vec::with_capacity(rect.area().max(0) as usize);
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                out.push(self.cell(x, y));
            }
        }
        Ok(out)
    }

    fn write_rect(&mut self, rect: Rect, cells: &[Cell]) -> Result<()> {
        if rect.left < 0 || rect.top < 0 || rect.right > self.width || rect.bottom > self.height {
            bail!("rect {rect:?} outside {}x{} grid", self.width, self.height);
        }
        if cells.len() as i64 != rect.area() {
            bail!("cell count {} does not match rect area {}", cells.len(), rect.area());
        }
        let mut it = cells.iter();
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                if let Some(cell) = it.next() {
                    let idx = self.index(x, y);
                    self.cells[idx] = *cell;
                }
            }
        }
        Ok(())
    }

    fn default_attrs(&self) -> CellAttrs {
        DEFAULT_ATTRS
    }

    fn popup_attrs(&self) -> CellAttrs {
        POPUP_ATTRS
    }

    fn set_popup_shown(&mut self, shown: bool) {
        self.popup_shown = shown;
    }

    fn set_cursor_overtype(&mut self, overtype: bool) {
        self.overtype = overtype;
    }
}
