//! The echo/redraw engine.
//!
//! The editor never remembers where on the screen the line starts. It
//! tracks two cell distances instead: anchor→caret and anchor→end, where
//! the anchor is "wherever the cursor lands after unwinding
//! `distance_caret` cells". Writes may scroll the viewport; because
//! `write_chars` folds the scroll amount into its cell count, unwinding
//! by that count is exact regardless.
//!
//! `flush` is called before every suspension and before anything else
//! touches the screen (popup backups, resize). The dirty flag keeps the
//! loop amortized linear: a burst of edits between two suspensions costs
//! one redraw.

use cooked_screen::{offset_position, Coord, Point, ScreenBuffer};

use crate::editor::CookedRead;
use crate::error::ReadError;

impl CookedRead {
    /// Redraw the line if it is stale. No-op when echo is off, nothing
    /// changed, or the read already concluded.
    pub(crate) fn flush(&mut self, screen: &mut dyn ScreenBuffer) -> Result<(), ReadError> {
        debug_assert!(self.buffer.caret() <= self.buffer.len());

        if !self.buffer.is_dirty() || self.detached {
            return Ok(());
        }

        if self.config.echo_input {
            unwind(screen, self.distance_caret)?;

            let (head, tail) = self.buffer.text().split_at(self.buffer.caret());
            let before_caret = write_chars(screen, head)?;
            let after_caret = write_chars(screen, tail)?;
            let new_end = before_caret + after_caret;
            // A shrinking line leaves stale cells behind; blank them.
            let erase_distance = (self.distance_end - new_end).max(0);

            erase(screen, erase_distance)?;
            unwind(screen, after_caret + erase_distance)?;

            self.distance_caret = before_caret;
            self.distance_end = new_end;
        }

        self.buffer.clear_dirty();
        Ok(())
    }

    /// Wipe the echoed line ahead of a text-buffer resize. Wide-glyph
    /// padding can shift under reflow, which would invalidate the cell
    /// distances; erasing first sidesteps that. Popups are dismissed
    /// because their saved rectangles are about to become meaningless.
    pub fn erase_before_resize(&mut self, screen: &mut dyn ScreenBuffer) -> Result<(), ReadError> {
        self.popups_done(screen);

        if self.distance_end > 0 {
            unwind(screen, self.distance_caret)?;
            erase(screen, self.distance_end)?;
            unwind(screen, self.distance_end)?;
            self.distance_caret = 0;
            self.distance_end = 0;
        }
        Ok(())
    }

    /// Counterpart of [`Self::erase_before_resize`].
    pub fn redraw_after_resize(&mut self, screen: &mut dyn ScreenBuffer) -> Result<(), ReadError> {
        self.buffer.mark_dirty();
        self.flush(screen)
    }

    /// The span of the echoed line: anchor and one-past-the-end, derived
    /// from the live cursor. Hosts use this for selection bookkeeping.
    pub fn boundaries(&self, screen: &dyn ScreenBuffer) -> (Point, Point) {
        let size = screen.size();
        let beg = offset_position(size, screen.cursor(), -self.distance_caret);
        let end = offset_position(size, beg, self.distance_end);
        (beg, end)
    }
}

/// Write text at the cursor and report the number of cells covered,
/// scrolling included.
pub(crate) fn write_chars(
    screen: &mut dyn ScreenBuffer,
    text: &str,
) -> Result<Coord, ReadError> {
    if text.is_empty() {
        return Ok(0);
    }
    let width = screen.size().width;
    let attrs = screen.default_attrs();
    let start = screen.cursor();
    let scrolled = screen.write_text(text, attrs).map_err(ReadError::Screen)?;
    let end = screen.cursor();
    Ok((end.y - start.y + scrolled) * width + end.x - start.x)
}

/// Blank the next `distance` cells.
pub(crate) fn erase(screen: &mut dyn ScreenBuffer, distance: Coord) -> Result<(), ReadError> {
    if distance > 0 {
        write_chars(screen, &" ".repeat(distance as usize))?;
    }
    Ok(())
}

/// Move the cursor `distance` cells back through linear cell space and
/// keep it visible. Pairs with [`write_chars`].
pub(crate) fn unwind(screen: &mut dyn ScreenBuffer, distance: Coord) -> Result<(), ReadError> {
    if distance <= 0 {
        // Negative distances would mean the cell accounting broke.
        debug_assert!(distance == 0);
        return Ok(());
    }
    let pos = offset_position(screen.size(), screen.cursor(), -distance);
    screen.set_cursor(pos).map_err(ReadError::Screen)?;
    screen.make_cursor_visible(pos);
    Ok(())
}
