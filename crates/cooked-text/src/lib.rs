//! Single-line edit buffer for cooked (line-buffered) console reads.
//!
//! Invariants:
//! * `caret <= text.len()` and the caret always sits on a grapheme cluster
//!   boundary after every public operation.
//! * Every operation that changes what the echoed line should look like
//!   sets the `dirty` flag; the redraw engine clears it once the screen
//!   matches the buffer again. `insert_char_raw` is the one deliberate
//!   exception: it inserts a control code that must never be echoed.
//! * All operations are total. Out-of-range offsets clamp to the nearest
//!   cluster boundary instead of panicking.

pub mod segment;
pub mod word;

pub use segment::{clamp_to_boundary, grapheme_next, grapheme_prev, is_boundary};
pub use word::{delim_class, word_next, word_prev, DelimClass};

/// The line under construction plus the logical caret.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    text: String,
    caret: usize,
    dirty: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer preloaded with initial data: caret at the end, dirty only
    /// if there is something to echo.
    pub fn preloaded(initial: &str) -> Self {
        Self {
            text: initial.to_string(),
            caret: initial.len(),
            dirty: !initial.is_empty(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Replace the whole contents; caret moves to the end.
    pub fn assign(&mut self, s: &str) {
        self.text.clear();
        self.text.push_str(s);
        self.caret = self.text.len();
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
        self.dirty = true;
    }

    /// Append without moving the caret (the newline suffix on commit, and
    /// the grapheme-by-grapheme paste from the previous command).
    pub fn append_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.dirty = true;
    }

    /// Move the caret to `pos`, clamped onto the nearest cluster boundary
    /// at or before it.
    pub fn set_caret(&mut self, pos: usize) {
        self.caret = clamp_to_boundary(&self.text, pos);
        self.dirty = true;
    }

    pub fn caret_to_start(&mut self) {
        self.caret = 0;
        self.dirty = true;
    }

    pub fn caret_to_end(&mut self) {
        self.caret = self.text.len();
        self.dirty = true;
    }

    pub fn caret_prev_grapheme(&mut self) {
        self.caret = grapheme_prev(&self.text, self.caret);
        self.dirty = true;
    }

    pub fn caret_next_grapheme(&mut self) {
        self.caret = grapheme_next(&self.text, self.caret);
        self.dirty = true;
    }

    pub fn caret_prev_word(&mut self) {
        self.caret = clamp_to_boundary(&self.text, word_prev(&self.text, self.caret));
        self.dirty = true;
    }

    pub fn caret_next_word(&mut self) {
        self.caret = clamp_to_boundary(&self.text, word_next(&self.text, self.caret));
        self.dirty = true;
    }

    /// Insert one code point at the caret, or overwrite the cluster under
    /// the caret when `insert_mode` is off. The caret advances past the
    /// inserted code point either way.
    ///
    /// Overtype of a wide cluster by a single narrow code point is lossy
    /// (the whole cluster is replaced); that matches the historic
    /// one-code-unit-at-a-time input path.
    pub fn insert_char(&mut self, ch: char, insert_mode: bool) {
        if insert_mode {
            self.text.insert(self.caret, ch);
        } else {
            let end = grapheme_next(&self.text, self.caret);
            self.text
                .replace_range(self.caret..end, ch.encode_utf8(&mut [0u8; 4]));
        }
        self.caret += ch.len_utf8();
        self.dirty = true;
    }

    /// Insert one code point without scheduling a redraw. Used for the
    /// ctrl-wakeup character, which terminates the read and is handed to
    /// the client without ever being echoed.
    pub fn insert_char_raw(&mut self, ch: char) {
        self.text.insert(self.caret, ch);
        self.caret += ch.len_utf8();
    }

    /// Delete the cluster before the caret.
    pub fn backspace_grapheme(&mut self) {
        let start = grapheme_prev(&self.text, self.caret);
        self.text.replace_range(start..self.caret, "");
        self.caret = start;
        self.dirty = true;
    }

    /// Delete back to the start of the previous word (legacy word rules).
    pub fn backspace_word(&mut self) {
        let start = clamp_to_boundary(&self.text, word_prev(&self.text, self.caret));
        self.text.replace_range(start..self.caret, "");
        self.caret = start;
        self.dirty = true;
    }

    /// Delete the cluster at the caret.
    pub fn delete_grapheme(&mut self) {
        let end = grapheme_next(&self.text, self.caret);
        self.text.replace_range(self.caret..end, "");
        self.dirty = true;
    }

    /// Delete `[0, caret)`; the caret lands at the start.
    pub fn erase_to_start(&mut self) {
        self.text.replace_range(..self.caret, "");
        self.caret = 0;
        self.dirty = true;
    }

    /// Delete `[caret, len)`.
    pub fn erase_to_end(&mut self) {
        self.text.truncate(self.caret);
        self.dirty = true;
    }

    /// Delete `[caret, end)`. `end` clamps onto a cluster boundary; the
    /// caret does not move.
    pub fn erase_forward(&mut self, end: usize) {
        let end = clamp_to_boundary(&self.text, end).max(self.caret);
        self.text.replace_range(self.caret..end, "");
        self.dirty = true;
    }

    /// Overwrite starting at the caret with `src`, extending the buffer if
    /// `src` reaches past the end. The caret advances past the copied
    /// text. This is the F3/copy-up-to-char "transplant" primitive.
    pub fn replace_at_caret(&mut self, src: &str) {
        let end = clamp_to_boundary(&self.text, (self.caret + src.len()).min(self.text.len()));
        let end = end.max(self.caret);
        self.text.replace_range(self.caret..end, src);
        self.caret += src.len();
        self.dirty = true;
    }
}
