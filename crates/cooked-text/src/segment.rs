//! Grapheme boundary helpers.
//!
//! Contract:
//! - All offsets are byte offsets into the backing string.
//! - Returned offsets always land on extended grapheme cluster boundaries.
//! - The helpers are total: out-of-range inputs clamp instead of panicking,
//!   so callers can feed offsets that were computed against a different
//!   string of similar shape (the legacy F3/copy-up-to-char transplants).

use unicode_segmentation::UnicodeSegmentation;

/// Smallest grapheme boundary strictly greater than `i`, or `text.len()`
/// if `i` is already inside the last cluster.
pub fn grapheme_next(text: &str, i: usize) -> usize {
    if i >= text.len() {
        return text.len();
    }
    for (idx, _) in text.grapheme_indices(true) {
        if idx > i {
            return idx;
        }
    }
    text.len()
}

/// Largest grapheme boundary strictly smaller than `i`, or `0`.
pub fn grapheme_prev(text: &str, i: usize) -> usize {
    if i == 0 || i > text.len() {
        return 0;
    }
    let mut last = 0;
    for (idx, _) in text.grapheme_indices(true) {
        if idx >= i {
            break;
        }
        last = idx;
    }
    last
}

/// Largest grapheme boundary less than or equal to `i` (clamped to the
/// string length). Identity for offsets that already sit on a boundary.
pub fn clamp_to_boundary(text: &str, i: usize) -> usize {
    let i = i.min(text.len());
    if is_boundary(text, i) {
        return i;
    }
    grapheme_prev(text, i)
}

/// Whether `i` is a grapheme boundary of `text`. The ends always are.
pub fn is_boundary(text: &str, i: usize) -> bool {
    if i == 0 || i == text.len() {
        return true;
    }
    if i > text.len() {
        return false;
    }
    text.grapheme_indices(true).any(|(idx, _)| idx == i)
}
