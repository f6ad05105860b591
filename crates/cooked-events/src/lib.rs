//! Input token model and queue for the cooked read loop.
//!
//! Contract:
//! * A raw `KeyPress` is either a character (control codes included) or a
//!   virtual key, plus a modifier mask. The queue stores raw presses.
//! * Classification happens at pop time: the reader says which token
//!   classes it currently accepts (editing keys while typing, popup keys
//!   while a popup is open), and a press that fits neither class and
//!   carries no character is silently skipped.
//! * `get_next` never blocks. An empty queue yields `Fetch::WouldBlock`;
//!   the host parks the read and re-enters it once more presses arrive.

mod key_translate;

pub use key_translate::translate_key_event;

use std::collections::VecDeque;
use thiserror::Error;

bitflags::bitflags! {
    /// Modifier state captured with each key press.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

bitflags::bitflags! {
    /// Token classes a reader is willing to receive from `get_next`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TokenClasses: u8 {
        const EDITING = 0b01;
        const POPUP   = 0b10;
    }
}

/// The character produced by Ctrl+Backspace; the character handler treats
/// it as "erase previous word".
pub const ERASE_PREV_WORD: char = '\u{7f}';

/// Virtual keys that matter to the line editor. Enter, Tab and Backspace
/// arrive as characters, never as `Vkey`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vkey {
    Escape,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
}

impl Vkey {
    /// Keys dispatched to the command-line editing handler.
    pub fn is_editing_key(self) -> bool {
        match self {
            Vkey::Escape
            | Vkey::Home
            | Vkey::End
            | Vkey::Left
            | Vkey::Right
            | Vkey::Up
            | Vkey::Down
            | Vkey::PageUp
            | Vkey::PageDown
            | Vkey::Insert
            | Vkey::Delete => true,
            Vkey::F(n) => (1..=10).contains(&n),
        }
    }

    /// Keys a popup consumes. F9 is the only function key (it stacks the
    /// command-number popup on top of the command list).
    pub fn is_popup_key(self) -> bool {
        matches!(
            self,
            Vkey::Escape
                | Vkey::Home
                | Vkey::End
                | Vkey::Left
                | Vkey::Right
                | Vkey::Up
                | Vkey::Down
                | Vkey::PageUp
                | Vkey::PageDown
                | Vkey::Delete
                | Vkey::F(9)
        )
    }
}

/// A raw key press as delivered by the host input plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub data: KeyData,
    pub mods: ModMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyData {
    Char(char),
    Key(Vkey),
}

impl KeyPress {
    pub fn ch(ch: char) -> Self {
        Self { data: KeyData::Char(ch), mods: ModMask::empty() }
    }

    pub fn ch_mods(ch: char, mods: ModMask) -> Self {
        Self { data: KeyData::Char(ch), mods }
    }

    pub fn key(vkey: Vkey) -> Self {
        Self { data: KeyData::Key(vkey), mods: ModMask::empty() }
    }

    pub fn key_mods(vkey: Vkey, mods: ModMask) -> Self {
        Self { data: KeyData::Key(vkey), mods }
    }
}

/// A classified token, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputToken {
    Char(char, ModMask),
    Edit(Vkey, ModMask),
    Popup(Vkey, ModMask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Token(InputToken),
    WouldBlock,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input queue closed")]
    Closed,
}

/// The input-source contract the editor consumes. `accept` is the hint
/// that decides how virtual keys are classified.
pub trait TokenSource {
    fn get_next(&mut self, accept: TokenClasses) -> Result<Fetch, InputError>;
}

/// Queue-backed token source. The host pushes translated key presses as
/// they arrive; the cooked read drains them on its own schedule.
#[derive(Debug, Default)]
pub struct TokenQueue {
    queue: VecDeque<KeyPress>,
    closed: bool,
}

impl TokenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, press: KeyPress) {
        self.queue.push_back(press);
    }

    /// Push each character of `text` as an unmodified key press.
    pub fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.push(KeyPress::ch(ch));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// After closing, an empty queue reports `InputError::Closed` instead
    /// of `WouldBlock`.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl TokenSource for TokenQueue {
    fn get_next(&mut self, accept: TokenClasses) -> Result<Fetch, InputError> {
        loop {
            let Some(press) = self.queue.pop_front() else {
                if self.closed {
                    return Err(InputError::Closed);
                }
                return Ok(Fetch::WouldBlock);
            };
            match press.data {
                KeyData::Char(ch) => return Ok(Fetch::Token(InputToken::Char(ch, press.mods))),
                KeyData::Key(vkey) => {
                    if accept.contains(TokenClasses::POPUP) && vkey.is_popup_key() {
                        return Ok(Fetch::Token(InputToken::Popup(vkey, press.mods)));
                    }
                    if accept.contains(TokenClasses::EDITING) && vkey.is_editing_key() {
                        return Ok(Fetch::Token(InputToken::Edit(vkey, press.mods)));
                    }
                    tracing::trace!(target: "cooked.input", key = ?vkey, "dropping unclassifiable key press");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_pass_through_regardless_of_accept() {
        let mut q = TokenQueue::new();
        q.push(KeyPress::ch('a'));
        assert_eq!(
            q.get_next(TokenClasses::POPUP).unwrap(),
            Fetch::Token(InputToken::Char('a', ModMask::empty()))
        );
    }

    #[test]
    fn vkeys_classify_by_accept_hint() {
        let mut q = TokenQueue::new();
        q.push(KeyPress::key(Vkey::Up));
        q.push(KeyPress::key(Vkey::Up));
        assert_eq!(
            q.get_next(TokenClasses::EDITING).unwrap(),
            Fetch::Token(InputToken::Edit(Vkey::Up, ModMask::empty()))
        );
        assert_eq!(
            q.get_next(TokenClasses::POPUP).unwrap(),
            Fetch::Token(InputToken::Popup(Vkey::Up, ModMask::empty()))
        );
    }

    #[test]
    fn editing_only_keys_are_dropped_while_popup_active() {
        let mut q = TokenQueue::new();
        q.push(KeyPress::key(Vkey::F(2)));
        q.push(KeyPress::ch('x'));
        // F2 is not a popup key, so the popup reader skips it and sees 'x'.
        assert_eq!(
            q.get_next(TokenClasses::POPUP).unwrap(),
            Fetch::Token(InputToken::Char('x', ModMask::empty()))
        );
    }

    #[test]
    fn f9_is_a_popup_key_but_f7_is_not() {
        assert!(Vkey::F(9).is_popup_key());
        assert!(!Vkey::F(7).is_popup_key());
        assert!(Vkey::F(7).is_editing_key());
        assert!(!Vkey::F(11).is_editing_key());
    }

    #[test]
    fn empty_queue_would_block_until_closed() {
        let mut q = TokenQueue::new();
        assert_eq!(q.get_next(TokenClasses::EDITING).unwrap(), Fetch::WouldBlock);
        q.close();
        assert!(matches!(q.get_next(TokenClasses::EDITING), Err(InputError::Closed)));
    }

    #[test]
    fn push_text_enqueues_plain_chars() {
        let mut q = TokenQueue::new();
        q.push_text("hi");
        assert_eq!(
            q.get_next(TokenClasses::EDITING).unwrap(),
            Fetch::Token(InputToken::Char('h', ModMask::empty()))
        );
        assert_eq!(
            q.get_next(TokenClasses::EDITING).unwrap(),
            Fetch::Token(InputToken::Char('i', ModMask::empty()))
        );
    }
}
