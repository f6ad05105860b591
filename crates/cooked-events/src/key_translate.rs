//! Map crossterm key events into raw cooked-read key presses.
//!
//! Returns `None` for events the line editor has no use for (releases,
//! media keys, bare modifiers). Control chords are resolved here so the
//! queue only ever carries characters and virtual keys:
//! * Ctrl+letter (and Ctrl+`@`..`_`) becomes the matching C0 control code.
//! * Ctrl+Backspace becomes [`ERASE_PREV_WORD`].
//! * Enter/Tab/Backspace become `\r`, `\t`, `\x08` characters.

use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

use crate::{KeyData, KeyPress, ModMask, Vkey, ERASE_PREV_WORD};

/// Translate one crossterm key event. Key releases yield `None`.
pub fn translate_key_event(event: &CKeyEvent) -> Option<KeyPress> {
    if event.kind == CKeyEventKind::Release {
        return None;
    }
    let mods = translate_mods(event.modifiers);
    let data = match event.code {
        CKeyCode::Char(c) => KeyData::Char(control_chord(c, mods)),
        CKeyCode::Enter => KeyData::Char('\r'),
        CKeyCode::Tab | CKeyCode::BackTab => KeyData::Char('\t'),
        CKeyCode::Backspace => {
            if mods.contains(ModMask::CTRL) {
                KeyData::Char(ERASE_PREV_WORD)
            } else {
                KeyData::Char('\u{8}')
            }
        }
        CKeyCode::Esc => KeyData::Key(Vkey::Escape),
        CKeyCode::Home => KeyData::Key(Vkey::Home),
        CKeyCode::End => KeyData::Key(Vkey::End),
        CKeyCode::Left => KeyData::Key(Vkey::Left),
        CKeyCode::Right => KeyData::Key(Vkey::Right),
        CKeyCode::Up => KeyData::Key(Vkey::Up),
        CKeyCode::Down => KeyData::Key(Vkey::Down),
        CKeyCode::PageUp => KeyData::Key(Vkey::PageUp),
        CKeyCode::PageDown => KeyData::Key(Vkey::PageDown),
        CKeyCode::Insert => KeyData::Key(Vkey::Insert),
        CKeyCode::Delete => KeyData::Key(Vkey::Delete),
        CKeyCode::F(n) => KeyData::Key(Vkey::F(n)),
        _ => return None,
    };
    Some(KeyPress { data, mods })
}

fn translate_mods(mods: CKeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    out
}

/// Resolve Ctrl+printable into the C0 control code a console keyboard
/// layer would have produced (Ctrl+A => 0x01, Ctrl+Space => NUL).
fn control_chord(c: char, mods: ModMask) -> char {
    if !mods.contains(ModMask::CTRL) {
        return c;
    }
    let up = c.to_ascii_uppercase();
    match up {
        '@'..='_' => char::from(up as u8 - 0x40),
        ' ' => '\u{0}',
        _ => c,
    }
}
