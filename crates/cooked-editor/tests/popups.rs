//! Popup scenarios: sizing and placement, backup/restore, the four
//! input handlers, and the two-deep stack.

mod common;

use common::{default_read, utf16_bytes, visible_row, Fixture};
use cooked_editor::ReadStatus;
use cooked_events::{KeyPress, ModMask, Vkey};

#[test]
fn copy_from_char_deletes_up_to_match() {
    let mut fix = Fixture::new();
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.type_text("abcXdef");
    for _ in 0..7 {
        fix.press(Vkey::Left);
    }
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    let before_rows: Vec<String> = (0..10).map(|y| fix.screen.row_string(y)).collect();

    fix.press(Vkey::F(4));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(read.presenting_popup());
    assert!(fix.screen.popup_shown());
    // The border and prompt are on screen somewhere in the middle rows.
    let all: String = (0..10).map(|y| fix.screen.row_string(y)).collect();
    assert!(all.contains("Enter char to delete up to:"));
    assert!(all.contains('\u{250c}'));

    fix.type_text("X");
    fix.type_text("\r");
    let reply = match fix.notify(&mut read, &mut buf) {
        ReadStatus::Complete(reply) => reply,
        ReadStatus::Pending => panic!("read did not complete"),
    };

    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("Xdef\r\n").as_slice());
    assert!(!fix.screen.popup_shown());
    // Every cell under the popup was restored before the commit echo.
    // Rows below the edited line must match the pre-popup snapshot.
    for y in 2..10 {
        assert_eq!(fix.screen.row_string(y), before_rows[y as usize], "row {y}");
    }
}

#[test]
fn copy_to_char_copies_from_previous_command() {
    let mut fix = Fixture::new();
    fix.seed_history(&["abcXdef"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(2));
    fix.type_text("X");
    fix.type_text("\r");
    let reply = fix.complete(&mut read, &mut buf);

    // Copies the previous command up to (not including) 'X'.
    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("abc\r\n").as_slice());
}

#[test]
fn escape_dismisses_popup_and_editing_continues() {
    let mut fix = Fixture::new();
    fix.seed_history(&["anything"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.type_text("keep");
    fix.press(Vkey::F(2));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(read.presenting_popup());

    fix.press(Vkey::Escape);
    fix.type_text("!\r");
    let reply = fix.complete(&mut read, &mut buf);

    assert!(!read.presenting_popup());
    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("keep!\r\n").as_slice());
}

#[test]
fn command_number_on_top_of_command_list() {
    let mut fix = Fixture::new();
    fix.seed_history(&["one", "two", "three"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(7));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    let all: String = (0..10).map(|y| fix.screen.row_string(y)).collect();
    assert!(all.contains("0: one"));
    assert!(all.contains("2: three"));

    fix.press(Vkey::F(9));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    let all: String = (0..10).map(|y| fix.screen.row_string(y)).collect();
    assert!(all.contains("Enter command number:"));

    // Enter in the number popup selects the command and dismisses both
    // popups, but the line stays editable.
    fix.type_text("0");
    fix.type_text("\r");
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(!read.presenting_popup());
    assert!(!fix.screen.popup_shown());
    assert_eq!(visible_row(&fix.screen, 0), "one");

    fix.type_text("\r");
    let reply = fix.complete(&mut read, &mut buf);
    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("one\r\n").as_slice());
}

#[test]
fn command_number_backspace_edits_digits() {
    let mut fix = Fixture::new();
    fix.seed_history(&["zero", "one", "two"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(9));
    fix.type_text("12");
    fix.type_text("\u{8}"); // now "1"
    fix.type_text("\r"); // select entry 1
    fix.type_text("\r"); // commit it
    let reply = fix.complete(&mut read, &mut buf);

    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("one\r\n").as_slice());
}

#[test]
fn command_number_ignores_excess_digits() {
    let mut fix = Fixture::new();
    fix.seed_history(&["a", "b"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(9));
    fix.type_text("9999999"); // only five digits accumulate
    fix.type_text("\r"); // select; 99999 clamps to the newest entry
    fix.type_text("\r"); // commit
    let reply = fix.complete(&mut read, &mut buf);

    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("b\r\n").as_slice());
}

#[test]
fn command_list_enter_commits_selected() {
    let mut fix = Fixture::new();
    fix.seed_history(&["one", "two", "three"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(7));
    fix.press(Vkey::Up); // from "three" up to "two"
    fix.type_text("\r");
    let reply = fix.complete(&mut read, &mut buf);

    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("two\r\n").as_slice());
    assert_eq!(fix.history.last_command(), "two");
    assert!(!fix.screen.popup_shown());
}

#[test]
fn command_list_arrows_replace_without_committing() {
    let mut fix = Fixture::new();
    fix.seed_history(&["alpha", "beta"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(7));
    fix.press(Vkey::Up); // select "alpha"
    fix.press(Vkey::Right); // take it, popup closes, still editing
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(!read.presenting_popup());
    assert_eq!(visible_row(&fix.screen, 0), "alpha");

    fix.type_text("!\r");
    let reply = fix.complete(&mut read, &mut buf);
    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("alpha!\r\n").as_slice());
}

#[test]
fn command_list_delete_prunes_history() {
    let mut fix = Fixture::new();
    fix.seed_history(&["first", "second"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(7));
    fix.press(Vkey::Home); // select index 0
    fix.press(Vkey::Delete);
    fix.press(Vkey::Escape);
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);

    assert_eq!(fix.history.count(), 1);
    assert_eq!(fix.history.nth(0), "second");

    // Deleting the last entry dismisses the popup.
    fix.press(Vkey::F(7));
    fix.press(Vkey::Delete);
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(!read.presenting_popup());
    assert!(fix.history.is_empty());
}

#[test]
fn command_list_shift_up_reorders_history() {
    let mut fix = Fixture::new();
    fix.seed_history(&["one", "two", "three"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(7));
    // Selection starts on the newest entry; Shift+Up swaps it upward.
    fix.press_mods(Vkey::Up, ModMask::SHIFT);
    fix.press(Vkey::Escape);
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);

    assert_eq!(fix.history.nth(1), "three");
    assert_eq!(fix.history.nth(2), "two");
}

#[test]
fn alt_f7_clears_history() {
    let mut fix = Fixture::new();
    fix.seed_history(&["a", "b"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press_mods(Vkey::F(7), ModMask::ALT);
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(fix.history.is_empty());
    assert!(!read.presenting_popup());
}

#[test]
fn popups_require_history_where_documented() {
    let mut fix = Fixture::new();
    // The process has no history at all: F2, F7 and F9 must not open
    // anything; F4 works without history.
    fix.use_history = false;
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(2));
    fix.press(Vkey::F(7));
    fix.press(Vkey::F(9));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(!read.presenting_popup());

    fix.press(Vkey::F(4));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(read.presenting_popup());
}

#[test]
fn popup_without_room_for_its_border_is_abandoned() {
    // Two rows cannot hold one content row plus the border.
    let mut fix = Fixture::with_screen(30, 2);
    fix.seed_history(&["x"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(4));
    fix.press(Vkey::F(7));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(!read.presenting_popup());
    assert!(!fix.screen.popup_shown());

    // The read is unharmed.
    fix.type_text("ok\r");
    let reply = fix.complete(&mut read, &mut buf);
    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("ok\r\n").as_slice());
}

#[test]
fn dismissal_restores_cells_under_both_popups() {
    let mut fix = Fixture::new();
    fix.seed_history(&["one", "two", "three"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.type_text("edit");
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    let before: Vec<String> = (0..10).map(|y| fix.screen.row_string(y)).collect();

    fix.press(Vkey::F(7));
    fix.press(Vkey::F(9));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);

    fix.press(Vkey::Escape);
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);
    assert!(!read.presenting_popup());

    let after: Vec<String> = (0..10).map(|y| fix.screen.row_string(y)).collect();
    assert_eq!(before, after);
}

#[test]
fn stale_popup_keys_do_not_reach_the_editor() {
    let mut fix = Fixture::new();
    fix.seed_history(&["cmd"]);
    let mut read = default_read();
    let mut buf = [0u8; 64];

    fix.press(Vkey::F(2));
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);

    // While the popup is open, an editing-only key (Insert) is dropped
    // by classification instead of toggling insert mode.
    fix.queue.push(KeyPress::key(Vkey::Insert));
    fix.press(Vkey::Escape);
    assert_eq!(fix.notify(&mut read, &mut buf), ReadStatus::Pending);

    fix.type_text("ok\r");
    let reply = fix.complete(&mut read, &mut buf);
    assert_eq!(&buf[..reply.bytes_written], utf16_bytes("ok\r\n").as_slice());
}
