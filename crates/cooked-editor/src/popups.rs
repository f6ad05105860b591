//! The four function-key popups.
//!
//! Stack discipline: at most two popups exist at once, and the only
//! legal pair is a command-number popup on top of the command list
//! (F7 then F9). Pushing saves the covered cells (content plus a
//! one-cell border); dismissal restores them. All popups dismiss
//! together; there is no single-popup pop path.
//!
//! Failure tolerance: if anything goes wrong while a popup is being
//! built (backup read, border draw), the half-built popup is dismissed
//! through the normal path, which skips restoring an empty backup. The
//! edit session continues either way.

use cooked_events::{InputToken, ModMask, Vkey};
use cooked_history::Index;
use cooked_screen::{Cell, Coord, Point, Rect, ScreenBuffer, Size};
use cooked_text::clamp_to_boundary;

use crate::editor::{CookedRead, ReadContext};
use crate::error::ReadError;

pub(crate) const COMMAND_NUMBER_DIGITS: usize = 5;

const PROMPT_COPY_TO_CHAR: &str = "Enter char to copy up to: ";
const PROMPT_COPY_FROM_CHAR: &str = "Enter char to delete up to: ";
const PROMPT_COMMAND_NUMBER: &str = "Enter command number: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PopupTag {
    CopyToChar,
    CopyFromChar,
    CommandNumber,
    CommandList,
}

/// Digit accumulator of the command-number popup. Extra digits beyond
/// the fixed capacity are ignored.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NumberPad {
    digits: [char; COMMAND_NUMBER_DIGITS],
    len: usize,
}

impl NumberPad {
    fn new() -> Self {
        Self {
            digits: [' '; COMMAND_NUMBER_DIGITS],
            len: 0,
        }
    }

    fn push(&mut self, digit: char) {
        if self.len < COMMAND_NUMBER_DIGITS {
            self.digits[self.len] = digit;
            self.len += 1;
        }
    }

    fn pop(&mut self) {
        if self.len > 0 {
            self.len -= 1;
            self.digits[self.len] = ' ';
        }
    }

    fn value(&self) -> Index {
        let text: String = self.digits[..self.len].iter().collect();
        text.parse().unwrap_or(0)
    }

    /// The full digit row, trailing blanks included, for redrawing.
    fn text(&self) -> String {
        self.digits.iter().collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListState {
    pub selected: Index,
    /// First history index currently visible.
    pub top: Index,
    /// Rows the next redraw must repaint (covers shrinkage after a
    /// history entry was deleted).
    pub dirty_height: Coord,
}

#[derive(Debug)]
pub(crate) enum PopupKind {
    CopyToChar,
    CopyFromChar,
    CommandNumber(NumberPad),
    CommandList(ListState),
}

#[derive(Debug)]
pub(crate) struct Popup {
    pub kind: PopupKind,
    /// Interior, border excluded.
    pub content: Rect,
    /// Interior plus the one-cell border.
    pub backup_rect: Rect,
    /// Saved cells under `backup_rect`; empty if construction failed
    /// before the snapshot was taken.
    pub backup: Vec<Cell>,
}

impl Popup {
    fn tag(&self) -> PopupTag {
        match self.kind {
            PopupKind::CopyToChar => PopupTag::CopyToChar,
            PopupKind::CopyFromChar => PopupTag::CopyFromChar,
            PopupKind::CommandNumber(_) => PopupTag::CommandNumber,
            PopupKind::CommandList(_) => PopupTag::CommandList,
        }
    }
}

// As per https://graphics.stanford.edu/~seander/bithacks.html#IntegerLog10Obvious
fn int_log10(v: i32) -> i32 {
    match v {
        1_000_000_000.. => 9,
        100_000_000.. => 8,
        10_000_000.. => 7,
        1_000_000.. => 6,
        100_000.. => 5,
        10_000.. => 4,
        1_000.. => 3,
        100.. => 2,
        10.. => 1,
        _ => 0,
    }
}

impl CookedRead {
    /// Open a popup. Failures are contained: the screen is restored and
    /// editing continues as if the popup had been dismissed immediately.
    pub(crate) fn popup_push(&mut self, ctx: &mut ReadContext<'_>, tag: PopupTag) {
        if let Err(error) = self.try_popup_push(ctx, tag) {
            tracing::warn!(target: "cooked.popup", kind = ?tag, %error, "popup construction failed");
            self.popups_done(ctx.screen);
        }
    }

    fn try_popup_push(&mut self, ctx: &mut ReadContext<'_>, tag: PopupTag) -> anyhow::Result<()> {
        debug_assert!(
            self.popups.is_empty()
                || (tag == PopupTag::CommandNumber
                    && matches!(
                        self.popups.last().map(|p| &p.kind),
                        Some(PopupKind::CommandList(_))
                    )),
            "only a command-number popup may stack, and only on the command list",
        );

        let viewport = ctx.screen.viewport();
        let viewport_size = Size::new(viewport.width(), viewport.height());

        let proposed = match tag {
            PopupTag::CopyToChar => Size::new(26, 1),
            PopupTag::CopyFromChar => Size::new(28, 1),
            PopupTag::CommandNumber => Size::new(22 + COMMAND_NUMBER_DIGITS as Coord, 1),
            PopupTag::CommandList => {
                let Some(history) = ctx.history.as_deref() else {
                    return Ok(());
                };
                let count = history.count();
                let mut max_label = 0;
                for i in 0..count {
                    max_label = max_label.max(history.nth(i).chars().count() as Coord);
                }
                // Room for the "123: " prefix in front of each command.
                max_label += int_log10(count) + 3;
                Size::new(max_label.max(40), count.clamp(10, 20))
            }
        };

        // The border needs a cell on each side; a viewport too small for
        // content plus border silently swallows the request.
        let content_size = Size::new(
            proposed.width.min(viewport_size.width - 2),
            proposed.height.min(viewport_size.height - 2),
        );
        if content_size.width <= 0 || content_size.height <= 0 {
            return Ok(());
        }

        let origin = Point::new(
            (viewport_size.width - content_size.width) / 2 + viewport.left,
            (viewport_size.height - content_size.height) / 2 + viewport.top,
        );
        let content = Rect::from_point_size(origin, content_size);
        let backup_rect = content.inflate(1);

        let kind = match tag {
            PopupTag::CopyToChar => PopupKind::CopyToChar,
            PopupTag::CopyFromChar => PopupKind::CopyFromChar,
            PopupTag::CommandNumber => PopupKind::CommandNumber(NumberPad::new()),
            PopupTag::CommandList => {
                let Some(history) = ctx.history.as_deref() else {
                    return Ok(());
                };
                let selected = history.last_displayed;
                PopupKind::CommandList(ListState {
                    selected,
                    top: selected - content.height() / 2,
                    dirty_height: 0,
                })
            }
        };
        self.popups.push(Popup {
            kind,
            content,
            backup_rect,
            backup: Vec::new(),
        });

        // Capture what we are about to scribble over; the echo has to be
        // current first or the restore would resurrect a stale line.
        self.flush(ctx.screen).map_err(anyhow::Error::new)?;
        let backup = ctx.screen.read_rect(backup_rect)?;
        if let Some(popup) = self.popups.last_mut() {
            popup.backup = backup;
        }

        draw_border(ctx.screen, content)?;

        match tag {
            PopupTag::CopyToChar => self.popup_draw_prompt(ctx.screen, PROMPT_COPY_TO_CHAR)?,
            PopupTag::CopyFromChar => self.popup_draw_prompt(ctx.screen, PROMPT_COPY_FROM_CHAR)?,
            PopupTag::CommandNumber => self.popup_draw_prompt(ctx.screen, PROMPT_COMMAND_NUMBER)?,
            PopupTag::CommandList => self
                .popup_draw_command_list(ctx)
                .map_err(anyhow::Error::new)?,
        }

        if self.popups.len() == 1 {
            ctx.screen.set_popup_shown(true);
        }
        Ok(())
    }

    /// Dismiss every popup, restoring the saved cells underneath.
    pub(crate) fn popups_done(&mut self, screen: &mut dyn ScreenBuffer) {
        while let Some(popup) = self.popups.pop() {
            if popup.backup.is_empty() {
                continue;
            }
            if let Err(error) = screen.write_rect(popup.backup_rect, &popup.backup) {
                tracing::warn!(target: "cooked.popup", %error, "failed to restore cells under popup");
            }
        }
        screen.set_popup_shown(false);
    }

    pub(crate) fn popup_handle_input(
        &mut self,
        ctx: &mut ReadContext<'_>,
        token: InputToken,
    ) -> Result<bool, ReadError> {
        let Some(tag) = self.popups.last().map(Popup::tag) else {
            return Ok(false);
        };
        match tag {
            PopupTag::CopyToChar => {
                self.popup_copy_to_char(ctx, token);
                Ok(false)
            }
            PopupTag::CopyFromChar => {
                self.popup_copy_from_char(ctx, token);
                Ok(false)
            }
            PopupTag::CommandNumber => {
                self.popup_command_number(ctx, token)?;
                Ok(false)
            }
            PopupTag::CommandList => self.popup_command_list(ctx, token),
        }
    }

    fn popup_copy_to_char(&mut self, ctx: &mut ReadContext<'_>, token: InputToken) {
        match token {
            InputToken::Popup(Vkey::Escape, _) => self.popups_done(ctx.screen),
            InputToken::Char(wch, _) => {
                if let Some(history) = ctx.history.as_deref() {
                    let cmd = history.last_command();
                    let caret = self.buffer.caret();
                    let start = clamp_to_boundary(cmd, caret.min(cmd.len()));
                    if let Some(offset) = cmd[start..].find(wch) {
                        self.buffer.replace_at_caret(&cmd[start..start + offset]);
                    }
                }
                self.popups_done(ctx.screen);
            }
            _ => {}
        }
    }

    fn popup_copy_from_char(&mut self, ctx: &mut ReadContext<'_>, token: InputToken) {
        match token {
            InputToken::Popup(Vkey::Escape, _) => self.popups_done(ctx.screen),
            InputToken::Char(wch, _) => {
                let caret = self.buffer.caret();
                let end = self.buffer.text()[caret..]
                    .find(wch)
                    .map_or(self.buffer.len(), |offset| caret + offset);
                self.buffer.erase_forward(end);
                self.popups_done(ctx.screen);
            }
            _ => {}
        }
    }

    fn popup_command_number(
        &mut self,
        ctx: &mut ReadContext<'_>,
        token: InputToken,
    ) -> Result<(), ReadError> {
        match token {
            InputToken::Popup(Vkey::Escape, _) => self.popups_done(ctx.screen),
            InputToken::Char('\r', _) => {
                let number = match self.popups.last() {
                    Some(Popup {
                        kind: PopupKind::CommandNumber(pad),
                        ..
                    }) => pad.value(),
                    _ => 0,
                };
                if let Some(history) = ctx.history.as_deref_mut() {
                    self.buffer.assign(history.retrieve_nth(number));
                }
                self.popups_done(ctx.screen);
            }
            InputToken::Char(wch, _) => {
                let (content, digits) = {
                    let Some(Popup {
                        kind: PopupKind::CommandNumber(pad),
                        content,
                        ..
                    }) = self.popups.last_mut()
                    else {
                        return Ok(());
                    };
                    match wch {
                        '0'..='9' => pad.push(wch),
                        '\u{8}' => pad.pop(),
                        _ => return Ok(()),
                    }
                    (*content, pad.text())
                };
                let attrs = ctx.screen.popup_attrs();
                ctx.screen
                    .write_row(
                        content.top,
                        content.right - COMMAND_NUMBER_DIGITS as Coord,
                        content.right,
                        &digits,
                        attrs,
                    )
                    .map_err(ReadError::Screen)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn popup_command_list(
        &mut self,
        ctx: &mut ReadContext<'_>,
        token: InputToken,
    ) -> Result<bool, ReadError> {
        let (content, mut cl) = match self.popups.last() {
            Some(Popup {
                kind: PopupKind::CommandList(cl),
                content,
                ..
            }) => (*content, *cl),
            _ => return Ok(false),
        };

        // Enter re-enters the ordinary character path so the picked
        // command commits exactly like a typed line.
        if let InputToken::Char('\r', mods) = token {
            if let Some(history) = ctx.history.as_deref_mut() {
                self.buffer.assign(history.retrieve_nth(cl.selected));
            }
            self.popups_done(ctx.screen);
            return self.handle_char(ctx, '\r', mods);
        }

        let InputToken::Popup(vkey, mods) = token else {
            return Ok(false);
        };

        match vkey {
            Vkey::Escape => {
                self.popups_done(ctx.screen);
                return Ok(false);
            }
            Vkey::F(9) => {
                self.popup_push(ctx, PopupTag::CommandNumber);
                return Ok(false);
            }
            Vkey::Delete => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    history.remove(cl.selected);
                    if history.count() <= 0 {
                        self.popups_done(ctx.screen);
                        return Ok(false);
                    }
                }
            }
            Vkey::Left | Vkey::Right => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    self.buffer.assign(history.retrieve_nth(cl.selected));
                }
                self.popups_done(ctx.screen);
                return Ok(false);
            }
            Vkey::Up => {
                if mods.contains(ModMask::SHIFT) {
                    if let Some(history) = ctx.history.as_deref_mut() {
                        history.swap(cl.selected, cl.selected - 1);
                    }
                }
                // The redraw clamps whatever this produces.
                cl.selected -= 1;
            }
            Vkey::Down => {
                if mods.contains(ModMask::SHIFT) {
                    if let Some(history) = ctx.history.as_deref_mut() {
                        history.swap(cl.selected, cl.selected + 1);
                    }
                }
                cl.selected += 1;
            }
            Vkey::Home => cl.selected = 0,
            Vkey::End => cl.selected = Index::MAX,
            Vkey::PageUp => cl.selected -= content.height(),
            Vkey::PageDown => cl.selected += content.height(),
            _ => return Ok(false),
        }

        if let Some(Popup {
            kind: PopupKind::CommandList(state),
            ..
        }) = self.popups.last_mut()
        {
            *state = cl;
        }
        self.popup_draw_command_list(ctx)?;
        Ok(false)
    }

    fn popup_draw_prompt(&self, screen: &mut dyn ScreenBuffer, text: &str) -> anyhow::Result<()> {
        let Some(popup) = self.popups.last() else {
            return Ok(());
        };
        let attrs = screen.popup_attrs();
        screen.write_row(
            popup.content.top,
            popup.content.left,
            popup.content.right,
            text,
            attrs,
        )
    }

    pub(crate) fn popup_draw_command_list(
        &mut self,
        ctx: &mut ReadContext<'_>,
    ) -> Result<(), ReadError> {
        let Some(Popup {
            kind: PopupKind::CommandList(state),
            content,
            ..
        }) = self.popups.last_mut()
        else {
            return Ok(());
        };
        let Some(history) = ctx.history.as_deref() else {
            return Ok(());
        };
        let count = history.count();
        if count <= 0 {
            return Ok(());
        }

        let content = *content;
        let width = content.width() as usize;
        let height = content.height().min(count);
        let dirty_height = height.max(state.dirty_height);

        // The popup viewport anchors on the selection and follows it
        // lazily once it leaves the visible range.
        state.selected = state.selected.clamp(0, count - 1);
        if state.selected < state.top {
            state.top = state.selected;
        } else if state.selected >= state.top + height {
            state.top = state.selected - height + 1;
        }
        state.top = state.top.clamp(0, count - height);

        let regular = ctx.screen.popup_attrs();
        let inverted = regular.invert();
        let mut line = String::with_capacity(width * 2);

        for off in 0..dirty_height {
            let y = content.top + off;
            let index = state.top + off;
            let cmd = history.nth(index);
            let attrs = if index == state.selected { inverted } else { regular };

            line.clear();
            if !cmd.is_empty() {
                line.push_str(&index.to_string());
                line.push_str(": ");
                line.push_str(cmd);
            }
            line.push_str(&" ".repeat(width));

            ctx.screen
                .write_row(y, content.left, content.right, &line, attrs)
                .map_err(ReadError::Screen)?;
        }

        if let Some(Popup {
            kind: PopupKind::CommandList(state),
            ..
        }) = self.popups.last_mut()
        {
            state.dirty_height = height;
        }
        Ok(())
    }
}

fn draw_border(screen: &mut dyn ScreenBuffer, content: Rect) -> anyhow::Result<()> {
    let attrs = screen.popup_attrs();
    let interior = content.width() as usize;
    let horizontal = "\u{2500}".repeat(interior);
    let blanks = " ".repeat(interior);

    let top = format!("\u{250c}{horizontal}\u{2510}");
    screen.write_row(content.top - 1, content.left - 1, content.right + 1, &top, attrs)?;

    let middle = format!("\u{2502}{blanks}\u{2502}");
    for y in content.top..content.bottom {
        screen.write_row(y, content.left - 1, content.right + 1, &middle, attrs)?;
    }

    let bottom = format!("\u{2514}{horizontal}\u{2518}");
    screen.write_row(content.bottom, content.left - 1, content.right + 1, &bottom, attrs)?;
    Ok(())
}
