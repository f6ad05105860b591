//! The cooked read state machine.
//!
//! One `CookedRead` lives from the client's read request until the line
//! is committed or the read is torn down. The host re-enters `notify`
//! whenever new input (or a termination condition) arrives; in between,
//! the editor holds no borrows on any collaborator.
//!
//! Token dispatch rules:
//! * With a popup open, every token goes to the popup handler and
//!   virtual keys arrive pre-classified as popup keys.
//! * Otherwise editing keys go to `handle_vkey` and characters to
//!   `handle_char`; only character input can commit the line.

use cooked_events::{Fetch, InputToken, ModMask, TokenClasses, TokenSource, Vkey, ERASE_PREV_WORD};
use cooked_history::{AliasTable, CommandHistory, SearchDirection};
use cooked_screen::{text_cell_width, Coord, ScreenBuffer};
use cooked_text::{clamp_to_boundary, grapheme_next, LineBuffer};

use crate::config::{ConsoleSettings, EditorConfig, HostFlags};
use crate::error::ReadError;
use crate::hooks::EditorHooks;
use crate::popups::{Popup, PopupTag};
use crate::slot::{CurrentReadSlot, ReadId};

/// Why the host re-entered the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// New tokens may be available.
    Input,
    CtrlC,
    CtrlBreak,
    HandleClosing,
    ThreadDying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Success,
    /// The read was interrupted (Ctrl-C/Ctrl-Break or the handle went
    /// away) before a line was committed.
    Alerted,
    ThreadTerminating,
}

/// What the server relays back to the client once the wait is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadReply {
    pub status: ReplyStatus,
    pub bytes_written: usize,
    pub control_key_state: ModMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// The input source would block; park the read and call again later.
    Pending,
    Complete(ReadReply),
}

/// Per-handle store for input the client has not consumed yet. A reply
/// larger than the client buffer leaves its tail here; a multi-line
/// alias expansion leaves every line after the first.
#[derive(Debug, Default, Clone)]
pub struct PendingInput {
    text: String,
    multiline: bool,
}

impl PendingInput {
    pub fn save(&mut self, text: &str) {
        self.text = text.to_string();
        self.multiline = false;
    }

    pub fn save_multiline(&mut self, text: &str) {
        self.text = text.to_string();
        self.multiline = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn take(&mut self) -> (String, bool) {
        let multiline = self.multiline;
        self.multiline = false;
        (std::mem::take(&mut self.text), multiline)
    }
}

/// Collaborators borrowed for the duration of one `notify` call.
pub struct ReadContext<'a> {
    pub screen: &'a mut dyn ScreenBuffer,
    pub source: &'a mut dyn TokenSource,
    pub history: Option<&'a mut CommandHistory>,
    pub aliases: &'a mut AliasTable,
    pub pending: &'a mut PendingInput,
    pub flags: &'a mut HostFlags,
    pub hooks: &'a dyn EditorHooks,
    pub slot: &'a CurrentReadSlot,
}

pub struct CookedRead {
    pub(crate) config: EditorConfig,
    pub(crate) buffer: LineBuffer,
    /// Cells from the (implicit) anchor to the caret.
    pub(crate) distance_caret: Coord,
    /// Cells from the anchor to the end of the echoed text.
    pub(crate) distance_end: Coord,
    pub(crate) insert_mode: bool,
    pub(crate) default_insert_mode: bool,
    pub(crate) control_key_state: ModMask,
    pub(crate) popups: Vec<Popup>,
    pub(crate) id: ReadId,
    /// Set on every terminal outcome; no draw may happen afterwards.
    pub(crate) detached: bool,
}

impl CookedRead {
    /// Create a read, optionally preloaded with text the client already
    /// wrote to the screen itself (the caret starts at its end and the
    /// anchor distances cover it).
    pub fn new(config: EditorConfig, settings: &ConsoleSettings, initial_data: &str) -> Self {
        let buffer = LineBuffer::preloaded(initial_data);
        let preloaded_cells = text_cell_width(initial_data);
        Self {
            config,
            buffer,
            distance_caret: preloaded_cells,
            distance_end: preloaded_cells,
            insert_mode: settings.default_insert_mode,
            default_insert_mode: settings.default_insert_mode,
            control_key_state: ModMask::empty(),
            popups: Vec::new(),
            id: ReadId::allocate(),
            detached: false,
        }
    }

    pub fn id(&self) -> ReadId {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.popups.is_empty()
    }

    pub fn presenting_popup(&self) -> bool {
        !self.popups.is_empty()
    }

    /// The host flipped the global insert-mode default mid-read.
    pub fn set_insert_mode(&mut self, insert_mode: bool) {
        self.insert_mode = insert_mode;
    }

    /// Drive the read. Returns `Pending` when the input source would
    /// block (the echo has already been flushed at that point), or the
    /// completed reply.
    pub fn notify(
        &mut self,
        wake: Wake,
        is_unicode: bool,
        user_buffer: &mut [u8],
        ctx: &mut ReadContext<'_>,
    ) -> Result<ReadStatus, ReadError> {
        match wake {
            Wake::CtrlC | Wake::CtrlBreak | Wake::HandleClosing => {
                return Ok(ReadStatus::Complete(self.conclude(ctx, ReplyStatus::Alerted)));
            }
            Wake::ThreadDying => {
                return Ok(ReadStatus::Complete(
                    self.conclude(ctx, ReplyStatus::ThreadTerminating),
                ));
            }
            Wake::Input => {}
        }

        ctx.slot.attach(self.id);

        let done = self.read_token_loop(ctx)?;
        self.flush(ctx.screen)?;
        if !done {
            return Ok(ReadStatus::Pending);
        }

        let (bytes_written, control_key_state) = self.finish(is_unicode, user_buffer, ctx);
        let mut reply = self.conclude(ctx, ReplyStatus::Success);
        reply.bytes_written = bytes_written;
        reply.control_key_state = control_key_state;
        Ok(ReadStatus::Complete(reply))
    }

    /// Terminal outcome: leave the slot and refuse any further draws.
    fn conclude(&mut self, ctx: &mut ReadContext<'_>, status: ReplyStatus) -> ReadReply {
        ctx.slot.detach(self.id);
        self.detached = true;
        ReadReply {
            status,
            bytes_written: 0,
            control_key_state: ModMask::empty(),
        }
    }

    fn read_token_loop(&mut self, ctx: &mut ReadContext<'_>) -> Result<bool, ReadError> {
        loop {
            let accept = if self.popups.is_empty() {
                TokenClasses::EDITING
            } else {
                TokenClasses::POPUP
            };
            let token = match ctx.source.get_next(accept)? {
                Fetch::WouldBlock => return Ok(false),
                Fetch::Token(token) => token,
            };

            let done = if !self.popups.is_empty() {
                self.popup_handle_input(ctx, token)?
            } else {
                match token {
                    InputToken::Edit(vkey, mods) => {
                        self.handle_vkey(ctx, vkey, mods)?;
                        false
                    }
                    InputToken::Char(wch, mods) => self.handle_char(ctx, wch, mods)?,
                    // The source only classifies popup keys when asked to.
                    InputToken::Popup(..) => false,
                }
            };
            if done {
                return Ok(true);
            }
        }
    }

    pub(crate) fn newline_suffix(&self) -> &'static str {
        if self.config.processed_input {
            "\r\n"
        } else {
            "\r"
        }
    }

    /// Character input while no popup is open. Returns `true` when the
    /// line is committed.
    pub(crate) fn handle_char(
        &mut self,
        ctx: &mut ReadContext<'_>,
        wch: char,
        mods: ModMask,
    ) -> Result<bool, ReadError> {
        let code = wch as u32;
        if self.config.ctrl_wakeup_mask != 0
            && code < 0x20
            && (self.config.ctrl_wakeup_mask & (1 << code)) != 0
        {
            // The wakeup character reaches the client but is never
            // echoed: flush what the user saw, then slip it in raw.
            self.flush(ctx.screen)?;
            self.buffer.insert_char_raw(wch);
            self.control_key_state = mods;
            return Ok(true);
        }

        match wch {
            '\r' => {
                let suffix = self.newline_suffix();
                self.buffer.append_str(suffix);
                self.buffer.caret_to_end();
                return Ok(true);
            }
            '\u{8}' | ERASE_PREV_WORD if self.config.processed_input => {
                if wch == ERASE_PREV_WORD {
                    self.buffer.backspace_word();
                } else {
                    self.buffer.backspace_grapheme();
                }
                ctx.hooks.text_changed();
                return Ok(false);
            }
            // Without processed input, control characters are data.
            _ => {}
        }

        self.buffer.insert_char(wch, self.insert_mode);
        Ok(false)
    }

    /// Command-line editing keys while no popup is open.
    pub(crate) fn handle_vkey(
        &mut self,
        ctx: &mut ReadContext<'_>,
        vkey: Vkey,
        mods: ModMask,
    ) -> Result<(), ReadError> {
        let ctrl = mods.contains(ModMask::CTRL);
        let alt = mods.contains(ModMask::ALT);

        match vkey {
            Vkey::Escape => {
                if !self.buffer.is_empty() {
                    self.buffer.clear();
                }
            }
            Vkey::Home => {
                if self.buffer.caret() > 0 {
                    if ctrl {
                        self.buffer.erase_to_start();
                    } else {
                        self.buffer.caret_to_start();
                    }
                }
            }
            Vkey::End => {
                if self.buffer.caret() < self.buffer.len() {
                    if ctrl {
                        self.buffer.erase_to_end();
                    } else {
                        self.buffer.caret_to_end();
                    }
                }
            }
            Vkey::Left => {
                if self.buffer.caret() != 0 {
                    if ctrl {
                        self.buffer.caret_prev_word();
                    } else {
                        self.buffer.caret_prev_grapheme();
                    }
                }
            }
            Vkey::Right | Vkey::F(1) => {
                if self.buffer.caret() != self.buffer.len() {
                    if ctrl && vkey == Vkey::Right {
                        self.buffer.caret_next_word();
                    } else {
                        self.buffer.caret_next_grapheme();
                    }
                } else if let Some(history) = ctx.history.as_deref() {
                    // At the end of the line, Right keeps pasting one
                    // more grapheme from the previous command. Walk both
                    // strings cluster by cluster so there is no reliance
                    // on byte lengths lining up.
                    let cmd = history.last_command();
                    let mut buffer_beg = 0;
                    let mut cmd_beg = 0;
                    while cmd_beg < cmd.len() {
                        let cmd_end = grapheme_next(cmd, cmd_beg);
                        if buffer_beg >= self.buffer.len() {
                            self.buffer.append_str(&cmd[cmd_beg..cmd_end]);
                            self.buffer.caret_to_end();
                            break;
                        }
                        buffer_beg = grapheme_next(self.buffer.text(), buffer_beg);
                        cmd_beg = cmd_end;
                    }
                }
            }
            Vkey::Insert => {
                self.insert_mode = !self.insert_mode;
                ctx.screen
                    .set_cursor_overtype(self.insert_mode != self.default_insert_mode);
                self.buffer.mark_dirty();
            }
            Vkey::Delete => {
                if self.buffer.caret() < self.buffer.len() {
                    self.buffer.delete_grapheme();
                }
            }
            Vkey::Up | Vkey::F(5) => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_first() {
                        self.buffer.assign(history.retrieve(SearchDirection::Previous));
                    }
                }
            }
            Vkey::Down => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_last() {
                        self.buffer.assign(history.retrieve(SearchDirection::Next));
                    }
                }
            }
            Vkey::PageUp => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_first() {
                        self.buffer.assign(history.retrieve_nth(0));
                    }
                }
            }
            Vkey::PageDown => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_last() {
                        self.buffer.assign(history.retrieve_nth(cooked_history::Index::MAX));
                    }
                }
            }
            Vkey::F(2) => {
                if ctx.history.is_some() {
                    self.popup_push(ctx, PopupTag::CopyToChar);
                }
            }
            Vkey::F(3) => {
                if let Some(history) = ctx.history.as_deref() {
                    let caret = self.buffer.caret();
                    let last = history.last_command();
                    if last.len() > caret {
                        let start = clamp_to_boundary(last, caret);
                        if start < last.len() {
                            self.buffer.replace_at_caret(&last[start..]);
                        }
                    }
                }
            }
            Vkey::F(4) => {
                self.popup_push(ctx, PopupTag::CopyFromChar);
            }
            Vkey::F(6) => {
                // F6 has meant "type a ^Z" for as long as anyone can
                // remember. The commit result is discarded, matching the
                // historic dispatch.
                self.handle_char(ctx, '\u{1a}', mods)?;
            }
            Vkey::F(7) => {
                if !ctrl && !alt {
                    if let Some(history) = ctx.history.as_deref() {
                        if history.count() > 0 {
                            self.popup_push(ctx, PopupTag::CommandList);
                        }
                    }
                } else if alt {
                    if let Some(history) = ctx.history.as_deref_mut() {
                        history.clear();
                    }
                }
            }
            Vkey::F(8) => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    let caret = self.buffer.caret();
                    let found =
                        history.find_matching(&self.buffer.text()[..caret], history.last_displayed);
                    if let Some(index) = found {
                        self.buffer.assign(history.retrieve_nth(index));
                        self.buffer.set_caret(caret);
                    }
                }
            }
            Vkey::F(9) => {
                if let Some(history) = ctx.history.as_deref() {
                    if history.count() > 0 {
                        self.popup_push(ctx, PopupTag::CommandNumber);
                    }
                }
            }
            Vkey::F(10) => {
                // Alt+F10 clears the aliases registered for cmd.exe.
                if alt {
                    ctx.aliases.clear_for("cmd.exe");
                }
            }
            Vkey::F(_) => {
                tracing::trace!(target: "cooked.read", key = ?vkey, "ignoring unmapped function key");
            }
        }
        Ok(())
    }
}
