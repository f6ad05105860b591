//! Post-commit pipeline: history, alias expansion, and encoding the
//! reply into the client's buffer.
//!
//! The committed line carries its newline suffix. History and alias
//! matching see the line without it; the suffix is restored before the
//! reply is encoded. A multi-line alias expansion replies one line per
//! read: the first line goes out now, the rest become pending input on
//! the handle.

use crate::config::HostFlags;
use crate::editor::{CookedRead, ReadContext};
use cooked_events::ModMask;

impl CookedRead {
    /// Finalize a committed line. Returns the bytes written into
    /// `user_buffer` and the captured control-key state.
    pub(crate) fn finish(
        &mut self,
        is_unicode: bool,
        user_buffer: &mut [u8],
        ctx: &mut ReadContext<'_>,
    ) -> (usize, ModMask) {
        let mut line_count = 1;

        if self.config.echo_input {
            let suffix = self.newline_suffix();
            // A ctrl-wakeup commit carries no suffix; it bypasses
            // history and aliases entirely.
            if self.buffer.text().ends_with(suffix) {
                let stripped_len = self.buffer.len() - suffix.len();
                let expanded = {
                    let stripped = &self.buffer.text()[..stripped_len];
                    if let Some(history) = ctx.history.as_deref_mut() {
                        history.add(stripped, ctx.flags.contains(HostFlags::HISTORY_NO_DUP));
                    }
                    tracing::trace!(
                        target: "cooked.read",
                        client = self.config.client.0,
                        chars = stripped.chars().count(),
                        "line committed"
                    );
                    ctx.aliases.match_and_copy(stripped, &self.config.exe_name)
                };
                if let Some((expansion, lines)) = expanded {
                    line_count = lines;
                    self.buffer.assign(&expansion);
                    // Nothing redraws after commit.
                    self.buffer.clear_dirty();
                }
            }
        }

        let full = self.buffer.text();
        let reply = if line_count > 1 {
            // Each read completes at a line boundary; hand out only the
            // first line and stash the rest.
            let first_line_end = full.find('\n').map_or(full.len(), |i| i + 1);
            &full[..first_line_end]
        } else {
            full
        };

        let (bytes_written, consumed) = consume(is_unicode, reply, user_buffer);

        if line_count > 1 {
            ctx.pending.save_multiline(&full[consumed..]);
        } else if consumed < reply.len() {
            ctx.pending.save(&reply[consumed..]);
        }

        ctx.flags.insert(HostFlags::IGNORE_NEXT_KEYUP);
        ctx.screen.set_cursor_overtype(false);

        (bytes_written, self.control_key_state)
    }
}

/// Encode as much of `input` as fits into `dest`, never splitting a
/// scalar value. Unicode clients get UTF-16LE; narrow clients get the
/// host's byte encoding (UTF-8). Returns bytes written and the number of
/// source bytes consumed.
fn consume(is_unicode: bool, input: &str, dest: &mut [u8]) -> (usize, usize) {
    let mut written = 0;
    let mut consumed = 0;

    for (offset, ch) in input.char_indices() {
        if is_unicode {
            let mut units = [0u16; 2];
            let units = ch.encode_utf16(&mut units);
            let needed = units.len() * 2;
            if written + needed > dest.len() {
                break;
            }
            for unit in units.iter() {
                dest[written..written + 2].copy_from_slice(&unit.to_le_bytes());
                written += 2;
            }
        } else {
            let mut bytes = [0u8; 4];
            let encoded = ch.encode_utf8(&mut bytes);
            if written + encoded.len() > dest.len() {
                break;
            }
            dest[written..written + encoded.len()].copy_from_slice(encoded.as_bytes());
            written += encoded.len();
        }
        consumed = offset + ch.len_utf8();
    }

    (written, consumed)
}
