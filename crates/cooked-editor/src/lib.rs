//! Cooked-mode line editor.
//!
//! This crate owns everything between "a client asked for a line of
//! input" and "a completed line was copied into the client's buffer":
//! the editable line and its caret, echoing against a scrolling cell
//! grid, the function-key popups, per-process history recall, and the
//! alias expansion performed on commit.
//!
//! Execution model: the editor is cooperative and not reentrant. The
//! host calls [`CookedRead::notify`] whenever input arrives (or a
//! termination condition fires); the editor drains tokens until the
//! source would block, flushes the echo, and either parks
//! (`ReadStatus::Pending`) or completes with a reply. Collaborators
//! (screen, input source, history, aliases, pending-input store) are
//! borrowed per call through [`ReadContext`]; the editor owns none of
//! them.

pub mod config;
pub mod error;
pub mod hooks;
pub mod slot;

mod commit;
mod draw;
mod editor;
mod popups;

pub use config::{ClientId, ConsoleSettings, EditorConfig, HostFlags};
pub use editor::{
    CookedRead, PendingInput, ReadContext, ReadReply, ReadStatus, ReplyStatus, Wake,
};
pub use error::ReadError;
pub use hooks::{EditorHooks, NoopHooks};
pub use slot::{CurrentReadSlot, ReadId};
