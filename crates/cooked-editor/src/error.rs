//! Error taxonomy for a cooked read.
//!
//! Only two failures are fatal to a read: the input source breaking and
//! the screen refusing an echo write. Popup construction and restore
//! failures are handled locally (logged, popup dismissed, editing
//! continues), and cancellation is a reply status, not an error.

use cooked_events::InputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("input source failed")]
    Input(#[from] InputError),
    #[error("screen buffer operation failed")]
    Screen(#[source] anyhow::Error),
}
