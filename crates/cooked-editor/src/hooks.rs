//! Host notification hooks.
//!
//! The read loop emits exactly one notification today: assistive
//! technology wants to know when a processed-mode backspace changed the
//! text so it can announce the erased character. Hosts without
//! accessibility eventing use [`NoopHooks`].

pub trait EditorHooks {
    /// The edit buffer changed through a processed-mode backspace.
    fn text_changed(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl EditorHooks for NoopHooks {}
