//! Per-read configuration and host-level console settings.
//!
//! `EditorConfig` is immutable for the lifetime of one line read and
//! comes straight from the client's read request. `ConsoleSettings` is
//! the host's durable configuration (loaded from `console.toml` when one
//! exists); `HostFlags` is the mutable process-wide flag word the read
//! loop touches.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

bitflags::bitflags! {
    /// Process-wide console flags observed or set by cooked reads.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct HostFlags: u8 {
        /// Keep each distinct command once in history.
        const HISTORY_NO_DUP = 0b01;
        /// Set when a read completes so the next key-up event is not
        /// forwarded to the freshly resumed client.
        const IGNORE_NEXT_KEYUP = 0b10;
    }
}

/// Identifies the client process a read belongs to. Opaque to the
/// editor; used for tracing and by the host to find the right history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientId(pub u64);

/// Immutable parameters of one line read.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Bitmask over control codes 0..32; typing one of them ends the
    /// read early and reports the modifier state with the reply.
    pub ctrl_wakeup_mask: u32,
    /// Processed input: `\r` commits as `\r\n` and backspace edits
    /// instead of inserting a control code.
    pub processed_input: bool,
    /// Whether the line is echoed at all.
    pub echo_input: bool,
    /// Client executable name; keys the alias table.
    pub exe_name: String,
    pub client: ClientId,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ctrl_wakeup_mask: 0,
            processed_input: true,
            echo_input: true,
            exe_name: String::new(),
            client: ClientId::default(),
        }
    }
}

/// Durable host settings. Unknown fields are ignored so the file can
/// grow without breaking older binaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Whether reads start in insert mode rather than overtype.
    pub default_insert_mode: bool,
    /// Whether history keeps each distinct command once.
    pub history_no_dup: bool,
    /// Commands retained per process history.
    pub history_capacity: usize,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            default_insert_mode: true,
            history_no_dup: false,
            history_capacity: 50,
        }
    }
}

impl ConsoleSettings {
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = toml::from_str(&raw)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        tracing::info!(target: "cooked.config", path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// The initial process flag word implied by these settings.
    pub fn initial_flags(&self) -> HostFlags {
        if self.history_no_dup {
            HostFlags::HISTORY_NO_DUP
        } else {
            HostFlags::empty()
        }
    }
}
