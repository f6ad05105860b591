#![allow(dead_code)] // Shared across test binaries; each uses a subset.

use std::cell::Cell;

use cooked_editor::{
    ConsoleSettings, CookedRead, CurrentReadSlot, EditorConfig, EditorHooks, HostFlags,
    PendingInput, ReadContext, ReadReply, ReadStatus, Wake,
};
use cooked_events::{KeyPress, ModMask, TokenQueue, Vkey};
use cooked_history::{AliasTable, CommandHistory};
use cooked_screen::MemoryScreen;

/// Counts accessibility notifications.
#[derive(Default)]
pub struct CountingHooks {
    pub text_changed: Cell<usize>,
}

impl EditorHooks for CountingHooks {
    fn text_changed(&self) {
        self.text_changed.set(self.text_changed.get() + 1);
    }
}

/// Owns every collaborator a read borrows, so tests can assemble a
/// `ReadContext` on demand.
pub struct Fixture {
    pub screen: MemoryScreen,
    pub queue: TokenQueue,
    pub history: CommandHistory,
    pub use_history: bool,
    pub aliases: AliasTable,
    pub pending: PendingInput,
    pub flags: HostFlags,
    pub hooks: CountingHooks,
    pub slot: CurrentReadSlot,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_screen(40, 10)
    }

    pub fn with_screen(width: i32, height: i32) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Self {
            screen: MemoryScreen::new(width, height),
            queue: TokenQueue::new(),
            history: CommandHistory::new(50),
            use_history: true,
            aliases: AliasTable::new(),
            pending: PendingInput::default(),
            flags: HostFlags::empty(),
            hooks: CountingHooks::default(),
            slot: CurrentReadSlot::new(),
        }
    }

    pub fn seed_history(&mut self, commands: &[&str]) {
        for command in commands {
            self.history.add(command, false);
        }
    }

    pub fn type_text(&mut self, text: &str) {
        self.queue.push_text(text);
    }

    pub fn press(&mut self, vkey: Vkey) {
        self.queue.push(KeyPress::key(vkey));
    }

    pub fn press_mods(&mut self, vkey: Vkey, mods: ModMask) {
        self.queue.push(KeyPress::key_mods(vkey, mods));
    }

    pub fn press_char_mods(&mut self, ch: char, mods: ModMask) {
        self.queue.push(KeyPress::ch_mods(ch, mods));
    }

    pub fn notify(&mut self, read: &mut CookedRead, user_buffer: &mut [u8]) -> ReadStatus {
        self.notify_wake(read, Wake::Input, true, user_buffer)
    }

    pub fn notify_wake(
        &mut self,
        read: &mut CookedRead,
        wake: Wake,
        is_unicode: bool,
        user_buffer: &mut [u8],
    ) -> ReadStatus {
        let mut ctx = ReadContext {
            screen: &mut self.screen,
            source: &mut self.queue,
            history: if self.use_history { Some(&mut self.history) } else { None },
            aliases: &mut self.aliases,
            pending: &mut self.pending,
            flags: &mut self.flags,
            hooks: &self.hooks,
            slot: &self.slot,
        };
        read.notify(wake, is_unicode, user_buffer, &mut ctx)
            .expect("cooked read failed")
    }

    /// Drive the read and require completion.
    pub fn complete(&mut self, read: &mut CookedRead, user_buffer: &mut [u8]) -> ReadReply {
        match self.notify(read, user_buffer) {
            ReadStatus::Complete(reply) => reply,
            ReadStatus::Pending => panic!("read did not complete"),
        }
    }
}

pub fn default_read() -> CookedRead {
    CookedRead::new(
        EditorConfig::default(),
        &ConsoleSettings::default(),
        "",
    )
}

pub fn read_with_config(config: EditorConfig) -> CookedRead {
    CookedRead::new(config, &ConsoleSettings::default(), "")
}

pub fn utf16_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// The visible line as the user would read it, trailing blanks trimmed.
pub fn visible_row(screen: &MemoryScreen, y: i32) -> String {
    screen.row_string(y).trim_end().to_string()
}
